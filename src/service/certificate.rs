use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    model::{
        ModelManager, ResourceTyped,
        entity::{Certificate, CertificateCreate, CertificateSnapshotRow, Course, ProgressSnapshot},
    },
    service::{
        error::{ServiceError, ServiceResult},
        progress,
    },
    web::AuthenticatedUser,
};

const NUMBER_ATTEMPTS: usize = 3;

/// `LEC-<issue date>-<10 hex digits>`, e.g. `LEC-20250301-9F1C2A7B3D`.
pub fn certificate_number(issued_at: DateTime<Utc>, entropy: Uuid) -> String {
    let suffix = entropy.simple().to_string();
    format!(
        "LEC-{}-{}",
        issued_at.format("%Y%m%d"),
        suffix[..10].to_ascii_uppercase()
    )
}

#[derive(Debug, Clone)]
pub struct IssueOutcome {
    pub certificate: Certificate,
    /// `false` when an earlier issuance was returned.
    pub newly_issued: bool,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateCheck {
    pub eligible: bool,
    pub progress: ProgressSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
}

async fn existing(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<Option<Certificate>> {
    Certificate::find_by_user_course(mm, actor, user_id, course_id)
        .await
        .map_err(|e| ServiceError::database(Certificate::get_resource_type(), e))
}

/// Returns the (user, course) certificate, creating it when the freshly
/// recomputed progress is 100%.
///
/// Names are copied at this moment so later renames leave issued
/// certificates untouched.
#[tracing::instrument(skip(mm, actor))]
pub async fn issue_certificate_if_eligible(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<IssueOutcome> {
    if let Some(certificate) = existing(mm, actor, user_id, course_id).await? {
        return Ok(IssueOutcome {
            certificate,
            newly_issued: false,
        });
    }

    let eligibility = progress::check_certificate_eligibility(mm, actor, user_id, course_id).await?;
    if !eligibility.eligible {
        return Err(ServiceError::PreconditionFailed {
            progress: eligibility.progress,
        });
    }

    let names = CertificateSnapshotRow::fetch(mm, actor, user_id, course_id)
        .await
        .map_err(|e| ServiceError::database(Certificate::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(Course::get_resource_type()))?;

    for _ in 0..NUMBER_ATTEMPTS {
        let data = CertificateCreate {
            user_id,
            course_id,
            certificate_number: certificate_number(Utc::now(), Uuid::new_v4()),
            student_name: names.student_name().to_string(),
            course_title: names.course_title().to_string(),
            instructor_name: names.instructor_name().to_string(),
        };

        let created = Certificate::try_create(mm, actor, data)
            .await
            .map_err(|e| ServiceError::database(Certificate::get_resource_type(), e))?;

        if let Some(certificate) = created {
            tracing::info!(number = certificate.certificate_number(), "certificate issued");
            return Ok(IssueOutcome {
                certificate,
                newly_issued: true,
            });
        }

        // a concurrent issuance won, or the number collided
        if let Some(certificate) = existing(mm, actor, user_id, course_id).await? {
            return Ok(IssueOutcome {
                certificate,
                newly_issued: false,
            });
        }
    }

    Err(ServiceError::Internal(String::from(
        "unable to allocate a unique certificate number",
    )))
}

pub async fn check_certificate(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    course_id: Uuid,
) -> ServiceResult<CertificateCheck> {
    let eligibility =
        progress::check_certificate_eligibility(mm, actor, actor.user_id(), course_id).await?;
    let certificate = existing(mm, actor, actor.user_id(), course_id).await?;

    Ok(CertificateCheck {
        eligible: eligibility.eligible,
        progress: eligibility.progress,
        certificate,
    })
}

pub async fn my_certificates(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
) -> ServiceResult<Vec<Certificate>> {
    Certificate::all_by_user(mm, actor, actor.user_id())
        .await
        .map_err(|e| ServiceError::database(Certificate::get_resource_type(), e))
}

/// Public lookup, the number itself is the capability.
pub async fn verify_certificate(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    number: &str,
) -> ServiceResult<Certificate> {
    Certificate::find_by_number(mm, actor, number.trim())
        .await
        .map_err(|e| ServiceError::database(Certificate::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(Certificate::get_resource_type()))
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn certificate_number_format_test() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let id = Uuid::parse_str("9f1c2a7b-3d4e-4f50-8a6b-7c8d9e0f1a2b").unwrap();

        assert_eq!(certificate_number(at, id), "LEC-20250301-9F1C2A7B3D");
    }

    #[test]
    fn certificate_numbers_differ_test() {
        let at = Utc::now();
        let a = certificate_number(at, Uuid::new_v4());
        let b = certificate_number(at, Uuid::new_v4());

        assert_eq!(a.len(), "LEC-YYYYMMDD-".len() + 10);
        assert_ne!(a, b);
    }

    #[test]
    fn certificate_check_omits_missing_certificate_test() {
        let check = CertificateCheck {
            eligible: false,
            progress: ProgressSnapshot {
                percent: 99,
                completed_lessons: 99,
                total_lessons: 100,
            },
            certificate: None,
        };
        let json = serde_json::to_value(&check).unwrap();

        assert_eq!(json["eligible"], false);
        assert_eq!(json["progress"]["percent"], 99);
        assert!(json.get("certificate").is_none());
    }
}
