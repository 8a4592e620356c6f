use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Proof of completion. Names are a snapshot taken at issuance, not live joins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Certificate {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    certificate_number: String,
    student_name: String,
    course_title: String,
    instructor_name: String,
    issued_at: DateTime<Utc>,
}

impl ResourceTyped for Certificate {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Certificate
    }
}

impl Certificate {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn certificate_number(&self) -> &str {
        &self.certificate_number
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn course_title(&self) -> &str {
        &self.course_title
    }

    pub fn instructor_name(&self) -> &str {
        &self.instructor_name
    }

    pub fn issued_at(&self) -> &DateTime<Utc> {
        &self.issued_at
    }
}

pub struct CertificateCreate {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub certificate_number: String,
    pub student_name: String,
    pub course_title: String,
    pub instructor_name: String,
}

impl Certificate {
    /// Inserts unless any unique constraint rejects the row, in which case `None`
    /// is returned and nothing is written.
    pub async fn try_create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CertificateCreate,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO certificates
                (id, user_id, course_id, certificate_number, student_name, course_title, instructor_name)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            ON CONFLICT DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.course_id)
        .bind(&data.certificate_number)
        .bind(&data.student_name)
        .bind(&data.course_title)
        .bind(&data.instructor_name)
        .fetch_optional(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn find_by_user_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM certificates WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_number(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        number: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM certificates WHERE certificate_number = $1")
            .bind(number)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn all_by_user(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM certificates WHERE user_id = $1 ORDER BY issued_at DESC")
            .bind(user_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Certificate {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

// Utils

/// Live names to freeze into a new certificate.
#[derive(Debug, sqlx::FromRow)]
pub struct CertificateSnapshotRow {
    student_full_name: String,
    student_email: String,
    course_title: String,
    instructor_full_name: String,
    instructor_email: String,
}

impl CertificateSnapshotRow {
    pub async fn fetch(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            r#"
            SELECT
                s.full_name AS student_full_name,
                s.email AS student_email,
                c.title AS course_title,
                i.full_name AS instructor_full_name,
                i.email AS instructor_email
            FROM courses c
            JOIN profiles i ON i.id = c.instructor_id
            JOIN profiles s ON s.id = $1
            WHERE c.id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(row)
    }

    pub fn student_name(&self) -> &str {
        super::profile::display_name(&self.student_full_name, &self.student_email)
    }

    pub fn course_title(&self) -> &str {
        &self.course_title
    }

    pub fn instructor_name(&self) -> &str {
        super::profile::display_name(&self.instructor_full_name, &self.instructor_email)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn snapshot_names_fall_back_to_email_test() {
        let names = CertificateSnapshotRow {
            student_full_name: String::from("  "),
            student_email: String::from("ada@example.com"),
            course_title: String::from("Algorithms"),
            instructor_full_name: String::from("Donald"),
            instructor_email: String::from("donald@example.com"),
        };

        assert_eq!(names.student_name(), "ada@example.com");
        assert_eq!(names.course_title(), "Algorithms");
        assert_eq!(names.instructor_name(), "Donald");
    }
}
