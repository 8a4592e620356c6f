use serde::Serialize;

use crate::{model::entity::Certificate, service::certificate::IssueOutcome};

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateIssueResponse {
    eligible: bool,
    newly_issued: bool,
    certificate: Certificate,
}

impl From<IssueOutcome> for CertificateIssueResponse {
    fn from(outcome: IssueOutcome) -> Self {
        Self {
            eligible: true,
            newly_issued: outcome.newly_issued,
            certificate: outcome.certificate,
        }
    }
}
