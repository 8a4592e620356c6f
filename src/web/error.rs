use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::CryptError,
    error::log_error,
    gateway::GatewayError,
    model::{DatabaseError, ResourceType, entity::ProgressSnapshot},
    service::ServiceError,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationTokenInvalid, source: {source_name}. Error: {error}")]
    AuthenticationTokenInvalid {
        source_name: String,
        error: GatewayError,
    },
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}. Reason: {reason}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        reason: String,
    },

    #[error("ResourceConflict: {resource_type:?}, id: {id}")]
    ResourceConflict { resource_type: ResourceType, id: Uuid },
}

#[derive(Debug, Error)]
pub enum CourseError {
    #[error("CourseIncomplete: {}%", .progress.percent)]
    CourseIncomplete { progress: ProgressSnapshot },

    #[error("CoursePaymentRequired")]
    CoursePaymentRequired,

    #[error("CoursePaymentSignatureInvalid, order: {order_id}")]
    CoursePaymentSignatureInvalid { order_id: String },

    #[error("CourseAttemptIncomplete, attempt: {attempt_id}. Error: {error}")]
    CourseAttemptIncomplete {
        attempt_id: Uuid,
        error: DatabaseError,
    },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] CryptError),

    #[error("ServerGatewayError: {0}")]
    ServerGatewayError(GatewayError),

    #[error("ServerInternal: {0}")]
    ServerInternal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerGatewayError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerGatewayError(_) => String::from("Upstream service unavailable."),
            _ => String::from("Internal server error."),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationTokenInvalid { .. } => {
                String::from("Authentication error, token invalid or expired.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceForbidden { .. } => String::from("Resource error, resource forbidden."),
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
            Self::ResourceBadRequest { reason, .. } => format!("Resource error, bad request: {reason}."),
            Self::ResourceConflict { .. } => String::from("Resource error, resource already exists."),
        }
    }
}

impl CourseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CourseIncomplete { .. } => StatusCode::PRECONDITION_FAILED,
            Self::CoursePaymentRequired => StatusCode::PAYMENT_REQUIRED,
            Self::CoursePaymentSignatureInvalid { .. } => StatusCode::BAD_REQUEST,
            Self::CourseAttemptIncomplete { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::CourseIncomplete { progress } => format!(
                "Course error, course is {}% complete, certificate requires 100%.",
                progress.percent
            ),
            Self::CoursePaymentRequired => {
                String::from("Course error, this course has to be purchased first.")
            }
            Self::CoursePaymentSignatureInvalid { .. } => {
                String::from("Course error, payment signature is invalid.")
            }
            Self::CourseAttemptIncomplete { .. } => {
                String::from("Course error, attempt was graded but its answers were not saved.")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("CourseError - {0}")]
    CourseError(#[from] CourseError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    /// Ownership rejections from the model layer stay 403.
    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        match error {
            DatabaseError::Forbidden => Self::resource_forbidden(r#type),
            error => Self::ResourceError(ResourceError::ResourceFetchError {
                resource_type: r#type,
                error,
            }),
        }
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, reason: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            reason: reason.into(),
        })
    }

    pub fn resource_conflict(r#type: ResourceType, id: Uuid) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
            id,
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_token_invalid<S: Into<String>>(source_name: S, error: GatewayError) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid {
            source_name: source_name.into(),
            error,
        })
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn server_gateway_error(e: GatewayError) -> Self {
        Self::ServerError(ServerError::ServerGatewayError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::CourseError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::CourseError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }

    fn progress(&self) -> Option<ProgressSnapshot> {
        match self {
            Self::CourseError(CourseError::CourseIncomplete { progress }) => Some(*progress),
            _ => None,
        }
    }
}

impl From<ServiceError> for WebError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::NotFound(t) => Self::resource_not_found(t),
            ServiceError::Forbidden(t) => Self::resource_forbidden(t),
            ServiceError::PreconditionFailed { progress } => {
                CourseError::CourseIncomplete { progress }.into()
            }
            ServiceError::BadRequest {
                resource_type,
                reason,
            } => Self::resource_bad_request(resource_type, reason),
            ServiceError::PaymentRequired => CourseError::CoursePaymentRequired.into(),
            ServiceError::AlreadyEnrolled(id) => Self::resource_conflict(ResourceType::Enrollment, id),
            ServiceError::InvalidSignature(order_id) => {
                CourseError::CoursePaymentSignatureInvalid { order_id }.into()
            }
            ServiceError::Database {
                resource_type,
                error,
            } => Self::resource_fetch_error(resource_type, error),
            ServiceError::PartialWrite { attempt_id, error } => {
                CourseError::CourseAttemptIncomplete { attempt_id, error }.into()
            }
            ServiceError::Internal(msg) => ServerError::ServerInternal(msg).into(),
            ServiceError::Gateway(GatewayError::CryptError(e)) => Self::server_crypt_error(e),
            ServiceError::Gateway(e) if e.is_unauthorized() => Self::auth_token_invalid("gateway", e),
            ServiceError::Gateway(e) => Self::server_gateway_error(e),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
    /// Current course progress, set when a certificate was requested too early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible: Option<bool>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();
        let progress = self.progress();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
            eligible: progress.map(|_| false),
            progress,
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn service_error_status_mapping_test() {
        let cases = [
            (ServiceError::NotFound(ResourceType::Quiz), StatusCode::NOT_FOUND),
            (ServiceError::Forbidden(ResourceType::Enrollment), StatusCode::FORBIDDEN),
            (ServiceError::bad_request(ResourceType::Quiz, "nope"), StatusCode::BAD_REQUEST),
            (ServiceError::PaymentRequired, StatusCode::PAYMENT_REQUIRED),
            (ServiceError::AlreadyEnrolled(Uuid::nil()), StatusCode::CONFLICT),
            (ServiceError::InvalidSignature(String::from("o1")), StatusCode::BAD_REQUEST),
            (ServiceError::Internal(String::from("boom")), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ServiceError::Database {
                    resource_type: ResourceType::Course,
                    error: DatabaseError::Forbidden,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::Gateway(GatewayError::Upstream {
                    status: 503,
                    body: String::new(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ServiceError::Gateway(GatewayError::InvalidSubject(String::from("x"))),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(WebError::from(err).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn precondition_failed_body_carries_progress_test() {
        let err = WebError::from(ServiceError::PreconditionFailed {
            progress: ProgressSnapshot {
                percent: 99,
                completed_lessons: 99,
                total_lessons: 100,
            },
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["status_code"], "412");
        assert_eq!(json["eligible"], false);
        assert_eq!(json["progress"]["percent"], 99);
        assert_eq!(json["progress"]["completedLessons"], 99);
    }

    #[test]
    fn bad_request_keeps_resource_type_test() {
        let err = WebError::from(ServiceError::bad_request(
            ResourceType::Question,
            "correct_key must name one of the options",
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(
            err,
            WebError::ResourceError(ResourceError::ResourceBadRequest {
                resource_type: ResourceType::Question,
                ..
            })
        ));
    }

    #[test]
    fn auth_errors_are_unauthorized_test() {
        assert_eq!(WebError::auth_required().status_code(), StatusCode::UNAUTHORIZED);
        let invalid = WebError::auth_token_invalid(
            "SID",
            GatewayError::InvalidSubject(String::from("svc")),
        );
        assert_eq!(invalid.status_code(), StatusCode::UNAUTHORIZED);
    }
}
