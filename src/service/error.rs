use thiserror::Error;
use uuid::Uuid;

use crate::{
    gateway::GatewayError,
    model::{DatabaseError, ResourceType, entity::ProgressSnapshot},
};

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0:?}")]
    NotFound(ResourceType),

    #[error("forbidden: {0:?}")]
    Forbidden(ResourceType),

    #[error("course is not complete yet: {}% ({}/{} lessons)", .progress.percent, .progress.completed_lessons, .progress.total_lessons)]
    PreconditionFailed { progress: ProgressSnapshot },

    #[error("bad request on {resource_type:?}: {reason}")]
    BadRequest {
        resource_type: ResourceType,
        reason: String,
    },

    #[error("course requires payment")]
    PaymentRequired,

    #[error("already enrolled in course {0}")]
    AlreadyEnrolled(Uuid),

    #[error("payment signature rejected for order {0}")]
    InvalidSignature(String),

    #[error("database error on {resource_type:?}: {error}")]
    Database {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("attempt {attempt_id} stored without its answers: {error}")]
    PartialWrite {
        attempt_id: Uuid,
        error: DatabaseError,
    },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    /// Maps a repository failure, keeping ownership rejections distinct.
    pub fn database(resource_type: ResourceType, error: DatabaseError) -> Self {
        match error {
            DatabaseError::Forbidden => Self::Forbidden(resource_type),
            error => Self::Database {
                resource_type,
                error,
            },
        }
    }

    pub fn bad_request<S: Into<String>>(resource_type: ResourceType, reason: S) -> Self {
        Self::BadRequest {
            resource_type,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn database_forbidden_maps_to_forbidden_test() {
        let err = ServiceError::database(ResourceType::Course, DatabaseError::Forbidden);
        assert!(matches!(err, ServiceError::Forbidden(ResourceType::Course)));

        let err = ServiceError::database(
            ResourceType::Lesson,
            DatabaseError::SqlxError(sqlx::Error::RowNotFound),
        );
        assert!(matches!(
            err,
            ServiceError::Database {
                resource_type: ResourceType::Lesson,
                ..
            }
        ));
    }

    #[test]
    fn precondition_message_carries_progress_test() {
        let err = ServiceError::PreconditionFailed {
            progress: ProgressSnapshot {
                percent: 99,
                completed_lessons: 99,
                total_lessons: 100,
            },
        };
        assert_eq!(err.to_string(), "course is not complete yet: 99% (99/100 lessons)");
    }
}
