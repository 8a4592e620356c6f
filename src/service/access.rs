use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ModelManager, ResourceTyped,
        entity::{Course, Enrollment},
    },
    service::error::{ServiceError, ServiceResult},
    web::AuthenticatedUser,
};

/// How the acting user relates to a course.
#[derive(Debug, Clone)]
pub enum Participation {
    Enrolled(Enrollment),
    /// Teaches the course (or is an admin). Exempt from enrollment checks.
    Instructor,
}

impl Participation {
    pub fn enrollment(&self) -> Option<&Enrollment> {
        match self {
            Self::Enrolled(e) => Some(e),
            Self::Instructor => None,
        }
    }
}

pub fn teaches(actor: &AuthenticatedUser, course: &Course) -> bool {
    actor.is_admin() || course.instructor_id() == actor.user_id()
}

pub async fn find_course(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    course_id: Uuid,
) -> ServiceResult<Course> {
    Course::find_by_id(mm, actor, course_id)
        .await
        .map_err(|e| ServiceError::database(Course::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(Course::get_resource_type()))
}

/// Enrolled students and the course instructor may consume course content.
pub async fn participation(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    course: &Course,
) -> ServiceResult<Participation> {
    if teaches(actor, course) {
        return Ok(Participation::Instructor);
    }

    let enrollment = Enrollment::find(mm, actor, actor.user_id(), course.id())
        .await
        .map_err(|e| ServiceError::database(Enrollment::get_resource_type(), e))?;

    enrollment
        .map(Participation::Enrolled)
        .ok_or(ServiceError::Forbidden(Enrollment::get_resource_type()))
}

pub async fn require_enrollment(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<Enrollment> {
    Enrollment::find(mm, actor, user_id, course_id)
        .await
        .map_err(|e| ServiceError::database(Enrollment::get_resource_type(), e))?
        .ok_or(ServiceError::Forbidden(Enrollment::get_resource_type()))
}

/// Only the course instructor (or an admin) may author course content.
pub fn require_instructor(actor: &AuthenticatedUser, course: &Course) -> ServiceResult<()> {
    if teaches(actor, course) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(Course::get_resource_type()))
    }
}
