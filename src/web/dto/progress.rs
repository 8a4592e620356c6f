use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{Certificate, LessonProgress, ProgressSnapshot},
    service::progress::{CourseProgress, LessonProgressOutcome},
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressBody {
    pub course_id: Option<Uuid>,
    /// Watched share of the video, clamped to 0..=100.
    pub percent: f64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressResponse {
    lesson_id: Uuid,
    course_percent: i32,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate: Option<Certificate>,
}

impl From<LessonProgressOutcome> for LessonProgressResponse {
    fn from(outcome: LessonProgressOutcome) -> Self {
        Self {
            lesson_id: outcome.lesson.lesson_id(),
            course_percent: outcome.course.percent,
            completed: outcome.lesson.completed(),
            certificate: outcome.certificate,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressResponse {
    lesson_progress: Vec<LessonProgress>,
    course_progress: ProgressSnapshot,
}

impl From<CourseProgress> for CourseProgressResponse {
    fn from(progress: CourseProgress) -> Self {
        Self {
            lesson_progress: progress.lessons,
            course_progress: progress.course,
        }
    }
}
