use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::Lesson;

/// Catalog view of a lesson, without its content.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LessonSummary {
    id: Uuid,
    course_id: Uuid,
    title: String,
    duration_secs: i32,
    order_index: i32,
    has_video: bool,
}

impl From<Lesson> for LessonSummary {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id(),
            course_id: lesson.course_id(),
            title: lesson.title().to_string(),
            duration_secs: lesson.duration_secs(),
            order_index: lesson.order_index(),
            has_video: lesson.video_path().is_some(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VideoUploadBody {
    pub filename: String,
}
