use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CourseRefBody {
    pub course_id: Uuid,
}
