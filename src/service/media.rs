use serde::Serialize;
use uuid::Uuid;

use crate::{
    gateway::{ObjectStore, SignedUrl, video_path},
    model::{CrudRepository, ModelManager, ResourceTyped, ResourceType, entity::Lesson},
    service::{
        access,
        error::{ServiceError, ServiceResult},
    },
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct VideoUpload {
    pub path: String,
    #[serde(flatten)]
    pub signed: SignedUrl,
}

async fn find_lesson(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    lesson_id: Uuid,
) -> ServiceResult<Lesson> {
    Lesson::find_by_id(mm, actor, lesson_id)
        .await
        .map_err(|e| ServiceError::database(Lesson::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(Lesson::get_resource_type()))
}

/// Signed upload URL for the lesson video. The lesson points at the new object
/// right away, the client uploads directly to storage.
#[tracing::instrument(skip(mm, actor, store))]
pub async fn video_upload_url(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    store: &dyn ObjectStore,
    lesson_id: Uuid,
    filename: &str,
) -> ServiceResult<VideoUpload> {
    let lesson = find_lesson(mm, actor, lesson_id).await?;
    let course = access::find_course(mm, actor, lesson.course_id()).await?;
    access::require_instructor(actor, &course)?;

    let path = video_path(course.id(), lesson.id(), filename);
    let signed = store.upload_url(&path).await?;

    lesson
        .set_video_path(mm, actor, path.clone())
        .await
        .map_err(|e| ServiceError::database(Lesson::get_resource_type(), e))?;

    Ok(VideoUpload { path, signed })
}

#[tracing::instrument(skip(mm, actor, store))]
pub async fn video_stream_url(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    store: &dyn ObjectStore,
    lesson_id: Uuid,
) -> ServiceResult<SignedUrl> {
    let lesson = find_lesson(mm, actor, lesson_id).await?;
    let course = access::find_course(mm, actor, lesson.course_id()).await?;
    access::participation(mm, actor, &course).await?;

    let path = lesson
        .video_path()
        .ok_or(ServiceError::NotFound(ResourceType::Video))?;

    Ok(store.stream_url(path).await?)
}
