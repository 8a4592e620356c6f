use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    gateway::SignedUrl,
    model::{
        CrudRepository, ResourceTyped, check_owned,
        entity::{Lesson, LessonCreate},
    },
    service::{
        access,
        media::{self, VideoUpload},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::lessons::VideoUploadBody,
        error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(lessons_create_handler))
        .route(
            "/{id}",
            get(lessons_get_handler)
                .put(lessons_update_handler)
                .delete(lessons_delete_handler),
        )
        .route(
            "/{id}/video",
            get(lessons_video_stream_handler).post(lessons_video_upload_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn validate(payload: &LessonCreate) -> WebResult<()> {
    if payload.title.trim().is_empty() {
        return Err(WebError::resource_bad_request(
            Lesson::get_resource_type(),
            "title must not be empty",
        ));
    }
    if payload.duration_secs.is_some_and(|d| d < 0) {
        return Err(WebError::resource_bad_request(
            Lesson::get_resource_type(),
            "duration_secs must not be negative",
        ));
    }
    Ok(())
}

async fn find_lesson(state: &AppState, ctx: &RequestContext, id: Uuid) -> WebResult<Lesson> {
    let user = ctx.user()?;
    Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/",
    description = "Add a lesson to a course you teach",
    request_body = LessonCreate,
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 400, description = "Invalid lesson", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You don't teach this course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "lessons",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn lessons_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    validate(&payload)?;

    let course = access::find_course(state.pool(), user, payload.course_id).await?;
    access::require_instructor(user, &course)?;

    let created = Lesson::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Fetch a lesson including its content. Requires enrollment",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to get")
    ),
    responses(
        (status = 200, description = "Lesson found", body = Lesson),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = []),
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = find_lesson(&state, &ctx, id).await?;
    let course = access::find_course(state.pool(), user, lesson.course_id()).await?;
    access::participation(state.pool(), user, &course).await?;

    Ok((StatusCode::OK, Json(lesson)))
}

#[utoipa::path(
    put,
    path = "/api/v1/lessons/{lesson_id}",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to update")
    ),
    request_body = LessonCreate,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 400, description = "Invalid lesson", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You don't teach this course", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = []),
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_update_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<LessonCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    validate(&payload)?;

    let found = find_lesson(&state, &ctx, id).await?;
    check_owned(state.pool(), user, &found)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Delete a lesson. Course progress shrinks its total on the next recompute",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to delete")
    ),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You don't teach this course", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = []),
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = find_lesson(&state, &ctx, id).await?;
    check_owned(state.pool(), user, &found)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/video",
    description = "Signed URL to upload the lesson video directly to storage",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    request_body = VideoUploadBody,
    responses(
        (status = 200, description = "Upload URL issued", body = VideoUpload),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You don't teach this course", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 502, description = "Storage unavailable", body = ErrorResponse),
    ),
    security(
        ("bearer" = []),
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_video_upload_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<VideoUploadBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let upload =
        media::video_upload_url(state.pool(), user, state.storage(), id, &payload.filename).await?;

    Ok((StatusCode::OK, Json(upload)))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}/video",
    description = "Short-lived signed URL to stream the lesson video",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    responses(
        (status = 200, description = "Stream URL issued", body = SignedUrl),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "Lesson or video not found", body = ErrorResponse),
        (status = 502, description = "Storage unavailable", body = ErrorResponse),
    ),
    security(
        ("bearer" = []),
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_video_stream_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let signed = media::video_stream_url(state.pool(), user, state.storage(), id).await?;

    Ok((StatusCode::OK, Json(signed)))
}
