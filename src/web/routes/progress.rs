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
    service::progress::{self, LessonProgressReport},
    web::{
        AppState, RequestContext, WebResult,
        dto::progress::{CourseProgressResponse, LessonProgressBody, LessonProgressResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/lessons/{lesson_id}", post(progress_report_handler))
        .route("/courses/{course_id}", get(progress_course_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/progress/lessons/{lesson_id}",
    description = "Report how much of a lesson was watched. Recomputes course progress \
        and issues the certificate once the course is complete",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the watched lesson")
    ),
    request_body = LessonProgressBody,
    responses(
        (status = 200, description = "Progress stored", body = LessonProgressResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "Lesson not found in this course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn progress_report_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(payload): Json<LessonProgressBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let report = LessonProgressReport {
        course_id: payload.course_id,
        lesson_id,
        percent: payload.percent,
        completed: payload.completed,
    };

    let outcome = progress::report_lesson_progress(state.pool(), user, report).await?;
    Ok((StatusCode::OK, Json(LessonProgressResponse::from(outcome))))
}

#[utoipa::path(
    get,
    path = "/api/v1/progress/courses/{course_id}",
    description = "Per-lesson progress of the current user plus the course aggregate",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Progress found", body = CourseProgressResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn progress_course_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let progress = progress::course_progress(state.pool(), user, course_id).await?;

    Ok((StatusCode::OK, Json(CourseProgressResponse::from(progress))))
}
