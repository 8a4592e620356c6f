use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};

use crate::{
    model::entity::{Enrollment, EnrollmentWithCourseRow},
    service::enrollment,
    web::{
        AppState, RequestContext, WebResult, dto::courses::CourseRefBody, error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(enrollments_list_handler).post(enrollments_join_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/enrollments/",
    description = "Your enrollments with their progress aggregate",
    responses(
        (status = 200, description = "Enrollments found", body = Vec<EnrollmentWithCourseRow>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn enrollments_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let enrollments = enrollment::my_enrollments(state.pool(), user).await?;
    Ok((StatusCode::OK, Json(enrollments)))
}

#[utoipa::path(
    post,
    path = "/api/v1/enrollments/",
    description = "Join a free course. Joining twice returns the existing enrollment",
    request_body = CourseRefBody,
    responses(
        (status = 200, description = "Enrolled", body = Enrollment),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 402, description = "Course has to be purchased", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn enrollments_join_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseRefBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let enrolled = enrollment::enroll_free(state.pool(), user, payload.course_id).await?;
    Ok((StatusCode::OK, Json(enrolled)))
}
