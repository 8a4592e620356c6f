use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, PaginatableRepository, ResourceTyped, check_owned,
        entity::{Course, CourseCreate, Lesson},
    },
    service::access,
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::lessons::LessonSummary, error::ErrorResponse, middlewares, routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(courses_create_handler))
        .route("/page", get(courses_page_handler))
        .route("/mine", get(courses_mine_handler))
        .route(
            "/{id}",
            get(courses_get_handler)
                .put(courses_update_handler)
                .delete(courses_delete_handler),
        )
        .route("/{id}/lessons", get(courses_lessons_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn validate(payload: &CourseCreate) -> WebResult<()> {
    if payload.title.trim().is_empty() {
        return Err(WebError::resource_bad_request(
            Course::get_resource_type(),
            "title must not be empty",
        ));
    }
    if payload.price.is_some_and(|p| p < 0) {
        return Err(WebError::resource_bad_request(
            Course::get_resource_type(),
            "price must not be negative",
        ));
    }
    Ok(())
}

/// Unpublished courses are only visible to whoever teaches them.
async fn visible_course(state: &AppState, user: &AuthenticatedUser, id: Uuid) -> WebResult<Course> {
    let course = access::find_course(state.pool(), user, id).await?;
    if !course.published() && !access::teaches(user, &course) {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }
    Ok(course)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/page",
    description = "Page through the published catalog, newest first",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = crate::model::Page<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_page_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_or_anonymous();
    let (limit, offset) = page.bounds();
    let courses = Course::page(state.pool(), &user, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/",
    description = "Create a course taught by the current user",
    request_body = CourseCreate,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid course", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only instructors can create courses", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn courses_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    if !user.can_author() {
        return Err(WebError::resource_forbidden(Course::get_resource_type()));
    }
    validate(&payload)?;

    let created = Course::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/mine",
    description = "Courses taught by the current user, drafts included",
    responses(
        (status = 200, description = "Courses found", body = Vec<Course>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn courses_mine_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let courses = Course::all_by_instructor(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to get")
    ),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_or_anonymous();
    let course = visible_course(&state, &user, id).await?;
    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to update")
    ),
    request_body = CourseCreate,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid course", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You don't teach this course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn courses_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    validate(&payload)?;

    let found = access::find_course(state.pool(), user, id).await?;
    check_owned(state.pool(), user, &found)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}",
    description = "Delete a course with its lessons and quizzes",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to delete")
    ),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You don't teach this course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn courses_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = access::find_course(state.pool(), user, id).await?;
    check_owned(state.pool(), user, &found)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/lessons",
    description = "Ordered lesson outline of a course, without lesson content",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Lessons found", body = Vec<LessonSummary>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn courses_lessons_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_or_anonymous();
    let course = visible_course(&state, &user, id).await?;

    let lessons: Vec<LessonSummary> = Lesson::all_by_course(state.pool(), &user, course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .into_iter()
        .map(LessonSummary::from)
        .collect();

    Ok((StatusCode::OK, Json(lessons)))
}
