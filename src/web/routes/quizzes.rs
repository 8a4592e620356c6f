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
    model::entity::{Question, QuestionCreate, Quiz, QuizAttempt, QuizCreate},
    service::quiz,
    web::{
        AppState, RequestContext, WebResult,
        dto::quizzes::{AttemptDetailResponse, QuizAttemptBody, QuizAttemptResponse, QuizResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(quizzes_create_handler))
        .route("/questions", post(quizzes_add_question_handler))
        .route("/course/{course_id}", get(quizzes_current_handler))
        .route("/attempts/{attempt_id}", get(quizzes_attempt_detail_handler))
        .route("/{id}", get(quizzes_get_handler))
        .route(
            "/{id}/attempts",
            post(quizzes_submit_handler).get(quizzes_attempts_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/",
    description = "Create a quiz for a course you teach",
    request_body = QuizCreate,
    responses(
        (status = 201, description = "Quiz created", body = Quiz),
        (status = 400, description = "Invalid quiz", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You don't teach this course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn quizzes_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let created = quiz::create_quiz(state.pool(), user, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/questions",
    description = "Add a question to a quiz of a course you teach",
    request_body = QuestionCreate,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 400, description = "Answer key is not one of the options", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You don't teach this course", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn quizzes_add_question_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let created = quiz::add_question(state.pool(), user, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}",
    description = "Quiz with its questions. Answer keys are only shown to the instructor",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz")
    ),
    responses(
        (status = 200, description = "Quiz found", body = QuizResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn quizzes_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let content = quiz::quiz_content(state.pool(), user, id).await?;
    Ok((StatusCode::OK, Json(QuizResponse::from(content))))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/course/{course_id}",
    description = "Current quiz of a course. With several quizzes the newest one is current",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Quiz found", body = QuizResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "Course has no quiz", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn quizzes_current_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let content = quiz::current_quiz(state.pool(), user, course_id).await?;
    Ok((StatusCode::OK, Json(QuizResponse::from(content))))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/attempts",
    description = "Submit answers. The attempt is graded against the current answer key \
        and stored with its per-question results",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz")
    ),
    request_body = QuizAttemptBody,
    responses(
        (status = 201, description = "Attempt graded", body = QuizAttemptResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "Quiz or question not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn quizzes_submit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuizAttemptBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let outcome = quiz::submit_attempt(state.pool(), user, id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(QuizAttemptResponse::from(outcome))))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}/attempts",
    description = "Your attempts, newest first. Instructors see every attempt",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz")
    ),
    responses(
        (status = 200, description = "Attempts found", body = Vec<QuizAttempt>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn quizzes_attempts_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let attempts = quiz::list_attempts(state.pool(), user, id).await?;
    Ok((StatusCode::OK, Json(attempts)))
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/attempts/{attempt_id}",
    description = "One attempt with the results captured when it was graded",
    params(
        ("attempt_id" = Uuid, Path, description = "ID of the attempt")
    ),
    responses(
        (status = 200, description = "Attempt found", body = AttemptDetailResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your attempt", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quizzes",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn quizzes_attempt_detail_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let detail = quiz::attempt_detail(state.pool(), user, attempt_id).await?;
    Ok((StatusCode::OK, Json(AttemptDetailResponse::from(detail))))
}
