use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::entity::Certificate,
    service::certificate::{self, CertificateCheck},
    web::{
        AppState, RequestContext, WebResult, dto::certificates::CertificateIssueResponse,
        error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(certificates_mine_handler))
        .route(
            "/courses/{course_id}",
            get(certificates_check_handler).post(certificates_issue_handler),
        )
        .route("/verify/{number}", get(certificates_verify_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/",
    description = "Certificates issued to you, newest first",
    responses(
        (status = 200, description = "Certificates found", body = Vec<Certificate>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "certificates",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn certificates_mine_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let certificates = certificate::my_certificates(state.pool(), user).await?;
    Ok((StatusCode::OK, Json(certificates)))
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/courses/{course_id}",
    description = "Recompute course progress and report certificate eligibility",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Eligibility computed", body = CertificateCheck),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "certificates",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn certificates_check_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let check = certificate::check_certificate(state.pool(), user, course_id).await?;
    Ok((StatusCode::OK, Json(check)))
}

#[utoipa::path(
    post,
    path = "/api/v1/certificates/courses/{course_id}",
    description = "Issue the course certificate. Issuing again returns the same certificate",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Certificate issued or already present", body = CertificateIssueResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 412, description = "Course not complete, body carries the progress", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "certificates",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn certificates_issue_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let outcome =
        certificate::issue_certificate_if_eligible(state.pool(), user, user.user_id(), course_id)
            .await?;
    Ok((StatusCode::OK, Json(CertificateIssueResponse::from(outcome))))
}

#[utoipa::path(
    get,
    path = "/api/v1/certificates/verify/{number}",
    description = "Public check that a certificate number was issued",
    params(
        ("number" = String, Path, description = "Certificate number, e.g. LEC-20250301-9F1C2A7B3D")
    ),
    responses(
        (status = 200, description = "Certificate found", body = Certificate),
        (status = 404, description = "No such certificate", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "certificates"
)]
async fn certificates_verify_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user_or_anonymous();
    let found = certificate::verify_certificate(state.pool(), &user, &number).await?;
    Ok((StatusCode::OK, Json(found)))
}
