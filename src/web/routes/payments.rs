use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::post,
};

use crate::{
    service::enrollment::{self, CheckoutOrder},
    web::{
        AppState, RequestContext, WebResult,
        dto::{
            courses::CourseRefBody,
            payments::{PaymentVerifiedResponse, PaymentVerifyBody},
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/orders", post(payments_order_handler))
        .route("/verify", post(payments_verify_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/orders",
    description = "Open a gateway order for a paid course",
    request_body = CourseRefBody,
    responses(
        (status = 201, description = "Order created", body = CheckoutOrder),
        (status = 400, description = "Course is free", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
        (status = 502, description = "Payment gateway unavailable", body = ErrorResponse),
    ),
    tag = "payments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn payments_order_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseRefBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let order =
        enrollment::create_order(state.pool(), user, state.payments(), payload.course_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    description = "Confirm a completed payment by its gateway signature and enroll",
    request_body = PaymentVerifyBody,
    responses(
        (status = 200, description = "Payment verified, enrolled", body = PaymentVerifiedResponse),
        (status = 400, description = "Signature invalid, nothing enrolled", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your order", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "payments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn payments_verify_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<PaymentVerifyBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let outcome =
        enrollment::verify_payment(state.pool(), user, state.payments(), payload.into()).await?;
    Ok((StatusCode::OK, Json(PaymentVerifiedResponse::from(outcome))))
}
