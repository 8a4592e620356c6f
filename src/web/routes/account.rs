use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};

use crate::{
    model::{ResourceTyped, check_owned, entity::Profile},
    web::{
        AppState, RequestContext, WebError, WebResult, dto::account::ProfileUpdateBody,
        error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/me", get(account_me_handler).put(account_update_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn current_profile(state: &AppState, ctx: &RequestContext) -> WebResult<Profile> {
    let user = ctx.user()?;
    Profile::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Profile::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/account/me",
    description = "Profile of the current user, created on first sign-in",
    responses(
        (status = 200, description = "Profile found", body = Profile),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn account_me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let profile = current_profile(&state, &ctx).await?;
    Ok((StatusCode::OK, Json(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/account/me",
    description = "Update the display name of the current user",
    request_body = ProfileUpdateBody,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 400, description = "Name is empty", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
async fn account_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let full_name = payload.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(WebError::resource_bad_request(
            Profile::get_resource_type(),
            "full_name must not be empty",
        ));
    }

    let profile = current_profile(&state, &ctx).await?;
    check_owned(state.pool(), user, &profile)
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?;

    let updated = profile
        .update_name(state.pool(), user, full_name)
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}
