use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    model::{ResourceTyped, entity::Profile},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

/// `Authorization: Bearer` wins over the `SID` cookie.
fn request_token(req: &Request, cookies: &Cookies) -> Option<(&'static str, String)> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    if let Some(token) = bearer {
        return Some(("Authorization", token));
    }

    cookies
        .get(AUTH_TOKEN)
        .map(|c| (AUTH_TOKEN, c.value().to_string()))
}

/// Resolves the caller. Anonymous requests pass with an empty context, a
/// present but invalid token is rejected with 401.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let (source, token) = match request_token(&req, &cookies) {
        Some(found) => found,
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            return Ok(next.run(req).await);
        }
    };

    let identity = state
        .identity()
        .verify(&token)
        .await
        .map_err(|e| WebError::auth_token_invalid(source, e))?;

    let profile = Profile::ensure(state.pool(), identity.user_id, &identity.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?;

    req.extensions_mut().insert(RequestContext::new(Some(AuthenticatedUser::new(
        profile.id(),
        profile.role(),
    ))));

    Ok(next.run(req).await)
}
