use crate::{
    Config,
    web::{AppState, doc::ApiDoc},
};
use axum::Router;
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod account;
pub mod certificates;
pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod payments;
pub mod progress;
pub mod quizzes;

const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl PaginationQuery {
    /// `(limit, offset)` with the limit capped and negatives dropped.
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

pub fn build_app<S: Send + Sync + Clone + 'static>(state: AppState, config: &Config) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/v1/account/", account::routes(state.clone()))
        .nest("/api/v1/courses/", courses::routes(state.clone()))
        .nest("/api/v1/lessons/", lessons::routes(state.clone()))
        .nest("/api/v1/enrollments/", enrollments::routes(state.clone()))
        .nest("/api/v1/progress/", progress::routes(state.clone()))
        .nest("/api/v1/quizzes/", quizzes::routes(state.clone()))
        .nest("/api/v1/certificates/", certificates::routes(state.clone()))
        .nest("/api/v1/payments/", payments::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pagination_bounds_test() {
        let q = |limit, offset| PaginationQuery { limit, offset }.bounds();

        assert_eq!(q(None, None), (DEFAULT_PAGE_LIMIT, 0));
        assert_eq!(q(Some(5), Some(10)), (5, 10));
        assert_eq!(q(Some(0), Some(-3)), (1, 0));
        assert_eq!(q(Some(10_000), None), (MAX_PAGE_LIMIT, 0));
    }
}
