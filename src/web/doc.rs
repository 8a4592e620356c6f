use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct AuthModifier;

impl Modify for AuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the identity provider"))
                        .build(),
                ),
            );
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "Same token as the bearer one, for browser clients",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::account::account_me_handler,
        crate::web::routes::account::account_update_handler,
        crate::web::routes::courses::courses_page_handler,
        crate::web::routes::courses::courses_create_handler,
        crate::web::routes::courses::courses_mine_handler,
        crate::web::routes::courses::courses_get_handler,
        crate::web::routes::courses::courses_update_handler,
        crate::web::routes::courses::courses_delete_handler,
        crate::web::routes::courses::courses_lessons_handler,
        crate::web::routes::lessons::lessons_create_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_update_handler,
        crate::web::routes::lessons::lessons_delete_handler,
        crate::web::routes::lessons::lessons_video_upload_handler,
        crate::web::routes::lessons::lessons_video_stream_handler,
        crate::web::routes::enrollments::enrollments_list_handler,
        crate::web::routes::enrollments::enrollments_join_handler,
        crate::web::routes::progress::progress_report_handler,
        crate::web::routes::progress::progress_course_handler,
        crate::web::routes::quizzes::quizzes_create_handler,
        crate::web::routes::quizzes::quizzes_add_question_handler,
        crate::web::routes::quizzes::quizzes_get_handler,
        crate::web::routes::quizzes::quizzes_current_handler,
        crate::web::routes::quizzes::quizzes_submit_handler,
        crate::web::routes::quizzes::quizzes_attempts_handler,
        crate::web::routes::quizzes::quizzes_attempt_detail_handler,
        crate::web::routes::certificates::certificates_mine_handler,
        crate::web::routes::certificates::certificates_check_handler,
        crate::web::routes::certificates::certificates_issue_handler,
        crate::web::routes::certificates::certificates_verify_handler,
        crate::web::routes::payments::payments_order_handler,
        crate::web::routes::payments::payments_verify_handler,
    ),
    modifiers(&AuthModifier),
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn openapi_lists_core_paths_test() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/v1/progress/lessons/{lesson_id}"));
        assert!(paths.contains_key("/api/v1/quizzes/{quiz_id}/attempts"));
        assert!(paths.contains_key("/api/v1/certificates/courses/{course_id}"));
        assert!(paths.contains_key("/api/v1/payments/verify"));
    }
}
