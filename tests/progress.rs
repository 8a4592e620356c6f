use axum::http::StatusCode;
use lectern::web::UserRole;

use crate::common::*;

mod common;

#[tokio::test]
async fn course_progress_counts_completed_lessons_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Grace", UserRole::Instructor).await;
    let student = test_user(&db, "Alan", UserRole::Student).await;

    Flow::new()
        .step(create_course_action(&instructor, "Compilers", 0))
        .step(create_lesson_action(&instructor, "l1", 1))
        .step(create_lesson_action(&instructor, "l2", 2))
        .step(create_lesson_action(&instructor, "l3", 3))
        .step(create_lesson_action(&instructor, "l4", 4))
        .step(enroll_action(&student).assert_body(|body| {
            assert_eq!(body["total_lessons"], 4);
            assert_eq!(body["progress_percent"], 0);
        }))
        .step(report_progress_action(&student, "l1", 100.0))
        .step(report_progress_action(&student, "l2", 40.0).assert_body(|body| {
            assert_eq!(body["completed"], false);
            assert_eq!(body["coursePercent"], 25);
        }))
        .step(report_progress_action(&student, "l3", 100.0).assert_body(|body| {
            assert_eq!(body["coursePercent"], 50);
            assert!(body.get("certificate").is_none());
        }))
        .step(
            Action::new("course_progress", "GET", "")
                .as_user(&student)
                .with_dyn_path(|ctx| {
                    format!("/api/v1/progress/courses/{}", ctx.field("course", "id"))
                })
                .assert_body(|body| {
                    let course = &body["courseProgress"];
                    assert_eq!(course["completedLessons"], 2);
                    assert_eq!(course["totalLessons"], 4);
                    assert_eq!(course["percent"], 50);
                    assert_eq!(body["lessonProgress"].as_array().unwrap().len(), 3);
                }),
        )
        .step(
            Action::new("my_enrollments", "GET", "/api/v1/enrollments/")
                .as_user(&student)
                .assert_body(|body| {
                    let rows = body.as_array().unwrap();
                    assert_eq!(rows.len(), 1);
                    assert_eq!(rows[0]["progress_percent"], 50);
                }),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn progress_requires_enrollment_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Grace", UserRole::Instructor).await;
    let stranger = test_user(&db, "Eve", UserRole::Student).await;

    Flow::new()
        .step(create_course_action(&instructor, "Compilers", 0))
        .step(create_lesson_action(&instructor, "l1", 1))
        .step(report_progress_action(&stranger, "l1", 50.0).with_expect(StatusCode::FORBIDDEN))
        .step(
            Action::new("anonymous_report", "POST", "")
                .with_dyn_path(|ctx| format!("/api/v1/progress/lessons/{}", ctx.field("l1", "id")))
                .with_body(serde_json::json!({ "percent": 50.0 }))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn progress_out_of_range_is_clamped_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Grace", UserRole::Instructor).await;
    let student = test_user(&db, "Alan", UserRole::Student).await;

    let ctx = Flow::new()
        .step(create_course_action(&instructor, "Compilers", 0))
        .step(create_lesson_action(&instructor, "l1", 1))
        .step(create_lesson_action(&instructor, "l2", 2))
        .step(enroll_action(&student))
        .step(
            Action::new("report_negative", "POST", "")
                .as_user(&student)
                .with_dyn_path(|ctx| format!("/api/v1/progress/lessons/{}", ctx.field("l1", "id")))
                .with_body(serde_json::json!({ "percent": -20.0 })),
        )
        .step(
            Action::new("course_progress", "GET", "")
                .as_user(&student)
                .with_dyn_path(|ctx| {
                    format!("/api/v1/progress/courses/{}", ctx.field("course", "id"))
                })
                .with_save_as("progress"),
        )
        .run(&server)
        .await;

    let progress = ctx.get("progress");
    assert_eq!(progress["lessonProgress"][0]["progressPercent"], 0);
    assert_eq!(progress["courseProgress"]["percent"], 0);
}

#[tokio::test]
async fn completing_a_lesson_twice_counts_once_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Grace", UserRole::Instructor).await;
    let student = test_user(&db, "Alan", UserRole::Student).await;

    Flow::new()
        .step(create_course_action(&instructor, "Compilers", 0))
        .step(create_lesson_action(&instructor, "l1", 1))
        .step(create_lesson_action(&instructor, "l2", 2))
        .step(enroll_action(&student))
        .step(report_progress_action(&student, "l1", 100.0).assert_body(|body| {
            assert_eq!(body["coursePercent"], 50);
        }))
        .step(report_progress_action(&student, "l1", 100.0).assert_body(|body| {
            assert_eq!(body["completed"], true);
            assert_eq!(body["coursePercent"], 50);
            assert!(body.get("certificate").is_none());
        }))
        .step(
            Action::new("course_progress", "GET", "")
                .as_user(&student)
                .with_dyn_path(|ctx| {
                    format!("/api/v1/progress/courses/{}", ctx.field("course", "id"))
                })
                .assert_body(|body| {
                    assert_eq!(body["courseProgress"]["completedLessons"], 1);
                    assert_eq!(body["courseProgress"]["totalLessons"], 2);
                    assert_eq!(body["lessonProgress"].as_array().unwrap().len(), 1);
                }),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn completed_flag_is_trusted_below_full_watch_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Grace", UserRole::Instructor).await;
    let student = test_user(&db, "Alan", UserRole::Student).await;

    Flow::new()
        .step(create_course_action(&instructor, "Compilers", 0))
        .step(create_lesson_action(&instructor, "l1", 1))
        .step(create_lesson_action(&instructor, "l2", 2))
        .step(enroll_action(&student))
        .step(report_lesson_action(&student, "l1", 30.0, true).assert_body(|body| {
            assert_eq!(body["completed"], true);
            assert_eq!(body["coursePercent"], 50);
        }))
        // a full watch without the flag does not complete the lesson
        .step(report_lesson_action(&student, "l2", 100.0, false).assert_body(|body| {
            assert_eq!(body["completed"], false);
            assert_eq!(body["coursePercent"], 50);
        }))
        .step(
            Action::new("course_progress", "GET", "")
                .as_user(&student)
                .with_dyn_path(|ctx| {
                    format!("/api/v1/progress/courses/{}", ctx.field("course", "id"))
                })
                .assert_body(|body| {
                    assert_eq!(body["courseProgress"]["completedLessons"], 1);
                    let lessons = body["lessonProgress"].as_array().unwrap();
                    let partial = lessons
                        .iter()
                        .find(|l| l["progressPercent"] == 30)
                        .expect("partially watched lesson");
                    assert_eq!(partial["completed"], true);
                }),
        )
        .run(&server)
        .await;
}
