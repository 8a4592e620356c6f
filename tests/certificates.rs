use axum::http::StatusCode;
use lectern::web::UserRole;

use crate::common::*;

mod common;

fn issue_action(student: &TestUser) -> Action {
    Action::new("issue_certificate", "POST", "")
        .as_user(student)
        .with_dyn_path(|ctx| format!("/api/v1/certificates/courses/{}", ctx.field("course", "id")))
}

#[tokio::test]
async fn certificate_is_issued_once_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Donald", UserRole::Instructor).await;
    let student = test_user(&db, "Frances", UserRole::Student).await;

    let ctx = Flow::new()
        .step(create_course_action(&instructor, "Algorithms", 0))
        .step(create_lesson_action(&instructor, "l1", 1))
        .step(create_lesson_action(&instructor, "l2", 2))
        .step(enroll_action(&student))
        .step(report_progress_action(&student, "l1", 100.0))
        .step(report_progress_action(&student, "l2", 100.0).with_save_as("last_report"))
        .step(issue_action(&student).with_save_as("first"))
        .step(issue_action(&student).with_save_as("second"))
        .step(
            Action::new("my_certificates", "GET", "/api/v1/certificates/")
                .as_user(&student)
                .with_save_as("mine"),
        )
        .run(&server)
        .await;

    // reaching 100% issues the certificate right away
    let auto = &ctx.get("last_report")["certificate"];
    assert!(auto["certificate_number"].is_string());

    let first = ctx.get("first");
    let second = ctx.get("second");
    assert_eq!(first["eligible"], true);
    assert_eq!(first["newlyIssued"], false);
    assert_eq!(second["newlyIssued"], false);
    assert_eq!(
        first["certificate"]["certificate_number"],
        auto["certificate_number"]
    );
    assert_eq!(
        first["certificate"]["certificate_number"],
        second["certificate"]["certificate_number"]
    );
    assert_eq!(first["certificate"]["student_name"], "Frances");
    assert_eq!(first["certificate"]["course_title"], "Algorithms");
    assert_eq!(first["certificate"]["instructor_name"], "Donald");

    let number = first["certificate"]["certificate_number"].as_str().unwrap();
    assert!(number.starts_with("LEC-"));
    assert_eq!(ctx.get("mine").as_array().unwrap().len(), 1);

    // public lookup needs no token
    server
        .get(&format!("/api/v1/certificates/verify/{number}"))
        .await
        .assert_status_ok();
    server
        .get("/api/v1/certificates/verify/LEC-00000000-0000000000")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn incomplete_course_is_not_certified_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Donald", UserRole::Instructor).await;
    let student = test_user(&db, "Frances", UserRole::Student).await;

    Flow::new()
        .step(create_course_action(&instructor, "Algorithms", 0))
        .step(create_lesson_action(&instructor, "l1", 1))
        .step(create_lesson_action(&instructor, "l2", 2))
        .step(create_lesson_action(&instructor, "l3", 3))
        .step(create_lesson_action(&instructor, "l4", 4))
        .step(enroll_action(&student))
        .step(report_progress_action(&student, "l1", 100.0))
        .step(report_progress_action(&student, "l2", 100.0))
        .step(report_progress_action(&student, "l3", 100.0))
        .step(
            issue_action(&student)
                .with_expect(StatusCode::PRECONDITION_FAILED)
                .assert_body(|body| {
                    assert_eq!(body["eligible"], false);
                    assert_eq!(body["progress"]["percent"], 75);
                }),
        )
        .step(
            Action::new("check", "GET", "")
                .as_user(&student)
                .with_dyn_path(|ctx| {
                    format!("/api/v1/certificates/courses/{}", ctx.field("course", "id"))
                })
                .assert_body(|body| {
                    assert_eq!(body["eligible"], false);
                    assert!(body.get("certificate").is_none());
                }),
        )
        .step(
            Action::new("my_certificates", "GET", "/api/v1/certificates/")
                .as_user(&student)
                .assert_body(|body| assert!(body.as_array().unwrap().is_empty())),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn certificate_requires_enrollment_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Donald", UserRole::Instructor).await;
    let stranger = test_user(&db, "Mallory", UserRole::Student).await;

    Flow::new()
        .step(create_course_action(&instructor, "Algorithms", 0))
        .step(issue_action(&stranger).with_expect(StatusCode::FORBIDDEN))
        .run(&server)
        .await;
}

#[tokio::test]
async fn certificate_for_unknown_course_is_not_found_test() {
    let db = setup_test_db().await;
    let server = setup_server(&db).await;
    let instructor = test_user(&db, "Donald", UserRole::Instructor).await;
    let student = test_user(&db, "Frances", UserRole::Student).await;
    let missing = format!("/api/v1/certificates/courses/{}", uuid::Uuid::new_v4());
    let missing_again = missing.clone();

    Flow::new()
        .step(create_course_action(&instructor, "Algorithms", 0))
        .step(enroll_action(&student))
        .step(
            Action::new("check_missing", "GET", "")
                .as_user(&student)
                .with_dyn_path(move |_| missing.clone())
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("issue_missing", "POST", "")
                .as_user(&student)
                .with_dyn_path(move |_| missing_again.clone())
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&server)
        .await;
}
