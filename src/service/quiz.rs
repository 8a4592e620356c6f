//! Grading of quiz attempts and the authoring around it.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::log_error,
    model::{
        CrudRepository, ModelManager, ResourceTyped,
        entity::{
            Certificate, Course, Question, QuestionCreate, Quiz, QuizAttempt, QuizAttemptAnswer,
            QuizAttemptAnswerCreate, QuizAttemptCreate, QuizCreate,
        },
    },
    service::{
        access::{self, Participation},
        certificate,
        error::{ServiceError, ServiceResult},
        progress::percent_of,
    },
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: Uuid,
    pub selected_key: Option<String>,
    pub correct_key: String,
    pub is_correct: bool,
    pub points_awarded: i32,
    pub points_possible: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub score: i32,
    pub passed: bool,
    pub total_awarded: i32,
    pub total_possible: i32,
    pub per_question_results: Vec<QuestionResult>,
}

/// Grades `answers` against the current answer key.
///
/// Unanswered questions score zero but still count toward the possible total.
/// Keys are compared exactly. A quiz without questions scores 0.
pub fn grade(passing_score: i32, questions: &[Question], answers: &HashMap<Uuid, String>) -> Grade {
    let mut total_awarded: i64 = 0;
    let mut total_possible: i64 = 0;

    let per_question_results: Vec<QuestionResult> = questions
        .iter()
        .map(|q| {
            let selected = answers.get(&q.id());
            let is_correct = selected.is_some_and(|key| key == q.correct_key());
            let points_awarded = if is_correct { q.points() } else { 0 };

            total_awarded += i64::from(points_awarded);
            total_possible += i64::from(q.points());

            QuestionResult {
                question_id: q.id(),
                selected_key: selected.cloned(),
                correct_key: q.correct_key().to_string(),
                is_correct,
                points_awarded,
                points_possible: q.points(),
            }
        })
        .collect();

    let score = percent_of(total_awarded, total_possible);

    Grade {
        score,
        passed: score >= passing_score,
        total_awarded: i32::try_from(total_awarded).unwrap_or(i32::MAX),
        total_possible: i32::try_from(total_possible).unwrap_or(i32::MAX),
        per_question_results,
    }
}

#[derive(Debug, Clone)]
pub struct AttemptSubmission {
    pub answers: HashMap<Uuid, String>,
    pub time_spent_secs: i64,
}

#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub attempt: QuizAttempt,
    pub grade: Grade,
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Clone)]
pub struct AttemptDetail {
    pub attempt: QuizAttempt,
    pub answers: Vec<QuizAttemptAnswer>,
}

async fn find_quiz(mm: &ModelManager, actor: &AuthenticatedUser, quiz_id: Uuid) -> ServiceResult<Quiz> {
    Quiz::find_by_id(mm, actor, quiz_id)
        .await
        .map_err(|e| ServiceError::database(Quiz::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(Quiz::get_resource_type()))
}

async fn questions_of(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    quiz_id: Uuid,
) -> ServiceResult<Vec<Question>> {
    Question::all_by_quiz(mm, actor, quiz_id)
        .await
        .map_err(|e| ServiceError::database(Question::get_resource_type(), e))
}

#[tracing::instrument(skip(mm, actor, submission), fields(user_id = %actor.user_id()))]
pub async fn submit_attempt(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    quiz_id: Uuid,
    submission: AttemptSubmission,
) -> ServiceResult<AttemptOutcome> {
    let quiz = find_quiz(mm, actor, quiz_id).await?;
    let course = access::find_course(mm, actor, quiz.course_id()).await?;
    let participation = access::participation(mm, actor, &course).await?;

    let questions = questions_of(mm, actor, quiz.id()).await?;
    if submission
        .answers
        .keys()
        .any(|id| !questions.iter().any(|q| q.id() == *id))
    {
        return Err(ServiceError::NotFound(Question::get_resource_type()));
    }

    let grade = grade(quiz.passing_score(), &questions, &submission.answers);
    let time_spent_secs = i32::try_from(submission.time_spent_secs.max(0)).unwrap_or(i32::MAX);

    let attempt = QuizAttempt::create(
        mm,
        actor,
        QuizAttemptCreate {
            user_id: actor.user_id(),
            quiz_id: quiz.id(),
            score: grade.score,
            total_questions: i32::try_from(questions.len()).unwrap_or(i32::MAX),
            awarded_points: grade.total_awarded,
            possible_points: grade.total_possible,
            passed: grade.passed,
            time_spent_secs,
        },
    )
    .await
    .map_err(|e| ServiceError::database(QuizAttempt::get_resource_type(), e))?;

    let rows = grade
        .per_question_results
        .iter()
        .map(|r| QuizAttemptAnswerCreate {
            question_id: r.question_id,
            selected_key: r.selected_key.clone(),
            correct_key: r.correct_key.clone(),
            is_correct: r.is_correct,
            points_awarded: r.points_awarded,
            points_possible: r.points_possible,
        })
        .collect();

    if let Err(error) = QuizAttemptAnswer::create_many(mm, actor, attempt.id(), rows).await {
        return Err(ServiceError::PartialWrite {
            attempt_id: attempt.id(),
            error,
        });
    }

    tracing::info!(attempt_id = %attempt.id(), score = grade.score, passed = grade.passed, "quiz attempt graded");

    let mut issued = None;
    if grade.passed && matches!(participation, Participation::Enrolled(_)) {
        match certificate::issue_certificate_if_eligible(mm, actor, actor.user_id(), course.id()).await {
            Ok(outcome) => issued = Some(outcome.certificate),
            Err(ServiceError::PreconditionFailed { progress }) => {
                tracing::debug!(percent = progress.percent, "passed quiz, course not complete yet");
            }
            Err(e) => {
                tracing::warn!("automatic certificate issuance failed");
                log_error(&e);
            }
        }
    }

    Ok(AttemptOutcome {
        attempt,
        grade,
        certificate: issued,
    })
}

#[tracing::instrument(skip(mm, actor, data))]
pub async fn create_quiz(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    data: QuizCreate,
) -> ServiceResult<Quiz> {
    if data.passing_score.is_some_and(|s| !(0..=100).contains(&s)) {
        return Err(ServiceError::bad_request(
            Quiz::get_resource_type(),
            "passing_score must be within 0..=100",
        ));
    }
    if data.time_limit_secs.is_some_and(|t| t <= 0) {
        return Err(ServiceError::bad_request(
            Quiz::get_resource_type(),
            "time_limit_secs must be positive",
        ));
    }

    let course = access::find_course(mm, actor, data.course_id).await?;
    access::require_instructor(actor, &course)?;

    Quiz::create(mm, actor, data)
        .await
        .map_err(|e| ServiceError::database(Quiz::get_resource_type(), e))
}

#[tracing::instrument(skip(mm, actor, data))]
pub async fn add_question(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    data: QuestionCreate,
) -> ServiceResult<Question> {
    if !data.is_valid() {
        return Err(ServiceError::bad_request(
            Question::get_resource_type(),
            "correct_key must name one of the options and points must be positive",
        ));
    }

    let quiz = find_quiz(mm, actor, data.quiz_id).await?;
    let course = access::find_course(mm, actor, quiz.course_id()).await?;
    access::require_instructor(actor, &course)?;

    Question::create(mm, actor, data)
        .await
        .map_err(|e| ServiceError::database(Question::get_resource_type(), e))
}

/// A quiz with its questions, ordered. Answer keys are only meant for the instructor.
#[derive(Debug, Clone)]
pub struct QuizContent {
    pub quiz: Quiz,
    pub questions: Vec<Question>,
    pub reveal_answers: bool,
}

pub async fn quiz_content(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    quiz_id: Uuid,
) -> ServiceResult<QuizContent> {
    let quiz = find_quiz(mm, actor, quiz_id).await?;
    let course = access::find_course(mm, actor, quiz.course_id()).await?;
    let participation = access::participation(mm, actor, &course).await?;
    let questions = questions_of(mm, actor, quiz.id()).await?;

    Ok(QuizContent {
        quiz,
        questions,
        reveal_answers: matches!(participation, Participation::Instructor),
    })
}

/// Several quizzes per course are tolerated; the most recently created one is current.
pub async fn current_quiz(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    course_id: Uuid,
) -> ServiceResult<QuizContent> {
    let course = access::find_course(mm, actor, course_id).await?;
    access::participation(mm, actor, &course).await?;

    let quiz = Quiz::latest_by_course(mm, actor, course.id())
        .await
        .map_err(|e| ServiceError::database(Quiz::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(Quiz::get_resource_type()))?;

    quiz_content(mm, actor, quiz.id()).await
}

/// Own attempts for students; every attempt for the course instructor.
pub async fn list_attempts(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    quiz_id: Uuid,
) -> ServiceResult<Vec<QuizAttempt>> {
    let quiz = find_quiz(mm, actor, quiz_id).await?;
    let course = access::find_course(mm, actor, quiz.course_id()).await?;

    let attempts = if access::teaches(actor, &course) {
        QuizAttempt::all_by_quiz(mm, actor, quiz.id()).await
    } else {
        QuizAttempt::all_by_user_quiz(mm, actor, actor.user_id(), quiz.id()).await
    };

    attempts.map_err(|e| ServiceError::database(QuizAttempt::get_resource_type(), e))
}

pub async fn attempt_detail(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    attempt_id: Uuid,
) -> ServiceResult<AttemptDetail> {
    let attempt = QuizAttempt::find_by_id(mm, actor, attempt_id)
        .await
        .map_err(|e| ServiceError::database(QuizAttempt::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(QuizAttempt::get_resource_type()))?;

    if attempt.user_id() != actor.user_id() {
        let quiz = find_quiz(mm, actor, attempt.quiz_id()).await?;
        let course: Course = access::find_course(mm, actor, quiz.course_id()).await?;
        if !access::teaches(actor, &course) {
            return Err(ServiceError::Forbidden(QuizAttempt::get_resource_type()));
        }
    }

    let answers = QuizAttemptAnswer::all_by_attempt(mm, actor, attempt.id())
        .await
        .map_err(|e| ServiceError::database(QuizAttempt::get_resource_type(), e))?;

    Ok(AttemptDetail { attempt, answers })
}

#[cfg(test)]
mod test {
    use super::*;

    fn abc(correct: &str, points: i32) -> Question {
        Question::fixture("?", &[("a", "one"), ("b", "two"), ("c", "three")], correct, points)
    }

    fn answers(pairs: &[(&Question, &str)]) -> HashMap<Uuid, String> {
        pairs
            .iter()
            .map(|(q, key)| (q.id(), key.to_string()))
            .collect()
    }

    #[test]
    fn grade_weighted_points_test() {
        let q1 = abc("a", 1);
        let q2 = abc("b", 1);
        let q3 = abc("c", 2);
        let submitted = answers(&[(&q1, "a"), (&q2, "c"), (&q3, "c")]);

        let grade = grade(70, &[q1, q2, q3], &submitted);
        assert_eq!(grade.total_awarded, 3);
        assert_eq!(grade.total_possible, 4);
        assert_eq!(grade.score, 75);
        assert!(grade.passed);

        let correct: Vec<bool> = grade.per_question_results.iter().map(|r| r.is_correct).collect();
        assert_eq!(correct, vec![true, false, true]);
    }

    #[test]
    fn grade_omitted_answer_counts_as_wrong_test() {
        let q1 = abc("a", 1);
        let q2 = abc("b", 1);
        let q3 = abc("c", 2);

        let omitted = grade(70, &[q1.clone(), q2.clone(), q3.clone()], &answers(&[(&q1, "a"), (&q2, "b")]));
        let wrong = grade(70, &[q1.clone(), q2.clone(), q3.clone()], &answers(&[(&q1, "a"), (&q2, "b"), (&q3, "a")]));

        assert_eq!(omitted.total_possible, 4);
        assert_eq!(omitted.total_awarded, 2);
        assert_eq!(omitted.score, wrong.score);
        assert_eq!(omitted.score, 50);
        assert!(!omitted.passed);

        let last = &omitted.per_question_results[2];
        assert_eq!(last.selected_key, None);
        assert_eq!(last.points_awarded, 0);
        assert_eq!(last.points_possible, 2);
    }

    #[test]
    fn grade_keys_are_case_sensitive_test() {
        let q = abc("b", 1);
        let grade = grade(50, &[q.clone()], &answers(&[(&q, "B")]));
        assert_eq!(grade.score, 0);
        assert!(!grade.per_question_results[0].is_correct);
    }

    #[test]
    fn grade_is_deterministic_test() {
        let qs = vec![abc("a", 3), abc("b", 1), abc("c", 5)];
        let submitted = answers(&[(&qs[0], "a"), (&qs[2], "b")]);

        assert_eq!(grade(60, &qs, &submitted), grade(60, &qs, &submitted));
    }

    #[test]
    fn grade_empty_quiz_test() {
        let grade_default = grade(70, &[], &HashMap::new());
        assert_eq!(grade_default.score, 0);
        assert_eq!(grade_default.total_possible, 0);
        assert!(!grade_default.passed);

        // a zero passing score is met by the zero fallback
        assert!(grade(0, &[], &HashMap::new()).passed);
    }

    #[test]
    fn grade_passing_boundary_test() {
        let qs: Vec<Question> = (0..10).map(|_| abc("a", 1)).collect();
        let seven: HashMap<Uuid, String> = qs.iter().take(7).map(|q| (q.id(), String::from("a"))).collect();

        let at_boundary = grade(70, &qs, &seven);
        assert_eq!(at_boundary.score, 70);
        assert!(at_boundary.passed);

        assert!(!grade(71, &qs, &seven).passed);
    }

    #[test]
    fn grade_rounds_score_test() {
        let qs = vec![abc("a", 1), abc("a", 1), abc("a", 1)];
        let one = answers(&[(&qs[0], "a")]);
        let two = answers(&[(&qs[0], "a"), (&qs[1], "a")]);

        assert_eq!(grade(0, &qs, &one).score, 33);
        assert_eq!(grade(0, &qs, &two).score, 67);
    }

    #[test]
    fn grade_serializes_camel_case_test() {
        let q = abc("a", 2);
        let grade = grade(70, &[q.clone()], &answers(&[(&q, "a")]));
        let json = serde_json::to_value(&grade).unwrap();

        assert_eq!(json["totalAwarded"], 2);
        assert_eq!(json["totalPossible"], 2);
        assert_eq!(json["passed"], true);
        assert_eq!(json["perQuestionResults"][0]["isCorrect"], true);
        assert_eq!(json["perQuestionResults"][0]["selectedKey"], "a");
    }
}
