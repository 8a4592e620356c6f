use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{Certificate, Question, QuestionOptions, Quiz, QuizAttempt, QuizAttemptAnswer},
    service::quiz::{AttemptDetail, AttemptOutcome, AttemptSubmission, QuestionResult, QuizContent},
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptBody {
    /// Question id -> selected option key. Omitted questions count as wrong.
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
    #[serde(default)]
    pub time_spent_seconds: i64,
}

impl From<QuizAttemptBody> for AttemptSubmission {
    fn from(body: QuizAttemptBody) -> Self {
        Self {
            answers: body.answers,
            time_spent_secs: body.time_spent_seconds,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptResponse {
    attempt_id: Uuid,
    score: i32,
    passed: bool,
    total_awarded: i32,
    total_possible: i32,
    per_question_results: Vec<QuestionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate: Option<Certificate>,
}

impl From<AttemptOutcome> for QuizAttemptResponse {
    fn from(outcome: AttemptOutcome) -> Self {
        Self {
            attempt_id: outcome.attempt.id(),
            score: outcome.grade.score,
            passed: outcome.grade.passed,
            total_awarded: outcome.grade.total_awarded,
            total_possible: outcome.grade.total_possible,
            per_question_results: outcome.grade.per_question_results,
            certificate: outcome.certificate,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuestionView {
    id: Uuid,
    prompt: String,
    #[schema(value_type = std::collections::BTreeMap<String, String>)]
    options: QuestionOptions,
    points: i32,
    order_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    correct_key: Option<String>,
}

impl QuestionView {
    fn new(question: Question, reveal_answer: bool) -> Self {
        Self {
            id: question.id(),
            prompt: question.prompt().to_string(),
            options: question.options().clone(),
            points: question.points(),
            order_index: question.order_index(),
            correct_key: reveal_answer.then(|| question.correct_key().to_string()),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuizResponse {
    quiz: Quiz,
    questions: Vec<QuestionView>,
}

impl From<QuizContent> for QuizResponse {
    fn from(content: QuizContent) -> Self {
        let reveal = content.reveal_answers;
        Self {
            quiz: content.quiz,
            questions: content
                .questions
                .into_iter()
                .map(|q| QuestionView::new(q, reveal))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AttemptDetailResponse {
    attempt: QuizAttempt,
    answers: Vec<QuizAttemptAnswer>,
}

impl From<AttemptDetail> for AttemptDetailResponse {
    fn from(detail: AttemptDetail) -> Self {
        Self {
            attempt: detail.attempt,
            answers: detail.answers,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn student_view_hides_answer_key_test() {
        let question = Question::fixture("Capital of France?", &[("p", "Paris"), ("l", "Lyon")], "p", 1);

        let hidden = serde_json::to_value(QuestionView::new(question.clone(), false)).unwrap();
        assert!(hidden.get("correct_key").is_none());
        assert_eq!(hidden["options"]["p"], "Paris");

        let shown = serde_json::to_value(QuestionView::new(question, true)).unwrap();
        assert_eq!(shown["correct_key"], "p");
    }

    #[test]
    fn attempt_body_defaults_test() {
        let body: QuizAttemptBody = serde_json::from_str("{}").unwrap();
        assert!(body.answers.is_empty());
        assert_eq!(body.time_spent_seconds, 0);

        let id = Uuid::new_v4();
        let body: QuizAttemptBody =
            serde_json::from_value(serde_json::json!({ "answers": { (id.to_string()): "b" }, "timeSpentSeconds": 42 }))
                .unwrap();
        assert_eq!(body.answers.get(&id).map(String::as_str), Some("b"));
        assert_eq!(body.time_spent_seconds, 42);
    }
}
