use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One immutable grading event. Attempts are an append-only log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizAttempt {
    id: Uuid,
    user_id: Uuid,
    quiz_id: Uuid,
    score: i32,
    total_questions: i32,
    awarded_points: i32,
    possible_points: i32,
    passed: bool,
    time_spent_secs: i32,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for QuizAttempt {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuizAttempt
    }
}

impl QuizAttempt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn total_questions(&self) -> i32 {
        self.total_questions
    }

    pub fn awarded_points(&self) -> i32 {
        self.awarded_points
    }

    pub fn possible_points(&self) -> i32 {
        self.possible_points
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn time_spent_secs(&self) -> i32 {
        self.time_spent_secs
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

pub struct QuizAttemptCreate {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub awarded_points: i32,
    pub possible_points: i32,
    pub passed: bool,
    pub time_spent_secs: i32,
}

impl QuizAttempt {
    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizAttemptCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO quiz_attempts
                (id, user_id, quiz_id, score, total_questions, awarded_points, possible_points, passed, time_spent_secs)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.quiz_id)
        .bind(data.score)
        .bind(data.total_questions)
        .bind(data.awarded_points)
        .bind(data.possible_points)
        .bind(data.passed)
        .bind(data.time_spent_secs)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quiz_attempts WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Newest first.
    pub async fn all_by_user_quiz(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2 ORDER BY created_at DESC, id",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    pub async fn all_by_quiz(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        quiz_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_attempts WHERE quiz_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(quiz_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for QuizAttempt {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

/// Per-question outcome captured at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizAttemptAnswer {
    id: Uuid,
    attempt_id: Uuid,
    question_id: Uuid,
    selected_key: Option<String>,
    correct_key: String,
    is_correct: bool,
    points_awarded: i32,
    points_possible: i32,
}

impl QuizAttemptAnswer {
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected_key.as_deref()
    }

    pub fn correct_key(&self) -> &str {
        &self.correct_key
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn points_awarded(&self) -> i32 {
        self.points_awarded
    }

    pub fn points_possible(&self) -> i32 {
        self.points_possible
    }
}

pub struct QuizAttemptAnswerCreate {
    pub question_id: Uuid,
    pub selected_key: Option<String>,
    pub correct_key: String,
    pub is_correct: bool,
    pub points_awarded: i32,
    pub points_possible: i32,
}

impl QuizAttemptAnswer {
    pub async fn create_many(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        attempt_id: Uuid,
        answers: Vec<QuizAttemptAnswerCreate>,
    ) -> DatabaseResult<Vec<Self>> {
        if answers.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = sqlx::QueryBuilder::new(
            "INSERT INTO quiz_attempt_answers \
             (id, attempt_id, question_id, selected_key, correct_key, is_correct, points_awarded, points_possible) ",
        );
        builder.push_values(answers, |mut row, answer| {
            row.push_bind(Uuid::new_v4())
                .push_bind(attempt_id)
                .push_bind(answer.question_id)
                .push_bind(answer.selected_key)
                .push_bind(answer.correct_key)
                .push_bind(answer.is_correct)
                .push_bind(answer.points_awarded)
                .push_bind(answer.points_possible);
        });
        builder.push(" RETURNING *");

        let rows = builder
            .build_query_as::<Self>()
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }

    pub async fn all_by_attempt(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        attempt_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT a.*
            FROM quiz_attempt_answers a
            LEFT JOIN questions q ON q.id = a.question_id
            WHERE a.attempt_id = $1
            ORDER BY q.order_index NULLS LAST, a.question_id
            "#,
        )
        .bind(attempt_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
