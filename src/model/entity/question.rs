use std::collections::BTreeMap;

use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Option key -> option text. Keys are arbitrary, not necessarily `A`..`D`.
pub type QuestionOptions = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Question {
    id: Uuid,
    quiz_id: Uuid,
    prompt: String,
    #[schema(value_type = BTreeMap<String, String>)]
    options: Json<QuestionOptions>,
    correct_key: String,
    points: i32,
    order_index: i32,
}

impl ResourceTyped for Question {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Question
    }
}

impl Question {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &QuestionOptions {
        &self.options.0
    }

    pub fn correct_key(&self) -> &str {
        &self.correct_key
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionCreate {
    pub quiz_id: Uuid,
    pub prompt: String,
    pub options: QuestionOptions,
    pub correct_key: String,
    pub points: Option<i32>,
    pub order_index: Option<i32>,
}

impl QuestionCreate {
    /// The answer key must name one of the options and points must be positive.
    pub fn is_valid(&self) -> bool {
        self.options.contains_key(&self.correct_key) && self.points.unwrap_or(1) > 0
    }
}

#[async_trait]
impl CrudRepository<Question, QuestionCreate, uuid::Uuid> for Question {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO questions (id, quiz_id, prompt, options, correct_key, points, order_index)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.quiz_id)
        .bind(&data.prompt)
        .bind(Json(&data.options))
        .bind(&data.correct_key)
        .bind(data.points.unwrap_or(1))
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let points = data.points.unwrap_or(self.points);
        let order_index = data.order_index.unwrap_or(self.order_index);

        sqlx::query("UPDATE questions SET prompt = $1, options = $2, correct_key = $3, points = $4, order_index = $5 WHERE id = $6")
            .bind(&data.prompt)
            .bind(Json(&data.options))
            .bind(&data.correct_key)
            .bind(points)
            .bind(order_index)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.prompt = data.prompt;
        self.options = Json(data.options);
        self.correct_key = data.correct_key;
        self.points = points;
        self.order_index = order_index;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: uuid::Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM questions WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM questions ORDER BY quiz_id, order_index LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

// Utils
impl Question {
    pub async fn all_by_quiz(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        quiz_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT *
            FROM questions q
            WHERE q.quiz_id = $1
            ORDER BY q.order_index, q.id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    #[cfg(test)]
    pub(crate) fn fixture(prompt: &str, options: &[(&str, &str)], correct_key: &str, points: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_id: Uuid::nil(),
            prompt: prompt.to_string(),
            options: Json(
                options
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            correct_key: correct_key.to_string(),
            points,
            order_index: 0,
        }
    }
}

#[async_trait]
impl HasOwner for Question {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner: Uuid = sqlx::query_scalar(
            r#"
            SELECT c.instructor_id
            FROM quizzes q
            JOIN courses c ON c.id = q.course_id
            WHERE q.id = $1
            "#,
        )
        .bind(self.quiz_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(owner)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn create(correct_key: &str, points: Option<i32>) -> QuestionCreate {
        QuestionCreate {
            quiz_id: Uuid::nil(),
            prompt: String::from("2 + 2?"),
            options: [("x", "3"), ("y", "4")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            correct_key: correct_key.to_string(),
            points,
            order_index: None,
        }
    }

    #[test]
    fn question_create_validation_test() {
        assert!(create("y", None).is_valid());
        assert!(create("y", Some(3)).is_valid());
        assert!(!create("z", None).is_valid());
        // keys are compared exactly
        assert!(!create("Y", None).is_valid());
        assert!(!create("y", Some(0)).is_valid());
        assert!(!create("y", Some(-2)).is_valid());
    }
}
