use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const DEFAULT_PASSING_SCORE: i32 = 70;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    course_id: Uuid,
    title: String,
    passing_score: i32,
    time_limit_secs: Option<i32>,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn passing_score(&self) -> i32 {
        self.passing_score
    }

    pub fn time_limit_secs(&self) -> Option<i32> {
        self.time_limit_secs
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizCreate {
    pub course_id: Uuid,
    pub title: String,
    pub passing_score: Option<i32>,
    pub time_limit_secs: Option<i32>,
}

#[async_trait]
impl CrudRepository<Quiz, QuizCreate, uuid::Uuid> for Quiz {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO quizzes (id, course_id, title, passing_score, time_limit_secs)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(data.passing_score.unwrap_or(DEFAULT_PASSING_SCORE))
        .bind(data.time_limit_secs)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let passing_score = data.passing_score.unwrap_or(self.passing_score);

        sqlx::query("UPDATE quizzes SET title = $1, passing_score = $2, time_limit_secs = $3 WHERE id = $4")
            .bind(&data.title)
            .bind(passing_score)
            .bind(data.time_limit_secs)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.title = data.title;
        self.passing_score = passing_score;
        self.time_limit_secs = data.time_limit_secs;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM quizzes WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM quizzes ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Quiz {
    /// A course is expected to carry one quiz; when several exist the newest wins.
    pub async fn latest_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quizzes WHERE course_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(course_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Quiz {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        let owner: Uuid = sqlx::query_scalar("SELECT instructor_id FROM courses WHERE id = $1")
            .bind(self.course_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(owner)
    }
}
