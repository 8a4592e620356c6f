use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    course_id: Uuid,
    title: String,
    content: String,
    video_path: Option<String>,
    duration_secs: i32,
    order_index: i32,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn course_id(&self) -> uuid::Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn video_path(&self) -> Option<&str> {
        self.video_path.as_deref()
    }

    pub fn duration_secs(&self) -> i32 {
        self.duration_secs
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub course_id: Uuid,
    pub title: String,
    pub content: String,
    pub duration_secs: Option<i32>,
    pub order_index: Option<i32>,
}

#[async_trait]
impl CrudRepository<Lesson, LessonCreate, uuid::Uuid> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO lessons (id, course_id, title, content, duration_secs, order_index)
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.duration_secs.unwrap_or(0))
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    /// The owning course never changes on update.
    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let duration = data.duration_secs.unwrap_or(self.duration_secs);
        let order_index = data.order_index.unwrap_or(self.order_index);

        sqlx::query("UPDATE lessons SET title = $1, content = $2, duration_secs = $3, order_index = $4 WHERE id = $5")
            .bind(&data.title)
            .bind(&data.content)
            .bind(duration)
            .bind(order_index)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.title = data.title;
        self.content = data.content;
        self.duration_secs = duration;
        self.order_index = order_index;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lessons WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM lessons ORDER BY course_id, order_index LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lesson {
    pub async fn all_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE course_id = $1 ORDER BY order_index, id")
            .bind(course_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn count_by_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn set_video_path(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        path: String,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE lessons SET video_path = $1 WHERE id = $2")
            .bind(&path)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.video_path = Some(path);
        Ok(self)
    }
}

#[async_trait]
impl HasOwner for Lesson {
    type OwnerId = uuid::Uuid;

    /// Lessons belong to whoever teaches their course.
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
