use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// A user's registration in a course, carrying the rolled-up progress aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrollment {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    enrolled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    progress_percent: i32,
    completed_lessons: i32,
    total_lessons: i32,
}

impl ResourceTyped for Enrollment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Enrollment
    }
}

impl Enrollment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn enrolled_at(&self) -> &DateTime<Utc> {
        &self.enrolled_at
    }

    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        self.completed_at.as_ref()
    }

    pub fn progress_percent(&self) -> i32 {
        self.progress_percent
    }

    pub fn completed_lessons(&self) -> i32 {
        self.completed_lessons
    }

    pub fn total_lessons(&self) -> i32 {
        self.total_lessons
    }
}

/// Aggregate written back by the progress recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub percent: i32,
    pub completed_lessons: i32,
    pub total_lessons: i32,
}

impl Enrollment {
    pub async fn find(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Idempotent: an existing enrollment is returned untouched.
    pub async fn enroll(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (id, user_id, course_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .execute(mm.executor())
        .await?;

        let row = Self::find(mm, actor, user_id, course_id).await?;
        row.ok_or(sqlx::Error::RowNotFound.into())
    }

    /// Writes the aggregate. `completed_at` is stamped the first time the course
    /// reaches 100% and kept afterwards. Returns `None` when the user is not enrolled.
    pub async fn store_progress(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        course_id: Uuid,
        snapshot: ProgressSnapshot,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            r#"
            UPDATE enrollments
            SET progress_percent = $3,
                completed_lessons = $4,
                total_lessons = $5,
                completed_at = CASE
                    WHEN $3 >= 100 THEN COALESCE(completed_at, now())
                    ELSE completed_at
                END
            WHERE user_id = $1 AND course_id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(snapshot.percent)
        .bind(snapshot.completed_lessons)
        .bind(snapshot.total_lessons)
        .fetch_optional(mm.executor())
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl HasOwner for Enrollment {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

// Utils

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct EnrollmentWithCourseRow {
    pub course_id: Uuid,
    pub course_title: String,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_percent: i32,
    pub completed_lessons: i32,
    pub total_lessons: i32,
}

impl EnrollmentWithCourseRow {
    pub async fn all_by_user(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                e.course_id,
                c.title AS course_title,
                e.enrolled_at,
                e.completed_at,
                e.progress_percent,
                e.completed_lessons,
                e.total_lessons
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.user_id = $1
            ORDER BY e.enrolled_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
