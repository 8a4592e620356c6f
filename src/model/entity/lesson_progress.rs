use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    course_id: Uuid,
    progress_percent: i32,
    completed: bool,
    last_watched_at: DateTime<Utc>,
}

impl ResourceTyped for LessonProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::LessonProgress
    }
}

impl LessonProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn progress_percent(&self) -> i32 {
        self.progress_percent
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn last_watched_at(&self) -> &DateTime<Utc> {
        &self.last_watched_at
    }
}

pub struct LessonProgressUpsert {
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub course_id: Uuid,
    pub progress_percent: i32,
    pub completed: bool,
}

impl LessonProgress {
    /// One row per (user, lesson). Later reports overwrite earlier ones.
    pub async fn upsert(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonProgressUpsert,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO lesson_progress (id, user_id, lesson_id, course_id, progress_percent, completed, last_watched_at)
            VALUES ($1,$2,$3,$4,$5,$6, now())
            ON CONFLICT (user_id, lesson_id) DO UPDATE
            SET progress_percent = EXCLUDED.progress_percent,
                completed = EXCLUDED.completed,
                course_id = EXCLUDED.course_id,
                last_watched_at = EXCLUDED.last_watched_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.lesson_id)
        .bind(data.course_id)
        .bind(data.progress_percent)
        .bind(data.completed)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn all_by_user_course(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT lp.*
            FROM lesson_progress lp
            JOIN lessons l ON l.id = lp.lesson_id
            WHERE lp.user_id = $1 AND l.course_id = $2
            ORDER BY l.order_index, l.id
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    /// Completed lessons that still belong to the course.
    pub async fn count_completed(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM lesson_progress lp
            JOIN lessons l ON l.id = lp.lesson_id
            WHERE lp.user_id = $1 AND l.course_id = $2 AND lp.completed = TRUE
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }
}

#[async_trait]
impl HasOwner for LessonProgress {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lesson_progress_serializes_camel_case_test() {
        let progress = LessonProgress {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            lesson_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            progress_percent: 40,
            completed: false,
            last_watched_at: Utc::now(),
        };

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["progressPercent"], 40);
        assert!(json["lessonId"].is_string());
        assert!(json["lastWatchedAt"].is_string());
        assert!(json.get("progress_percent").is_none());
    }
}
