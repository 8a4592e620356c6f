use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::{AuthenticatedUser, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Local mirror of an identity-provider user. The id is the provider's subject.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Profile {
    id: Uuid,
    email: String,
    full_name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Profile {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Profile
    }
}

impl Profile {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Name printed on certificates; falls back to the email address.
    pub fn display_name(&self) -> &str {
        display_name(&self.full_name, &self.email)
    }
}

pub(crate) fn display_name<'a>(full_name: &'a str, email: &'a str) -> &'a str {
    let trimmed = full_name.trim();
    if trimmed.is_empty() { email } else { trimmed }
}

impl Profile {
    /// Creates the profile on first sight of an identity, otherwise returns the stored one.
    pub async fn ensure(mm: &ModelManager, id: Uuid, email: &str) -> DatabaseResult<Self> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(UserRole::Student.to_string())
        .execute(mm.executor())
        .await?;

        let profile = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await?;
        Ok(profile)
    }

    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_email(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn update_name(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        full_name: String,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE profiles SET full_name = $1 WHERE id = $2")
            .bind(&full_name)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.full_name = full_name;
        Ok(self)
    }

    pub async fn set_role(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        role: UserRole,
    ) -> DatabaseResult<Self> {
        let role = role.to_string();
        sqlx::query("UPDATE profiles SET role = $1 WHERE id = $2")
            .bind(&role)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.role = role;
        Ok(self)
    }
}

#[async_trait]
impl HasOwner for Profile {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.id) // owners of profiles are themselves
    }
}
