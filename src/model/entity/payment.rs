use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaymentStatus {
    Created,
    Paid,
    Failed,
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value {
            "paid" => Self::Paid,
            "failed" => Self::Failed,
            _ => Self::Created,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Local record of a gateway order for one (user, course) purchase.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Payment {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    order_id: String,
    payment_id: Option<String>,
    amount: i64,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
}

impl ResourceTyped for Payment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Payment
    }
}

impl Payment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from(self.status.as_str())
    }

    pub fn verified_at(&self) -> Option<&DateTime<Utc>> {
        self.verified_at.as_ref()
    }
}

pub struct PaymentCreate {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}

impl Payment {
    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: PaymentCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO payments (id, user_id, course_id, order_id, amount, currency, status)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.course_id)
        .bind(&data.order_id)
        .bind(data.amount)
        .bind(&data.currency)
        .bind(PaymentStatus::Created.to_string())
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    pub async fn find_by_order_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        order_id: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM payments WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn mark_paid(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        payment_id: String,
    ) -> DatabaseResult<Self> {
        let verified_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            UPDATE payments
            SET status = $1, payment_id = $2, verified_at = now()
            WHERE id = $3
            RETURNING verified_at
            "#,
        )
        .bind(PaymentStatus::Paid.to_string())
        .bind(&payment_id)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        self.status = PaymentStatus::Paid.to_string();
        self.payment_id = Some(payment_id);
        self.verified_at = Some(verified_at);
        Ok(self)
    }

    pub async fn mark_failed(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self> {
        sqlx::query("UPDATE payments SET status = $1 WHERE id = $2")
            .bind(PaymentStatus::Failed.to_string())
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.status = PaymentStatus::Failed.to_string();
        Ok(self)
    }
}

#[async_trait]
impl HasOwner for Payment {
    type OwnerId = uuid::Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}
