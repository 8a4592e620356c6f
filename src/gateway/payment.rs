use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    auth,
    gateway::error::{GatewayResult, json_or_upstream},
};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: String,
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync + std::fmt::Debug {
    /// Public key handed to the client-side checkout widget.
    fn key_id(&self) -> &str;

    fn currency(&self) -> &str;

    async fn create_order(
        &self,
        amount: i64,
        receipt: &str,
        notes: serde_json::Value,
    ) -> GatewayResult<PaymentOrder>;

    fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> GatewayResult<bool>;
}

#[derive(Debug, Clone)]
pub struct GatewayPaymentProcessor {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
    currency: String,
}

impl GatewayPaymentProcessor {
    pub fn new<S: Into<String>>(base_url: S, key_id: S, key_secret: S, currency: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            currency: currency.into(),
        }
    }

    pub fn from_config(config: &crate::config::Payment) -> Self {
        Self::new(
            config.base_url(),
            config.key_id(),
            config.key_secret(),
            config.currency(),
        )
    }
}

#[async_trait]
impl PaymentProcessor for GatewayPaymentProcessor {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn currency(&self) -> &str {
        &self.currency
    }

    #[tracing::instrument(skip(self, notes))]
    async fn create_order(
        &self,
        amount: i64,
        receipt: &str,
        notes: serde_json::Value,
    ) -> GatewayResult<PaymentOrder> {
        let resp = self
            .client
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({
                "amount": amount,
                "currency": self.currency,
                "receipt": receipt,
                "notes": notes,
            }))
            .send()
            .await?;

        json_or_upstream(resp).await
    }

    fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> GatewayResult<bool> {
        Ok(auth::verify_payment_signature(
            order_id,
            payment_id,
            signature,
            &self.key_secret,
        )?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gateway_verify_signature_test() {
        let processor = GatewayPaymentProcessor::new("https://pay.local/v1/", "key", "s", "INR");
        let good = auth::sign_payment("o1", "p1", "s").unwrap();

        assert!(processor.verify_signature("o1", "p1", &good).unwrap());
        assert!(!processor.verify_signature("o1", "p1", "0000").unwrap());
        assert_eq!(processor.base_url, "https://pay.local/v1");
    }
}
