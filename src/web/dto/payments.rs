use serde::{Deserialize, Serialize};

use crate::{
    model::entity::{Enrollment, Payment},
    service::enrollment::{PaymentConfirmation, PaymentOutcome},
};

/// Values the checkout widget hands back after a successful payment.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PaymentVerifyBody {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

impl From<PaymentVerifyBody> for PaymentConfirmation {
    fn from(body: PaymentVerifyBody) -> Self {
        Self {
            order_id: body.order_id,
            payment_id: body.payment_id,
            signature: body.signature,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PaymentVerifiedResponse {
    payment: Payment,
    enrollment: Enrollment,
}

impl From<PaymentOutcome> for PaymentVerifiedResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        Self {
            payment: outcome.payment,
            enrollment: outcome.enrollment,
        }
    }
}
