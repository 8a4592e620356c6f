use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::log_error,
    gateway::PaymentProcessor,
    model::{
        ModelManager, ResourceTyped, check_owned,
        entity::{Course, Enrollment, EnrollmentWithCourseRow, Payment, PaymentCreate, PaymentStatus},
    },
    service::{
        access,
        error::{ServiceError, ServiceResult},
        progress,
    },
    web::AuthenticatedUser,
};

/// What the client-side checkout widget needs to collect a payment.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub course_id: Uuid,
    pub course_title: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment: Payment,
    pub enrollment: Enrollment,
}

async fn joinable_course(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    course_id: Uuid,
) -> ServiceResult<Course> {
    let course = access::find_course(mm, actor, course_id).await?;
    if !course.published() && !access::teaches(actor, &course) {
        return Err(ServiceError::NotFound(Course::get_resource_type()));
    }
    Ok(course)
}

/// Enrolls into the course and fills the aggregate so totals are right from the start.
async fn enroll_and_seed(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    user_id: Uuid,
    course_id: Uuid,
) -> ServiceResult<Enrollment> {
    let enrollment = Enrollment::enroll(mm, actor, user_id, course_id)
        .await
        .map_err(|e| ServiceError::database(Enrollment::get_resource_type(), e))?;

    match progress::recompute_course_progress(mm, actor, user_id, course_id).await {
        Ok(_) => access::require_enrollment(mm, actor, user_id, course_id).await,
        Err(e) => {
            log_error(&e);
            Ok(enrollment)
        }
    }
}

/// Idempotent. Paid courses go through checkout instead.
#[tracing::instrument(skip(mm, actor), fields(user_id = %actor.user_id()))]
pub async fn enroll_free(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    course_id: Uuid,
) -> ServiceResult<Enrollment> {
    let course = joinable_course(mm, actor, course_id).await?;
    if !course.is_free() {
        return Err(ServiceError::PaymentRequired);
    }

    enroll_and_seed(mm, actor, actor.user_id(), course.id()).await
}

pub async fn my_enrollments(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
) -> ServiceResult<Vec<EnrollmentWithCourseRow>> {
    EnrollmentWithCourseRow::all_by_user(mm, actor, actor.user_id())
        .await
        .map_err(|e| ServiceError::database(Enrollment::get_resource_type(), e))
}

#[tracing::instrument(skip(mm, actor, payments), fields(user_id = %actor.user_id()))]
pub async fn create_order(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    payments: &dyn PaymentProcessor,
    course_id: Uuid,
) -> ServiceResult<CheckoutOrder> {
    let course = joinable_course(mm, actor, course_id).await?;
    if course.is_free() {
        return Err(ServiceError::bad_request(
            Course::get_resource_type(),
            "course is free, enroll directly",
        ));
    }

    let enrolled = Enrollment::find(mm, actor, actor.user_id(), course.id())
        .await
        .map_err(|e| ServiceError::database(Enrollment::get_resource_type(), e))?;
    if enrolled.is_some() {
        return Err(ServiceError::AlreadyEnrolled(course.id()));
    }

    let receipt = Uuid::new_v4().simple().to_string();
    let notes = serde_json::json!({
        "course_id": course.id(),
        "user_id": actor.user_id(),
    });
    let order = payments.create_order(course.price(), &receipt, notes).await?;

    let payment = Payment::create(
        mm,
        actor,
        PaymentCreate {
            user_id: actor.user_id(),
            course_id: course.id(),
            order_id: order.id.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
        },
    )
    .await
    .map_err(|e| ServiceError::database(Payment::get_resource_type(), e))?;

    tracing::info!(order_id = payment.order_id(), amount = payment.amount(), "payment order created");

    Ok(CheckoutOrder {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: payments.key_id().to_string(),
        course_id: course.id(),
        course_title: course.title().to_string(),
    })
}

/// Checks the gateway signature and enrolls on success.
///
/// A rejected signature marks the order failed and never enrolls. Confirming an
/// already paid order again is a no-op that returns the enrollment.
#[tracing::instrument(skip(mm, actor, payments, confirmation), fields(user_id = %actor.user_id(), order_id = %confirmation.order_id))]
pub async fn verify_payment(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    payments: &dyn PaymentProcessor,
    confirmation: PaymentConfirmation,
) -> ServiceResult<PaymentOutcome> {
    let payment = Payment::find_by_order_id(mm, actor, &confirmation.order_id)
        .await
        .map_err(|e| ServiceError::database(Payment::get_resource_type(), e))?
        .ok_or(ServiceError::NotFound(Payment::get_resource_type()))?;

    check_owned(mm, actor, &payment)
        .await
        .map_err(|e| ServiceError::database(Payment::get_resource_type(), e))?;

    let valid = payments.verify_signature(
        &confirmation.order_id,
        &confirmation.payment_id,
        &confirmation.signature,
    )?;

    if !valid {
        tracing::warn!("payment signature rejected");
        if payment.status() != PaymentStatus::Paid {
            payment
                .mark_failed(mm, actor)
                .await
                .map_err(|e| ServiceError::database(Payment::get_resource_type(), e))?;
        }
        return Err(ServiceError::InvalidSignature(confirmation.order_id));
    }

    let payment = if payment.status() == PaymentStatus::Paid {
        payment
    } else {
        payment
            .mark_paid(mm, actor, confirmation.payment_id)
            .await
            .map_err(|e| ServiceError::database(Payment::get_resource_type(), e))?
    };

    let enrollment = enroll_and_seed(mm, actor, payment.user_id(), payment.course_id()).await?;
    tracing::info!(course_id = %payment.course_id(), "paid enrollment confirmed");

    Ok(PaymentOutcome {
        payment,
        enrollment,
    })
}
