use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put, HttpResponse};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::extractors::AuthenticatedUser;
use crate::models::{
    common::MessageResponse,
    payment::{
        CreateRecurringPaymentRequest, InstallmentReminder, RecurringPayment,
        UpdateRecurringPaymentRequest,
    },
};
use crate::services::database::DatabaseService;

async fn load_owned(
    db: &DatabaseService,
    user: &AuthenticatedUser,
    payment_id: &Uuid,
    failure: &'static str,
) -> Result<RecurringPayment, ApiError> {
    db.get_recurring_payment(&user.user_id, payment_id)
        .await
        .map_err(ApiError::internal(failure))?
        .ok_or_else(|| ApiError::not_found("Recurring payment"))
}

#[get("")]
pub async fn list_recurring_payments(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let payments = db
        .get_recurring_payments_by_owner(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch recurring payments"))?;

    Ok(HttpResponse::Ok().json(payments))
}

#[post("")]
pub async fn create_recurring_payment(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    payload: Json<CreateRecurringPaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();
    request.validate()?;

    let payment = db
        .create_recurring_payment(&RecurringPayment::new(user.user_id, request))
        .await
        .map_err(ApiError::internal("Failed to create recurring payment"))?;

    Ok(HttpResponse::Created().json(payment))
}

#[get("/reminders")]
pub async fn installment_reminders(
    db: Data<DatabaseService>,
    settings: Data<AppConfig>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let payments = db
        .get_recurring_payments_by_owner(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch reminders"))?;

    let today = Utc::now().date_naive();
    let mut reminders: Vec<InstallmentReminder> = payments
        .iter()
        .flat_map(|p| p.upcoming_reminders(today, settings.installment_reminder_days))
        .collect();
    reminders.sort_by_key(|r| r.due_date);

    Ok(HttpResponse::Ok().json(reminders))
}

#[put("/{payment_id}")]
pub async fn update_recurring_payment(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    path: Path<Uuid>,
    payload: Json<UpdateRecurringPaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let payment_id = path.into_inner();
    let request = payload.into_inner();
    request.validate()?;

    let mut payment =
        load_owned(&db, &user, &payment_id, "Failed to update recurring payment").await?;
    payment.update(request);

    let updated = db
        .update_recurring_payment(&payment)
        .await
        .map_err(ApiError::internal("Failed to update recurring payment"))?;

    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{payment_id}")]
pub async fn delete_recurring_payment(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    path: Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let payment_id = path.into_inner();

    let deleted = db
        .delete_recurring_payment(&user.user_id, &payment_id)
        .await
        .map_err(ApiError::internal("Failed to delete recurring payment"))?;

    if !deleted {
        return Err(ApiError::not_found("Recurring payment"));
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Deleted")))
}

#[get("/{payment_id}/schedule")]
pub async fn payment_schedule(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    path: Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let payment_id = path.into_inner();
    let payment = load_owned(&db, &user, &payment_id, "Failed to fetch payment schedule").await?;
    Ok(HttpResponse::Ok().json(payment.schedule()))
}

#[post("/{payment_id}/installments/{installment_id}/pay")]
pub async fn mark_installment_paid(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    path: Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (payment_id, installment_id) = path.into_inner();

    let mut payment = load_owned(&db, &user, &payment_id, "Failed to mark installment paid").await?;
    let installment = payment
        .mark_installment_paid(&installment_id)
        .ok_or_else(|| ApiError::not_found("Installment"))?;

    db.update_recurring_payment(&payment)
        .await
        .map_err(ApiError::internal("Failed to mark installment paid"))?;

    log::info!("Installment {} of payment {} marked paid", installment_id, payment_id);
    Ok(HttpResponse::Ok().json(installment))
}
