use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, HttpResponse};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::extractors::AuthenticatedUser;
use crate::models::{
    common::{MessageResponse, PeriodQuery},
    subscription::{
        CreateSubscriptionRequest, RenewalReminder, Subscription, UpdateSubscriptionRequest,
    },
};
use crate::services::database::DatabaseService;

#[get("")]
pub async fn list_subscriptions(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let subscriptions = db
        .get_subscriptions_by_owner(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch subscriptions"))?;

    Ok(HttpResponse::Ok().json(subscriptions))
}

#[post("")]
pub async fn create_subscription(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    payload: Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();
    request.validate()?;

    let subscription = db
        .create_subscription(&Subscription::new(user.user_id, request))
        .await
        .map_err(ApiError::internal("Failed to create subscription"))?;

    Ok(HttpResponse::Created().json(subscription))
}

/// Subscriptions that started in `year`, or in `year`/`month` when both are given.
#[get("/breakdown")]
pub async fn subscription_breakdown(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    query: Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            return Err(ApiError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
    }

    let subscriptions = db
        .get_subscriptions_by_owner(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch subscription breakdown"))?;

    let matching: Vec<Subscription> = match query.year {
        Some(year) => subscriptions
            .into_iter()
            .filter(|s| s.starts_within(year, query.month))
            .collect(),
        None => subscriptions,
    };

    Ok(HttpResponse::Ok().json(matching))
}

#[get("/reminders")]
pub async fn renewal_reminders(
    db: Data<DatabaseService>,
    settings: Data<AppConfig>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let subscriptions = db
        .get_subscriptions_by_owner(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch reminders"))?;

    let today = Utc::now().date_naive();
    let mut reminders: Vec<RenewalReminder> = subscriptions
        .iter()
        .filter_map(|s| s.renewal_reminder(today, settings.renewal_reminder_days))
        .collect();
    reminders.sort_by_key(|r| r.renewal_date);

    Ok(HttpResponse::Ok().json(reminders))
}

#[put("/{subscription_id}")]
pub async fn update_subscription(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    path: Path<Uuid>,
    payload: Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse, ApiError> {
    let subscription_id = path.into_inner();
    let request = payload.into_inner();
    request.validate()?;

    let mut subscription = db
        .get_subscription(&user.user_id, &subscription_id)
        .await
        .map_err(ApiError::internal("Failed to update subscription"))?
        .ok_or_else(|| ApiError::not_found("Subscription"))?;

    subscription.update(request);

    let updated = db
        .update_subscription(&subscription)
        .await
        .map_err(ApiError::internal("Failed to update subscription"))?;

    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{subscription_id}")]
pub async fn delete_subscription(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    path: Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let subscription_id = path.into_inner();

    let deleted = db
        .delete_subscription(&user.user_id, &subscription_id)
        .await
        .map_err(ApiError::internal("Failed to delete subscription"))?;

    if !deleted {
        return Err(ApiError::not_found("Subscription"));
    }

    log::info!("Deleted subscription {} for {}", subscription_id, user.user_id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("Subscription deleted")))
}
