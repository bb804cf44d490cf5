pub mod analytics;
pub mod auth;
pub mod extractors;
pub mod health;
pub mod payments;
pub mod subscriptions;

use actix_web::web;

use crate::error::ApiError;

/// Mounts every route under `/api`. Shared state (`DatabaseService`,
/// `AuthService`, `AppConfig`) is expected as `app_data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid query parameters: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid path: {}", err)).into()
    }))
    .service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .service(auth::register_user)
                    .service(auth::login_user),
            )
            .service(
                web::scope("/analytics")
                    .service(analytics::monthly_summary)
                    .service(analytics::yearly_summary)
                    .service(analytics::spending_trends)
                    .service(analytics::category_breakdown),
            )
            .service(
                web::scope("/subscriptions")
                    .service(subscriptions::list_subscriptions)
                    .service(subscriptions::create_subscription)
                    .service(subscriptions::subscription_breakdown)
                    .service(subscriptions::renewal_reminders)
                    .service(subscriptions::update_subscription)
                    .service(subscriptions::delete_subscription),
            )
            .service(
                web::scope("/payments")
                    .service(payments::list_recurring_payments)
                    .service(payments::create_recurring_payment)
                    .service(payments::installment_reminders)
                    .service(payments::update_recurring_payment)
                    .service(payments::delete_recurring_payment)
                    .service(payments::payment_schedule)
                    .service(payments::mark_installment_paid),
            )
            .route("/health", web::get().to(health::health_check)),
    );
}
