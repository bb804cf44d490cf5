use actix_web::web::{Data, Query};
use actix_web::{get, HttpResponse};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::extractors::AuthenticatedUser;
use crate::models::common::PeriodQuery;
use crate::services::{analytics, database::DatabaseService};

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[get("/monthly-summary")]
pub async fn monthly_summary(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    query: Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    let (month, year) = query.resolve(Utc::now().date_naive())?;

    let (subscriptions, payments) = db
        .get_expense_records(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch expense summary"))?;

    let summary = analytics::monthly_summary(&subscriptions, &payments, month, year)
        .map_err(ApiError::internal("Failed to fetch expense summary"))?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/yearly-summary")]
pub async fn yearly_summary(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    query: Query<YearQuery>,
) -> Result<HttpResponse, ApiError> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let (subscriptions, payments) = db
        .get_expense_records(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch yearly expense summary"))?;

    let summary = analytics::yearly_summary(&subscriptions, &payments, year)
        .map_err(ApiError::internal("Failed to fetch yearly expense summary"))?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/spending-trends")]
pub async fn spending_trends(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let (subscriptions, payments) = db
        .get_expense_records(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch spending trends"))?;

    let trends = analytics::spending_trends(&subscriptions, &payments, Utc::now().year())
        .map_err(ApiError::internal("Failed to fetch spending trends"))?;
    Ok(HttpResponse::Ok().json(trends))
}

/// `year`/`month` are validated but the buckets always cover every record.
#[get("/category-breakdown")]
pub async fn category_breakdown(
    db: Data<DatabaseService>,
    user: AuthenticatedUser,
    query: Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    query.resolve(Utc::now().date_naive())?;

    let (subscriptions, payments) = db
        .get_expense_records(&user.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch category breakdown"))?;

    let breakdown = analytics::category_breakdown(&subscriptions, &payments)
        .map_err(ApiError::internal("Failed to fetch category breakdown"))?;
    Ok(HttpResponse::Ok().json(breakdown))
}
