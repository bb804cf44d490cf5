use actix_web::{web::Data, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::database::DatabaseService;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

pub async fn health_check(db: Data<DatabaseService>) -> Result<HttpResponse, ApiError> {
    if let Err(e) = db.health_check().await {
        log::error!("Database health check failed: {:#}", e);
        return Err(ApiError::Unavailable("Database unavailable".to_string()));
    }

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    }))
}
