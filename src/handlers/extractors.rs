use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web::Data, FromRequest, HttpRequest};
use anyhow::anyhow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::auth::AuthService;

/// The caller behind a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let auth = req
        .app_data::<Data<AuthService>>()
        .ok_or_else(|| ApiError::from(anyhow!("AuthService is not registered")))?;

    let token = bearer_token(req)
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?;

    let verified = auth
        .verify_token(token)
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, token failed".to_string()))?;

    Ok(AuthenticatedUser {
        user_id: verified.user_id,
        email: verified.email,
    })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
