use actix_web::web::{Data, Json};
use actix_web::{post, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::user::{normalize_email, AuthResponse, LoginRequest, RegisterRequest, User};
use crate::services::{
    auth::AuthService,
    database::{DatabaseService, DuplicateEmail},
};

fn auth_response(auth: &AuthService, user: &User) -> Result<AuthResponse, ApiError> {
    let issued = auth
        .issue_token(user)
        .map_err(ApiError::internal("Failed to issue token"))?;

    Ok(AuthResponse {
        id: user.id,
        email: user.email.clone(),
        token: issued.token,
        expires_at: issued.expires_at,
    })
}

#[post("/register")]
pub async fn register_user(
    db: Data<DatabaseService>,
    auth: Data<AuthService>,
    payload: Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();
    request.validate()?;

    let email = normalize_email(&request.email);
    let existing = db
        .get_user_by_email(&email)
        .await
        .map_err(ApiError::internal("Failed to register user"))?;
    if existing.is_some() {
        return Err(ApiError::Validation("User already exists".to_string()));
    }

    let password_hash = auth
        .hash_password(&request.password)
        .map_err(ApiError::internal("Failed to register user"))?;

    let user = db
        .create_user(&User::new(&email, password_hash))
        .await
        .map_err(|e| {
            if e.is::<DuplicateEmail>() {
                ApiError::Validation("User already exists".to_string())
            } else {
                ApiError::internal("Failed to register user")(e)
            }
        })?;

    log::info!("Registered user {}", user.id);
    Ok(HttpResponse::Created().json(auth_response(&auth, &user)?))
}

#[post("/login")]
pub async fn login_user(
    db: Data<DatabaseService>,
    auth: Data<AuthService>,
    payload: Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();
    request.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = db
        .get_user_by_email(&normalize_email(&request.email))
        .await
        .map_err(ApiError::internal("Failed to log in"))?
        .ok_or_else(invalid)?;

    let matches = auth
        .verify_password(&request.password, &user.password_hash)
        .map_err(ApiError::internal("Failed to log in"))?;
    if !matches {
        log::warn!("Failed login attempt for user {}", user.id);
        return Err(invalid());
    }

    Ok(HttpResponse::Ok().json(auth_response(&auth, &user)?))
}
