use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Argon2,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::user::User;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Token carried by an authenticated session.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let secret = config.jwt_secret.trim();
        if secret.len() < 16 {
            return Err(anyhow!("JWT secret must be at least 16 characters"));
        }
        if config.token_ttl_hours <= 0 {
            return Err(anyhow!("Token TTL must be positive"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl: Duration::hours(config.token_ttl_hours),
        })
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` for a wrong password; `Err` only for a corrupt stored hash.
    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| anyhow!("Invalid stored password hash: {}", e))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(anyhow!("Password verification failed: {}", e)),
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to sign token: {}", e))?;

        Ok(IssuedToken {
            token,
            expires_at: Utc.timestamp_opt(claims.exp, 0).single().unwrap_or(expires_at),
        })
    }

    /// `None` when the token is malformed, tampered with or expired.
    pub fn verify_token(&self, token: &str) -> Option<VerifiedToken> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => log::debug!("Rejected expired token"),
                    other => log::debug!("Rejected token: {:?}", other),
                }
                return None;
            }
        };

        let user_id = Uuid::parse_str(&data.claims.sub).ok()?;
        Some(VerifiedToken {
            user_id,
            email: data.claims.email,
        })
    }
}
