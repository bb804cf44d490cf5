use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub renewal_reminder_days: i64,     // Look-ahead window for subscription renewals
    pub installment_reminder_days: i64, // Look-ahead window for pending installments
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5000),
            },

            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "mem://".to_string()),
                namespace: env::var("DATABASE_NAMESPACE")
                    .unwrap_or_else(|_| "expense_tracker".to_string()),
                name: env::var("DATABASE_NAME").unwrap_or_else(|_| "main".to_string()),
            },

            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")?,
                token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                    .unwrap_or_else(|_| "720".to_string())
                    .parse()
                    .unwrap_or(720),
            },

            app: AppConfig {
                renewal_reminder_days: env::var("RENEWAL_REMINDER_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
                installment_reminder_days: env::var("INSTALLMENT_REMINDER_DAYS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .unwrap_or(7),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            renewal_reminder_days: 30,
            installment_reminder_days: 7,
        }
    }
}
