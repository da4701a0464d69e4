//! API server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults. Production deployments MUST set `CHIT_JWT_SECRET`.

use serde::{Deserialize, Serialize};
use std::env;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Seconds between expiry sweeps (the sweep also runs once at startup)
    pub sweep_interval_secs: u64,

    /// Username for the bootstrapped admin account (fresh installs only)
    pub admin_username: String,

    /// Password for the bootstrapped admin account (fresh installs only)
    pub admin_password: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("CHIT_HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CHIT_HTTP_PORT".to_string()))?,

            database_path: env::var("CHIT_DATABASE_PATH")
                .unwrap_or_else(|_| "./chit.db".to_string()),

            jwt_secret: env::var("CHIT_JWT_SECRET")
                // Development fallback; in production this MUST be set
                .unwrap_or_else(|_| "chit-dev-secret-change-in-production".to_string()),

            jwt_lifetime_secs: env::var("CHIT_JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CHIT_JWT_LIFETIME_SECS".to_string()))?,

            sweep_interval_secs: env::var("CHIT_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string()) // hourly
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CHIT_SWEEP_INTERVAL_SECS".to_string()))?,

            admin_username: env::var("CHIT_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),

            admin_password: env::var("CHIT_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".to_string()),
        };

        if config.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "CHIT_SWEEP_INTERVAL_SECS".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
