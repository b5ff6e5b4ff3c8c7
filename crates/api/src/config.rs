use std::str::FromStr;

use axum::http::HeaderValue;
use chrono::{Duration, Utc};

use crate::auth::jwt::JwtConfig;
use crate::auth::secret_hash::HashingConfig;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set and non-empty")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Read `var` from the environment and parse it, falling back to `default`
/// when the variable is unset.
pub fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}

/// Convert `value` (read from `var`) into a lifetime with `to_duration`.
///
/// The lifetime must be positive and small enough that adding it to the
/// current time stays inside chrono's date range; anything else is
/// [`ConfigError::Invalid`].
pub fn check_lifetime(
    var: &'static str,
    value: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    to_duration(value)
        .filter(|lifetime| *lifetime > Duration::zero())
        .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
        .ok_or_else(|| ConfigError::Invalid {
            var,
            value: value.to_string(),
        })
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on waiting for in-flight notifications at shutdown
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Take the client address from the first `X-Forwarded-For` entry instead
    /// of the TCP peer (default: `false`). Only enable behind a trusted proxy.
    pub trust_forwarded_for: bool,
    /// Where address-change notices are sent.
    pub alert_recipient: String,
    /// PostgreSQL URL. When unset the server keeps sessions in memory.
    pub database_url: Option<String>,
    /// Interval of the expired-session purge, `0` disables it (default: `3600`).
    pub session_cleanup_interval_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Argon2 cost used to hash refresh secrets.
    pub hashing: HashingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `TRUST_FORWARDED_FOR`           | `false`                 |
    /// | `ALERT_RECIPIENT`               | `security@localhost`    |
    /// | `DATABASE_URL`                  | unset                   |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                  |
    ///
    /// See [`JwtConfig::from_env`] and [`HashingConfig::from_env`] for the
    /// remaining variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_raw =
            std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into());
        let cors_origins: Vec<String> = cors_raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        Ok(Self {
            host,
            port: env_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30)?,
            trust_forwarded_for: env_or("TRUST_FORWARDED_FOR", false)?,
            alert_recipient: std::env::var("ALERT_RECIPIENT")
                .unwrap_or_else(|_| "security@localhost".into()),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            session_cleanup_interval_secs: env_or("SESSION_CLEANUP_INTERVAL_SECS", 3600)?,
            jwt: JwtConfig::from_env()?,
            hashing: HashingConfig::from_env()?,
        })
    }
}
