use std::env;
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;

const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:5174"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub allowed_origins: Vec<String>,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
    /// Requests one client IP may make per `rate_limit_window`.
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl ServerConfig {
    /// Reads the configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => {
                info!("PORT not set, using default: 4000");
                4000
            }
        };

        let rate_limit_max = match lookup("RATE_LIMIT_MAX") {
            Some(raw) => positive("RATE_LIMIT_MAX", &raw)?,
            None => 100,
        };
        let rate_limit_window = match lookup("RATE_LIMIT_WINDOW_SECS") {
            Some(raw) => Duration::from_secs(positive("RATE_LIMIT_WINDOW_SECS", &raw)?.into()),
            None => Duration::from_secs(15 * 60),
        };

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None if environment == Environment::Production => {
                warn!("ALLOWED_ORIGINS not set in production; cross-origin requests will be refused");
                Vec::new()
            }
            None => DEV_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            environment,
            allowed_origins,
            jwt_secret: required("JWT_SECRET")?,
            admin_email: required("ADMIN_EMAIL")?,
            admin_password: required("ADMIN_PASSWORD")?,
            rate_limit_max,
            rate_limit_window,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::Invalid { key, reason: "must be greater than zero".to_string() }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid { key, reason: e.to_string() }),
    }
}
