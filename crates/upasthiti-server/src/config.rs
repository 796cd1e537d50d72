//! Layered server configuration.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `upasthiti.toml` in the working directory (optional)
//! 3. Legacy `JWT_SECRET` and `PORT` environment variables
//! 4. `UPASTHITI_*` environment variables, `__` separating sections
//!
//! `UPASTHITI_AUTH__JWT_SECRET` maps to `auth.jwt_secret`,
//! `UPASTHITI_HTTP__PORT` to `http.port`, and so on.

use std::net::SocketAddr;
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use upasthiti_auth::AuthConfig;
use upasthiti_db::DbConfig;

pub const CONFIG_FILE: &str = "upasthiti.toml";
const PRODUCTION: &str = "production";
const MAX_QR_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
const MAX_ACCESS_TOKEN_LIFETIME_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Deployment environment name; `production` enables strict checks.
    pub environment: String,
    pub http: HttpConfig,
    pub auth: AuthConfig,
    pub storage: DbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            http: HttpConfig::default(),
            auth: AuthConfig::default(),
            storage: DbConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load and validate configuration from every source.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the working directory first, then [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::load()
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if Path::new(CONFIG_FILE).exists() {
            figment = figment.merge(Toml::file(CONFIG_FILE));
        }

        figment
            .merge(
                Env::raw()
                    .only(&["JWT_SECRET"])
                    .map(|_| "auth.jwt_secret".into()),
            )
            .merge(Env::raw().only(&["PORT"]).map(|_| "http.port".into()))
            .merge(Env::prefixed("UPASTHITI_").split("__"))
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case(PRODUCTION)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http.host, self.http.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                field: "http.host".into(),
                reason: format!("{e}"),
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt_secret".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.is_production() && self.auth.uses_dev_secret() {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt_secret".into(),
                reason: "JWT_SECRET must be set in production".into(),
            });
        }
        if !(1..=MAX_QR_TOKEN_TTL_SECS).contains(&self.auth.qr_token_ttl_secs) {
            return Err(ConfigError::InvalidValue {
                field: "auth.qr_token_ttl_secs".into(),
                reason: format!("must be between 1 and {MAX_QR_TOKEN_TTL_SECS}"),
            });
        }
        if !(1..=MAX_ACCESS_TOKEN_LIFETIME_SECS).contains(&self.auth.access_token_lifetime_secs) {
            return Err(ConfigError::InvalidValue {
                field: "auth.access_token_lifetime_secs".into(),
                reason: format!("must be between 1 and {MAX_ACCESS_TOKEN_LIFETIME_SECS}"),
            });
        }
        self.bind_addr()?;
        Ok(())
    }
}
