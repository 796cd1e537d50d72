//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Development fallback secret. Refused when running in production.
pub const DEV_JWT_SECRET: &str = "dev_secret_change_me";

/// Configuration for the authentication service and token codecs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HMAC secret for HS256 signing of access and QR tokens.
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim), checked on every verification.
    pub jwt_issuer: String,
    /// Access token lifetime in seconds (default: 7200 = 2 hours).
    pub access_token_lifetime_secs: u64,
    /// QR token lifetime in seconds (default: 300 = 5 minutes).
    pub qr_token_ttl_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length accepted at signup.
    pub min_password_length: usize,
}

impl AuthConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.into(),
            jwt_issuer: "upasthiti".into(),
            access_token_lifetime_secs: 7200,
            qr_token_ttl_secs: 300,
            pepper: None,
            min_password_length: 8,
        }
    }
}
