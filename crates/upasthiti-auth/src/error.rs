//! Authentication error types.

use thiserror::Error;
use upasthiti_core::error::UpasthitiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for UpasthitiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => UpasthitiError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                UpasthitiError::AuthenticationFailed {
                    reason: "invalid or expired token".into(),
                }
            }
            AuthError::InvalidInput(message) => UpasthitiError::Validation { message },
            AuthError::Crypto(msg) => UpasthitiError::Crypto(msg),
        }
    }
}
