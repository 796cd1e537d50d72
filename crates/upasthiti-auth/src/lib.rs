//! Upasthiti Auth — password hashing, account access tokens, QR
//! attendance tokens and the signup/login service.

pub mod config;
pub mod error;
pub mod password;
pub mod qr;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use qr::{IssuedQrToken, QrPayload, QrTokenCodec};
pub use service::{AuthOutput, AuthService, LoginInput, SignupInput, require_role};
pub use token::AccessTokenClaims;
