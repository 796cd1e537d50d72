//! Error types for the Upasthiti system.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UpasthitiError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Bad signature, wrong issuer/algorithm, malformed payload and
    /// expiry all collapse into this one variant.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Unknown session: {session_id}")]
    UnknownSession { session_id: String },

    #[error("Location required for this session")]
    LocationRequired,

    #[error("Out of range: {distance_meters:.1} m from session origin (allowed {radius_meters:.1} m)")]
    OutOfRange {
        distance_meters: f64,
        radius_meters: f64,
    },

    #[error("Session {session_id} is only editable between {start_date} and {end_date}")]
    EditWindowClosed {
        session_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),
}

impl UpasthitiError {
    /// Shorthand for a [`UpasthitiError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`UpasthitiError::NotFound`] error.
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type UpasthitiResult<T> = Result<T, UpasthitiError>;
