//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": "...", "code": "..."}` with
//! a status derived from the domain error. Clients match on `code`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;
use upasthiti_core::error::UpasthitiError;

/// Stable error code constants.
pub mod error_code {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const UNKNOWN_SESSION: &str = "UNKNOWN_SESSION";
    pub const LOCATION_REQUIRED: &str = "LOCATION_REQUIRED";
    pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";
    pub const EDIT_WINDOW_CLOSED: &str = "EDIT_WINDOW_CLOSED";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub UpasthitiError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            UpasthitiError::Validation { .. } | UpasthitiError::LocationRequired => {
                StatusCode::BAD_REQUEST
            }
            UpasthitiError::NotFound { .. } | UpasthitiError::UnknownSession { .. } => {
                StatusCode::NOT_FOUND
            }
            UpasthitiError::AlreadyExists { .. } | UpasthitiError::EditWindowClosed { .. } => {
                StatusCode::CONFLICT
            }
            UpasthitiError::AuthenticationFailed { .. } | UpasthitiError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            UpasthitiError::AuthorizationDenied { .. } | UpasthitiError::OutOfRange { .. } => {
                StatusCode::FORBIDDEN
            }
            UpasthitiError::Storage(_) | UpasthitiError::Crypto(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match &self.0 {
            UpasthitiError::Validation { .. } => error_code::VALIDATION_FAILED,
            UpasthitiError::NotFound { .. } => error_code::NOT_FOUND,
            UpasthitiError::AlreadyExists { .. } => error_code::ALREADY_EXISTS,
            UpasthitiError::AuthenticationFailed { .. } => error_code::UNAUTHENTICATED,
            UpasthitiError::AuthorizationDenied { .. } => error_code::PERMISSION_DENIED,
            UpasthitiError::InvalidToken => error_code::INVALID_TOKEN,
            UpasthitiError::UnknownSession { .. } => error_code::UNKNOWN_SESSION,
            UpasthitiError::LocationRequired => error_code::LOCATION_REQUIRED,
            UpasthitiError::OutOfRange { .. } => error_code::OUT_OF_RANGE,
            UpasthitiError::EditWindowClosed { .. } => error_code::EDIT_WINDOW_CLOSED,
            UpasthitiError::Storage(_) | UpasthitiError::Crypto(_) => error_code::INTERNAL,
        }
    }
}

impl From<UpasthitiError> for ApiError {
    fn from(err: UpasthitiError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(UpasthitiError::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(UpasthitiError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(UpasthitiError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let body = match &self.0 {
            UpasthitiError::OutOfRange {
                distance_meters,
                radius_meters,
            } => json!({
                "error": self.0.to_string(),
                "code": code,
                "distanceMeters": distance_meters,
                "radiusMeters": radius_meters,
            }),
            e if status.is_server_error() => {
                error!(error = %e, "Request failed");
                json!({ "error": "Internal server error", "code": code })
            }
            e => json!({ "error": e.to_string(), "code": code }),
        };

        (status, axum::Json(body)).into_response()
    }
}
