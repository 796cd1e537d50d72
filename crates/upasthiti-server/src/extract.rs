//! Request extractors that report failures as [`ApiError`] bodies.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use upasthiti_auth::require_role;
use upasthiti_core::error::{UpasthitiError, UpasthitiResult};
use upasthiti_core::models::user::{PublicUser, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body; malformed or unknown fields become a 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// The user named by a valid `Authorization: Bearer` access token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PublicUser);

impl CurrentUser {
    pub fn require(&self, allowed: &[Role]) -> UpasthitiResult<&PublicUser> {
        require_role(&self.0, allowed)?;
        Ok(&self.0)
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| UpasthitiError::AuthenticationFailed {
            reason: "missing or invalid authorization header".into(),
        })?;

        let user = state.auth.authenticate(token).await?;
        Ok(Self(user))
    }
}
