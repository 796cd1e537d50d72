use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use upasthiti_auth::{AuthOutput, LoginInput, SignupInput};
use upasthiti_core::error::UpasthitiError;
use upasthiti_core::models::user::{PublicUser, Role};

use crate::error::ApiResult;
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
    role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: PublicUser,
}

impl From<AuthOutput> for AuthResponse {
    fn from(out: AuthOutput) -> Self {
        Self {
            token: out.access_token,
            user: out.user,
        }
    }
}

#[derive(Debug, Serialize)]
struct UserResponse {
    user: PublicUser,
}

async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let role = req
        .role
        .ok_or_else(|| UpasthitiError::validation("missing fields"))?;

    let out = state
        .auth
        .signup(SignupInput {
            name: req.name,
            email: req.email,
            password: req.password,
            role,
        })
        .await?;
    Ok(Json(out.into()))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let out = state
        .auth
        .login(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;
    Ok(Json(out.into()))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse { user })
}
