//! Route table for the `/api` prefix.

mod attendance;
mod auth;
mod sessions;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::state::AppState;

pub fn api() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(sessions::routes())
        .merge(attendance::routes())
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
