//! Upasthiti Server — HTTP API over the account, session and attendance
//! services.

pub mod config;
pub mod error;
pub mod extract;
mod routes;
pub mod state;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// Build the application router with every route under `/api`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
