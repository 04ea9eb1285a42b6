//! Health check endpoint

use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::AppState;

/// GET /health
///
/// Liveness probe for monitoring; no envelope, no store access.
pub async fn health_check() -> Response {
    tracklink_common::api::health("tracklink-server", env!("CARGO_PKG_VERSION"))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
