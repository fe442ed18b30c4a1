//! Router configuration for the HTTP service.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.analyzer.config().max_upload_bytes;

    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/healthcheck", get(handlers::healthcheck))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
