//! Axum router construction for the Rover server.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the Rover server.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Map assets
        .route("/api/maps/{name}", get(handlers::get_map))
        // Session control
        .route("/api/simulation/start", post(handlers::start))
        .route("/api/simulation/pause", post(handlers::pause))
        .route("/api/simulation/stop", post(handlers::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
