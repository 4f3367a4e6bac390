//! Shared application state for the Rover HTTP server.
//!
//! [`AppState`] holds the session registry (the single source of truth
//! for "the current session"), the map asset store, and the runtime
//! configuration. It is wrapped in [`Arc`] and injected into handlers
//! via Axum's `State` extractor.

use std::sync::Arc;

use rover_session::{RoverConfig, SessionRegistry};
use rover_sim::MapStore;

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The single-slot session registry.
    pub registry: Arc<SessionRegistry>,
    /// Map name -> image asset resolution.
    pub maps: MapStore,
    /// Runtime configuration loaded at startup.
    pub config: RoverConfig,
}

impl AppState {
    /// Create application state from the runtime configuration.
    pub fn new(config: RoverConfig) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            maps: MapStore::new(config.maps.dir.clone()),
            config,
        }
    }
}
