//! Backend binary for the Rover simulation.
//!
//! Wires together the runtime configuration, the session registry, the
//! map asset store, and the HTTP/SSE surface, then serves until the
//! process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `rover-config.yaml` (defaults if absent)
//! 3. Ensure the maps and scenario directories exist
//! 4. Assemble the application state
//! 5. Serve HTTP until terminated

use std::path::Path;
use std::sync::Arc;

use rover_server::{AppState, ServerConfig, start_server};
use rover_session::{ConfigError, RoverConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point for the Rover backend.
///
/// # Errors
///
/// Returns an error if configuration loading, directory creation, or
/// the server itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("rover-backend starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        maps_dir = %config.maps.dir.display(),
        step_ceiling = config.session.step_ceiling,
        pacing_interval_ms = config.session.pacing_interval_ms,
        "Configuration loaded"
    );

    // 3. Ensure working directories exist.
    std::fs::create_dir_all(&config.maps.dir)?;
    if let Some(parent) = config.scenario.path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 4. Assemble application state.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = Arc::new(AppState::new(config));
    info!("Application state assembled");

    // 5. Serve until terminated.
    start_server(&server_config, state).await?;

    info!("rover-backend shutdown complete");
    Ok(())
}

/// Load the runtime configuration from `rover-config.yaml`.
///
/// Looks for the config file relative to the current working directory
/// and falls back to defaults when it is absent.
fn load_config() -> Result<RoverConfig, ConfigError> {
    let config_path = Path::new("rover-config.yaml");
    if config_path.exists() {
        RoverConfig::from_file(config_path)
    } else {
        info!("Config file not found, using defaults");
        Ok(RoverConfig::default())
    }
}
