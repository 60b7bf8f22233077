//! Engine binary for the Trinetra air-picture simulation.
//!
//! This is the main entry point that wires together the shared world, the
//! motion and detection loops, and the observer server. It runs until
//! `Ctrl-C`, then stops the loops and the server cleanly.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `trinetra-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the initial world and snapshot publisher
//! 4. Start the observer API server
//! 5. Spawn the motion and detection loops
//! 6. Wait for `Ctrl-C`
//! 7. Stop the loops, drain the server, and log totals

mod error;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trinetra_core::config::LoggingConfig;
use trinetra_core::{Shutdown, SimulationConfig, SimulationHandle, runner};
use trinetra_observer::{AppState, ServerConfig};

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "trinetra-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the observer port cannot
/// be bound, or the shutdown signal cannot be installed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logged once tracing is up.
    let (config, from_file) = load_config(Path::new(CONFIG_PATH))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);

    info!("trinetra-engine starting");
    if !from_file {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        seed = ?config.world.seed,
        jets = config.world.jet_count,
        threats = config.world.threats.len(),
        motion_interval_ms = config.scheduling.motion_interval_ms,
        detection_interval_ms = config.scheduling.detection_interval_ms,
        "Configuration loaded"
    );

    // 3. Build the world.
    let handle = SimulationHandle::from_config(&config);
    let shutdown = Shutdown::new();
    info!("World initialized");

    // 4. Start the observer API server.
    let server_config = ServerConfig::from(&config.server);
    let app_state = Arc::new(AppState::new(handle.clone()));
    let server = trinetra_observer::spawn_observer(&server_config, app_state, &shutdown)
        .await
        .map_err(EngineError::from)?;
    info!(host = %server_config.host, port = server_config.port, "Observer API server started");

    // 5. Spawn the engine loops.
    let engines = runner::spawn_engines(&handle, &config, &shutdown);
    info!("Engine loops running, press Ctrl-C to stop");

    // 6. Wait for Ctrl-C.
    tokio::signal::ctrl_c().await.map_err(EngineError::from)?;
    info!("Shutdown requested");

    // 7. Stop everything.
    let results = engines.stop().await;
    runner::log_engines_end(&results);
    if let Err(e) = server.await {
        warn!(error = %e, "Observer server task did not exit cleanly");
    }

    let status = handle.status().await;
    info!(
        uptime_seconds = status.uptime_seconds,
        motion_ticks = status.ticks.motion,
        detection_ticks = status.ticks.detection,
        failed_ticks = status.ticks.failed,
        "trinetra-engine shutdown complete"
    );

    Ok(())
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the simulation configuration from `path`.
///
/// Returns the config and whether it came from the file. A missing file
/// yields defaults with environment overrides applied.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.server.apply_env_overrides();
        Ok((config, false))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let (config, from_file) =
            load_config(Path::new("definitely-not-here/trinetra-config.yaml")).unwrap();
        assert!(!from_file);
        assert_eq!(config.world.jet_count, 5);
        assert_eq!(config.scheduling.motion_interval_ms, 500);
    }

    #[test]
    fn bundled_config_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../trinetra-config.yaml");
        let (config, from_file) = load_config(&path).unwrap();
        assert!(from_file);
        assert_eq!(config.world.threats.len(), 2);
        assert_eq!(config.history.pulse_capacity, 100);
    }
}
