//! Observer server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_observer`] which binds the port up front and then runs
//! the Observer HTTP + `WebSocket` server on a background Tokio task, so
//! the API runs concurrently with the engine loops.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trinetra_core::{Shutdown, SimulationConfig, SimulationHandle};
//! use trinetra_observer::{spawn_observer, AppState, ServerConfig};
//!
//! let handle = SimulationHandle::from_config(&SimulationConfig::default());
//! let shutdown = Shutdown::new();
//! let state = Arc::new(AppState::new(handle));
//! let server = spawn_observer(&ServerConfig::default(), state, &shutdown).await?;
//! // ... later
//! shutdown.trigger();
//! server.await?;
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;
use trinetra_core::Shutdown;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// The port is bound before the task is spawned so a busy port or bad
/// host is reported to the caller instead of only being logged. The
/// server stops gracefully when `shutdown` is triggered.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the server cannot bind to the
/// requested address.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: &Shutdown,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = server::bind(config).await?;
    let listener_shutdown = shutdown.listener();

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, listener_shutdown).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(host = %config.host, port = config.port, "Observer server spawned on background task");

    Ok(handle)
}
