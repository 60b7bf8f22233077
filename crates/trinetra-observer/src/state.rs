//! Shared application state for the Observer API server.

use trinetra_core::{SimulationHandle, Subscription};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the running simulation.
    pub simulation: SimulationHandle,
}

impl AppState {
    /// Create application state around a simulation handle.
    pub const fn new(simulation: SimulationHandle) -> Self {
        Self { simulation }
    }

    /// Subscribe to world snapshots.
    ///
    /// The first item yielded is the world as it is right now.
    pub async fn subscribe(&self) -> Subscription {
        self.simulation.subscribe().await
    }
}
