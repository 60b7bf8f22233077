//! Observer API server for the Trinetra simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) that sends the full world snapshot
//!   on attach, then every published snapshot, and accepts operator
//!   commands as inbound JSON frames
//! - **REST query endpoints** for the world, squadron, threats, signal
//!   intelligence, and loop status
//! - **REST control endpoints** for pause, resume, reset, and threat scans
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Every handler goes through the shared
//! [`SimulationHandle`](trinetra_core::SimulationHandle), so reads see a
//! consistent world and commands are serialized with the engine ticks.
//! `WebSocket` clients ride the snapshot broadcast channel; a slow client
//! skips ahead rather than holding anyone else back.

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::spawn_observer;
pub use state::AppState;
