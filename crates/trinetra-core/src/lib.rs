//! Simulation core for the Trinetra air-picture simulation.
//!
//! This crate owns the shared world, the two periodic engines that mutate
//! it, and the publisher that fans snapshots out to observers.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration loading and typed config structs
//! - [`world`] -- The shared world state and its mutation helpers
//! - [`history`] -- Fixed-capacity history buffers
//! - [`geometry`] -- Bearing, range band, and signal strength
//! - [`tick`] -- The engine trait and tick errors
//! - [`motion`] -- Dead-reckoning motion and fuel burn
//! - [`detection`] -- Pulse evaluation, signal recording, and locks
//! - [`publisher`] -- Snapshot broadcast and subscriptions
//! - [`command`] -- Operator commands
//! - [`handle`] -- Serialized access to the world
//! - [`shutdown`] -- Cooperative shutdown signal
//! - [`runner`] -- Periodic engine loops

pub mod command;
pub mod config;
pub mod detection;
pub mod geometry;
pub mod handle;
pub mod history;
pub mod motion;
pub mod publisher;
pub mod runner;
pub mod shutdown;
pub mod tick;
pub mod world;

pub use command::{Command, CommandError, CommandOutcome};
pub use config::{ConfigError, SimulationConfig};
pub use handle::{SimulationHandle, SimulationStatus, TickOutcome};
pub use publisher::{Publisher, Subscription};
pub use shutdown::{Shutdown, ShutdownListener};
pub use tick::{TickEngine, TickError, TickStats};
pub use world::WorldState;
