//! Shared type definitions for the Trinetra air-picture simulation.
//!
//! This crate is the single source of truth for the entities that flow
//! between the simulation core, the observer API, and the dashboard.
//! Types defined here flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for jet and threat identifiers
//! - [`enums`] -- Range bands and jet status
//! - [`structs`] -- Jets, threats, detection records, and the world snapshot

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{JetStatus, RangeBand};
pub use ids::{JetId, ThreatId};
pub use structs::{
    DetectionEvent, Jet, Position, SignalRecord, SignalReport, Threat, WorldSnapshot,
};
