//! Core entity structs for the Trinetra simulation.
//!
//! Covers the two agent kinds ([`Jet`], [`Threat`]), the two detection
//! record kinds ([`DetectionEvent`], [`SignalRecord`]), and the
//! [`WorldSnapshot`] payload pushed to every observer.
//!
//! Field names follow the dashboard's existing JSON contract, which is why
//! a few fields carry explicit `serde` renames.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{JetStatus, RangeBand};
use crate::ids::{JetId, ThreatId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point in the 2-D simulation plane.
///
/// Coordinates are in map units (degrees of the reference grid). Distances
/// are converted to kilometres by the detection engine, not here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite numbers.
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Signal record
// ---------------------------------------------------------------------------

/// A radar-warning reading stored on a jet when a detection is strong
/// enough to register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SignalRecord {
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
    /// Randomized emitter frequency in GHz.
    pub frequency_ghz: f64,
    /// Signal strength as a negative magnitude (dB-like).
    pub strength_db: f64,
    /// Bearing from the jet to the emitter, in `[0, 360)` degrees.
    pub angle_deg: f64,
    /// Range band of the emitter.
    pub range: RangeBand,
}

/// A [`SignalRecord`] tagged with the jet that recorded it.
///
/// Returned by the signal-intelligence query, which merges the histories
/// of every jet into one feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SignalReport {
    /// The jet whose history the record came from.
    pub jet_id: JetId,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
    /// Randomized emitter frequency in GHz.
    pub frequency_ghz: f64,
    /// Signal strength as a negative magnitude.
    pub strength_db: f64,
    /// Bearing from the jet to the emitter.
    pub angle_deg: f64,
    /// Range band of the emitter.
    pub range: RangeBand,
}

impl SignalReport {
    /// Tag a jet's record with the jet id.
    pub fn from_record(jet_id: JetId, record: &SignalRecord) -> Self {
        Self {
            jet_id,
            timestamp: record.timestamp,
            frequency_ghz: record.frequency_ghz,
            strength_db: record.strength_db,
            angle_deg: record.angle_deg,
            range: record.range,
        }
    }
}

// ---------------------------------------------------------------------------
// Detection event ("pulse")
// ---------------------------------------------------------------------------

/// One simulated detection interaction between a threat and a jet during
/// a single detection tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DetectionEvent {
    /// The emitting threat.
    #[serde(rename = "fromEnemyId")]
    pub from_threat: ThreatId,
    /// The illuminated jet.
    #[serde(rename = "toJetId")]
    pub to_jet: JetId,
    /// Computed signal strength in `[0, 100]`.
    pub strength: f64,
    /// When the pulse was evaluated.
    pub timestamp: DateTime<Utc>,
    /// Bearing from the jet to the threat, in `[0, 360)` degrees.
    pub angle_deg: f64,
    /// Range band of the threat.
    pub range: RangeBand,
    /// Threat position at the moment of the pulse.
    pub enemy_pos: Position,
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// A friendly jet in the squadron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Jet {
    /// Unique jet identifier.
    pub id: JetId,
    /// Display name (call sign).
    pub name: String,
    /// Patrol or locked.
    pub status: JetStatus,
    /// Current position.
    pub position: Position,
    /// Heading in `[0, 360)` degrees.
    pub angle: f64,
    /// Distance travelled per motion tick, in map units.
    pub speed: f64,
    /// Remaining fuel in `[0, 100]`.
    pub fuel: f64,
    /// Remaining weapons.
    pub weapons: u32,
    /// Signal readings in append order, oldest first.
    #[ts(as = "Vec<SignalRecord>")]
    pub signal_history: VecDeque<SignalRecord>,
    /// The threat this jet has locked, if any. Sticky until reset.
    pub locked_enemy: Option<ThreatId>,
}

/// An adversarial emitter.
///
/// Serialized flat (`x`, `y` at the top level) as the dashboard expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Threat {
    /// Unique threat identifier.
    pub id: ThreatId,
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Whether the threat has been ordered to scan. Cosmetic only.
    pub is_scanning: bool,
    /// Heading in `[0, 360)` degrees.
    pub angle: f64,
    /// Distance travelled per motion tick, in map units.
    pub speed: f64,
}

impl Threat {
    /// Current position as a [`Position`].
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// World snapshot
// ---------------------------------------------------------------------------

/// A fully serialized copy of the world delivered to subscribers and
/// returned by the full-state query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Whether the engines are frozen.
    pub is_paused: bool,
    /// Operator-facing mission status line.
    pub mission_status: String,
    /// Event log, newest first.
    pub events: Vec<String>,
    /// All jets in creation order.
    pub squadron: Vec<Jet>,
    /// All threats in creation order.
    pub threats: Vec<Threat>,
    /// Detection pulses, oldest first.
    pub pulse_history: Vec<DetectionEvent>,
}
