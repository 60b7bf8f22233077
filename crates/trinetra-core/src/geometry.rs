//! Bearing, range, and signal-strength computation.
//!
//! Everything here is pure and side-effect free so the detection engine's
//! arithmetic can be tested without a world or an RNG.

use trinetra_types::{Position, RangeBand};

use crate::config::DetectionConfig;

/// Full circle in degrees.
const FULL_TURN_DEG: f64 = 360.0;

/// Base strength before distance falloff.
const MAX_STRENGTH: f64 = 100.0;

/// Normalize an angle in degrees into `[0, 360)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `360.0`,
/// so that case is folded back to zero.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_TURN_DEG);
    if wrapped >= FULL_TURN_DEG { 0.0 } else { wrapped }
}

/// Bearing from `from` to `to` in degrees, normalized to `[0, 360)`.
///
/// Measured counter-clockwise from the positive x axis, matching the
/// heading convention used by the motion engine.
pub fn bearing_deg(from: Position, to: Position) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    normalize_degrees(dy.atan2(dx).to_degrees())
}

/// Result of evaluating one threat against one jet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseGeometry {
    /// Bearing from the jet to the threat.
    pub bearing_deg: f64,
    /// Scaled distance (kilometres).
    pub distance_km: f64,
    /// Range classification of `distance_km`.
    pub range: RangeBand,
    /// Signal strength in `[0, 100]`.
    pub strength: f64,
}

/// Distance, range band, and strength rules for one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeModel {
    km_per_unit: f64,
    near_km: f64,
    mid_km: f64,
    falloff_per_km: f64,
}

impl RangeModel {
    /// Build the model from detection configuration.
    pub const fn from_config(config: &DetectionConfig) -> Self {
        Self {
            km_per_unit: config.km_per_unit,
            near_km: config.near_km,
            mid_km: config.mid_km,
            falloff_per_km: config.strength_falloff_per_km,
        }
    }

    /// Scaled Euclidean distance between two positions.
    pub fn distance_km(&self, a: Position, b: Position) -> f64 {
        (b.x - a.x).hypot(b.y - a.y) * self.km_per_unit
    }

    /// Classify a scaled distance into a range band.
    pub fn classify(&self, distance_km: f64) -> RangeBand {
        if distance_km < self.near_km {
            RangeBand::Near
        } else if distance_km < self.mid_km {
            RangeBand::Mid
        } else {
            RangeBand::Far
        }
    }

    /// Signal strength for a scaled distance: `max(0, 100 - distance * falloff)`.
    pub fn strength(&self, distance_km: f64) -> f64 {
        distance_km
            .mul_add(-self.falloff_per_km, MAX_STRENGTH)
            .max(0.0)
    }

    /// Evaluate the full pulse geometry from a jet to a threat.
    pub fn evaluate(&self, jet: Position, threat: Position) -> PulseGeometry {
        let distance_km = self.distance_km(jet, threat);
        PulseGeometry {
            bearing_deg: bearing_deg(jet, threat),
            distance_km,
            range: self.classify(distance_km),
            strength: self.strength(distance_km),
        }
    }
}

impl Default for RangeModel {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}
