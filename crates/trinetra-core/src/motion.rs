//! Dead-reckoning motion for jets and threats.
//!
//! Every motion tick each agent advances `speed` map units along its
//! heading, then its heading wanders by a bounded random amount. Jets also
//! burn a fixed amount of fuel. Fuel is clamped to `[0, 100]` and headings
//! are normalized to `[0, 360)`.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trinetra_types::Position;

use crate::config::MotionConfig;
use crate::geometry::normalize_degrees;
use crate::tick::{TickEngine, TickError, TickStats, ensure_finite};
use crate::world::{FUEL_MAX, WorldState};

/// Engine name used in logs and tick counters.
pub const ENGINE: &str = "motion";

/// Staged update for one agent.
#[derive(Debug, Clone, Copy)]
struct Step {
    position: Position,
    angle: f64,
}

/// Advances every agent once per tick.
#[derive(Debug)]
pub struct MotionEngine {
    config: MotionConfig,
    rng: StdRng,
}

impl MotionEngine {
    /// Create an engine with its own RNG.
    pub const fn new(config: MotionConfig, rng: StdRng) -> Self {
        Self { config, rng }
    }

    /// Create an engine seeded from `seed`, or from OS entropy when `None`.
    pub fn seeded(config: MotionConfig, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::new(config, rng)
    }

    fn wander(&mut self, angle: f64, jitter: f64) -> f64 {
        if jitter <= 0.0 {
            return normalize_degrees(angle);
        }
        normalize_degrees(angle + self.rng.random_range(-jitter..=jitter))
    }
}

/// Move a point `speed` units along `angle_deg`.
pub fn advance(position: Position, angle_deg: f64, speed: f64) -> Position {
    let rad = angle_deg.to_radians();
    Position::new(
        rad.cos().mul_add(speed, position.x),
        rad.sin().mul_add(speed, position.y),
    )
}

impl TickEngine for MotionEngine {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn step(&mut self, world: &mut WorldState, _now: DateTime<Utc>) -> Result<TickStats, TickError> {
        let decay = self.config.fuel_decay_per_tick;
        let jet_jitter = self.config.jet_heading_jitter_deg;
        let threat_jitter = self.config.threat_heading_jitter_deg;

        // Stage
        let mut jet_steps = Vec::with_capacity(world.jets.len());
        for jet in &world.jets {
            let step = Step {
                position: advance(jet.position, jet.angle, jet.speed),
                angle: self.wander(jet.angle, jet_jitter),
            };
            let fuel = (jet.fuel - decay).clamp(0.0, FUEL_MAX);
            let entity = || format!("jet {}", jet.id);
            ensure_finite(ENGINE, entity, "x", step.position.x)?;
            ensure_finite(ENGINE, entity, "y", step.position.y)?;
            ensure_finite(ENGINE, entity, "angle", step.angle)?;
            ensure_finite(ENGINE, entity, "fuel", fuel)?;
            jet_steps.push((step, fuel));
        }

        let mut threat_steps = Vec::with_capacity(world.threats.len());
        for threat in &world.threats {
            let step = Step {
                position: advance(threat.position(), threat.angle, threat.speed),
                angle: self.wander(threat.angle, threat_jitter),
            };
            let entity = || format!("threat {}", threat.id);
            ensure_finite(ENGINE, entity, "x", step.position.x)?;
            ensure_finite(ENGINE, entity, "y", step.position.y)?;
            ensure_finite(ENGINE, entity, "angle", step.angle)?;
            threat_steps.push(step);
        }

        // Commit
        for (jet, (step, fuel)) in world.jets.iter_mut().zip(jet_steps) {
            jet.position = step.position;
            jet.angle = step.angle;
            jet.fuel = fuel;
        }
        for (threat, step) in world.threats.iter_mut().zip(threat_steps) {
            threat.x = step.position.x;
            threat.y = step.position.y;
            threat.angle = step.angle;
        }

        Ok(TickStats {
            moved: world.jets.len().saturating_add(world.threats.len()),
            ..TickStats::default()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use trinetra_types::{JetId, ThreatId};

    use super::*;
    use crate::config::{HistoryConfig, WorldConfig};

    fn make_world() -> WorldState {
        WorldState::new(
            &WorldConfig::default(),
            &HistoryConfig::default(),
            StdRng::seed_from_u64(1),
        )
    }

    fn make_engine() -> MotionEngine {
        MotionEngine::seeded(MotionConfig::default(), Some(2))
    }

    #[test]
    fn advance_follows_heading() {
        let moved = advance(Position::new(0.0, 0.0), 90.0, 2.0);
        assert!(moved.x.abs() < 1e-12);
        assert!((moved.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn jets_move_by_speed_and_burn_fuel() {
        let mut world = make_world();
        let mut engine = make_engine();
        let before = world.jet(JetId::new(1)).unwrap().clone();

        engine.step(&mut world, Utc::now()).unwrap();

        let after = world.jet(JetId::new(1)).unwrap();
        let expected = advance(before.position, before.angle, before.speed);
        assert!((after.position.x - expected.x).abs() < 1e-12);
        assert!((after.position.y - expected.y).abs() < 1e-12);
        assert!((after.fuel - 99.95).abs() < 1e-9);
    }

    #[test]
    fn headings_stay_normalized_and_within_jitter() {
        let mut world = make_world();
        let mut engine = make_engine();
        for _ in 0..500 {
            let before: Vec<f64> = world.jets().iter().map(|j| j.angle).collect();
            engine.step(&mut world, Utc::now()).unwrap();
            for (old, jet) in before.iter().zip(world.jets()) {
                assert!((0.0..360.0).contains(&jet.angle));
                let delta = (jet.angle - old).abs();
                let wrapped = delta.min(360.0 - delta);
                assert!(wrapped <= 5.0 + 1e-9, "heading moved {wrapped}");
            }
            assert!(world.threats().iter().all(|t| (0.0..360.0).contains(&t.angle)));
        }
    }

    #[test]
    fn fuel_is_non_increasing_and_floors_at_zero() {
        let mut world = make_world();
        let mut engine = MotionEngine::seeded(
            MotionConfig {
                fuel_decay_per_tick: 7.0,
                ..MotionConfig::default()
            },
            Some(3),
        );
        let mut last: Vec<f64> = world.jets().iter().map(|j| j.fuel).collect();
        for _ in 0..20 {
            engine.step(&mut world, Utc::now()).unwrap();
            for (prev, jet) in last.iter().zip(world.jets()) {
                assert!(jet.fuel <= *prev);
                assert!((0.0..=FUEL_MAX).contains(&jet.fuel));
            }
            last = world.jets().iter().map(|j| j.fuel).collect();
        }
        assert!(world.jets().iter().all(|j| j.fuel == 0.0));
    }

    #[test]
    fn non_finite_update_leaves_world_untouched() {
        let mut world = make_world();
        let mut engine = make_engine();
        world.jets.last_mut().unwrap().speed = f64::INFINITY;
        let before = world.snapshot();

        let result = engine.step(&mut world, Utc::now());

        assert!(matches!(result, Err(TickError::NonFinite { field: "x", .. })));
        assert_eq!(world.snapshot(), before);
    }

    #[test]
    fn threats_move() {
        let mut world = make_world();
        let mut engine = make_engine();
        let before = world.threat(ThreatId::new(1)).unwrap().position();
        engine.step(&mut world, Utc::now()).unwrap();
        let after = world.threat(ThreatId::new(1)).unwrap().position();
        assert_ne!(before, after);
    }
}
