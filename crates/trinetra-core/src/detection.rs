//! Passive radar-warning detection and lock acquisition.
//!
//! Each detection tick evaluates every (threat, jet) pair in threat-major
//! order. Every evaluated pair appends a [`DetectionEvent`] to the pulse
//! history. When the strength exceeds the lock threshold the jet records a
//! [`SignalRecord`], and if it holds no lock yet it locks that threat and
//! an event is logged.
//!
//! A jet already locked to the exact threat being evaluated is skipped
//! entirely for that pair. Pairs with other threats are still evaluated,
//! so a locked jet keeps accumulating signals from every other emitter.
//!
//! Every pair is evaluated before anything is written back, so a tick
//! that fails part way leaves the world as it was.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trinetra_types::{DetectionEvent, JetStatus, SignalRecord, ThreatId};

use crate::config::DetectionConfig;
use crate::geometry::RangeModel;
use crate::tick::{TickEngine, TickError, TickStats, ensure_finite};
use crate::world::{WorldState, clock_label};

/// Engine name used in logs and tick counters.
pub const ENGINE: &str = "detection";

/// Evaluates threat emissions against the squadron once per tick.
#[derive(Debug)]
pub struct DetectionEngine {
    model: RangeModel,
    lock_threshold: f64,
    frequency_min_ghz: f64,
    frequency_max_ghz: f64,
    rng: StdRng,
}

impl DetectionEngine {
    /// Create an engine with its own RNG.
    pub const fn new(config: &DetectionConfig, rng: StdRng) -> Self {
        Self {
            model: RangeModel::from_config(config),
            lock_threshold: config.lock_threshold,
            frequency_min_ghz: config.frequency_min_ghz,
            frequency_max_ghz: config.frequency_max_ghz,
            rng,
        }
    }

    /// Create an engine seeded from `seed`, or from OS entropy when `None`.
    pub fn seeded(config: &DetectionConfig, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::new(config, rng)
    }

    fn sample_frequency(&mut self) -> f64 {
        if self.frequency_min_ghz >= self.frequency_max_ghz {
            return self.frequency_min_ghz;
        }
        self.rng
            .random_range(self.frequency_min_ghz..=self.frequency_max_ghz)
    }
}

/// Effects of one tick on a single jet, staged until every pair is
/// evaluated.
#[derive(Debug, Default)]
struct JetUpdate {
    locked: Option<ThreatId>,
    acquired: bool,
    signals: Vec<SignalRecord>,
}

impl TickEngine for DetectionEngine {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn step(&mut self, world: &mut WorldState, now: DateTime<Utc>) -> Result<TickStats, TickError> {
        for jet in &world.jets {
            let entity = || format!("jet {}", jet.id);
            ensure_finite(ENGINE, entity, "x", jet.position.x)?;
            ensure_finite(ENGINE, entity, "y", jet.position.y)?;
        }
        for threat in &world.threats {
            let entity = || format!("threat {}", threat.id);
            ensure_finite(ENGINE, entity, "x", threat.x)?;
            ensure_finite(ENGINE, entity, "y", threat.y)?;
        }

        // Stage
        let mut updates: Vec<JetUpdate> = world
            .jets
            .iter()
            .map(|jet| JetUpdate {
                locked: jet.locked_enemy,
                ..JetUpdate::default()
            })
            .collect();
        let mut pulses = Vec::new();
        let mut lock_messages = Vec::new();

        for threat in &world.threats {
            let threat_pos = threat.position();
            for (jet, update) in world.jets.iter().zip(updates.iter_mut()) {
                if update.locked == Some(threat.id) {
                    continue;
                }

                let geometry = self.model.evaluate(jet.position, threat_pos);
                ensure_finite(ENGINE, || format!("jet {}", jet.id), "strength", geometry.strength)?;
                pulses.push(DetectionEvent {
                    from_threat: threat.id,
                    to_jet: jet.id,
                    strength: geometry.strength,
                    timestamp: now,
                    angle_deg: geometry.bearing_deg,
                    range: geometry.range,
                    enemy_pos: threat_pos,
                });

                if geometry.strength <= self.lock_threshold {
                    continue;
                }

                update.signals.push(SignalRecord {
                    timestamp: now,
                    frequency_ghz: self.sample_frequency(),
                    strength_db: -geometry.strength,
                    angle_deg: geometry.bearing_deg,
                    range: geometry.range,
                });

                if update.locked.is_none() {
                    update.locked = Some(threat.id);
                    update.acquired = true;
                    lock_messages.push(format!(
                        "[{}] Jet {} locked enemy {} (range {}, angle {:.1}\u{b0})",
                        clock_label(now),
                        jet.name,
                        threat.id,
                        geometry.range,
                        geometry.bearing_deg,
                    ));
                }
            }
        }

        // Commit
        let mut stats = TickStats {
            pulses: pulses.len(),
            ..TickStats::default()
        };
        for pulse in pulses {
            world.record_pulse(pulse);
        }
        let capacity = world.signal_capacity;
        for (jet, update) in world.jets.iter_mut().zip(updates) {
            stats.signals = stats.signals.saturating_add(update.signals.len());
            for record in update.signals {
                WorldState::push_signal(jet, capacity, record);
            }
            if update.acquired {
                jet.locked_enemy = update.locked;
                jet.status = JetStatus::Locked;
                stats.locks = stats.locks.saturating_add(1);
            }
        }
        for message in lock_messages {
            tracing::info!(target: "trinetra::detection", "{message}");
            world.log_event(message);
        }

        Ok(stats)
    }
}
