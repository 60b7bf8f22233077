//! Serialized access to the shared world.
//!
//! [`SimulationHandle`] is the only way to reach the [`WorldState`]. Every
//! tick, command, and query takes the same async mutex, so each mutation
//! runs atomically with respect to the others and every published snapshot
//! is self-consistent. Snapshots are published while the lock is still
//! held, which makes publish order match mutation order.
//!
//! # Architecture
//!
//! The handle is cheap to clone and is shared by the engine loops and by
//! every observer connection.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use trinetra_types::{Jet, SignalReport, Threat, WorldSnapshot};

use crate::command::{Command, CommandError, CommandOutcome};
use crate::config::SimulationConfig;
use crate::{detection, motion};
use crate::publisher::{Publisher, Subscription};
use crate::tick::{TickEngine, TickError, TickStats};
use crate::world::{TickCounters, WorldState};

/// Result of one scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    /// Engine that ran.
    pub engine: &'static str,
    /// Whether the tick was skipped because the world is paused.
    pub paused: bool,
    /// What the tick changed. All zero when paused.
    pub stats: TickStats,
    /// Subscribers that received the resulting snapshot.
    pub receivers: usize,
}

/// Point-in-time health summary served by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationStatus {
    /// Whether the engines are frozen.
    pub is_paused: bool,
    /// Operator-facing mission status line.
    pub mission_status: String,
    /// When the handle was created.
    pub started_at: DateTime<Utc>,
    /// Whole seconds since `started_at`.
    pub uptime_seconds: u64,
    /// Squadron size.
    pub jets: usize,
    /// Threat count.
    pub threats: usize,
    /// Live snapshot subscribers.
    pub subscribers: usize,
    /// Tick counters since startup.
    pub ticks: TickCounters,
}

/// Shared handle to the world and its snapshot publisher.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    world: Arc<Mutex<WorldState>>,
    publisher: Publisher,
    started_at: DateTime<Utc>,
}

impl SimulationHandle {
    /// Wrap an existing world.
    pub fn new(world: WorldState, publisher: Publisher) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
            publisher,
            started_at: Utc::now(),
        }
    }

    /// Build the initial world and publisher from configuration.
    ///
    /// With `world.seed` set the layout is reproducible; otherwise it is
    /// seeded from OS entropy.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let rng = config
            .world
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let world = WorldState::new(&config.world, &config.history, rng);
        Self::new(world, Publisher::new(config.broadcast.channel_capacity))
    }

    /// Lock the world for direct inspection or scenario setup.
    ///
    /// Nothing is published when the guard is dropped; call
    /// [`publish`](Self::publish) afterwards if subscribers should see
    /// the change.
    pub async fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.world.lock().await
    }

    /// Publish the current world to every subscriber.
    pub async fn publish(&self) -> usize {
        let world = self.world.lock().await;
        self.publisher.publish(world.snapshot())
    }

    // -----------------------------------------------------------------------
    // Ticks
    // -----------------------------------------------------------------------

    /// Run one tick of `engine` and publish the result.
    ///
    /// A paused world skips the mutation but still publishes, so
    /// subscribers keep receiving heartbeats. A failed tick leaves the
    /// world unchanged and publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`TickError`], or [`TickError::Panicked`] if
    /// the engine panicked.
    pub async fn run_tick<E>(&self, engine: &mut E, now: DateTime<Utc>) -> Result<TickOutcome, TickError>
    where
        E: TickEngine + ?Sized,
    {
        let name = engine.name();
        let mut world = self.world.lock().await;

        let paused = world.is_paused();
        let stats = if paused {
            world.counters.paused = world.counters.paused.saturating_add(1);
            TickStats::default()
        } else {
            let result = catch_unwind(AssertUnwindSafe(|| engine.step(&mut world, now)))
                .unwrap_or_else(|payload| {
                    Err(TickError::Panicked {
                        engine: name,
                        message: panic_message(payload.as_ref()),
                    })
                });
            match result {
                Ok(stats) => {
                    let counters = &mut world.counters;
                    match name {
                        motion::ENGINE => counters.motion = counters.motion.saturating_add(1),
                        detection::ENGINE => {
                            counters.detection = counters.detection.saturating_add(1);
                        }
                        _ => {}
                    }
                    stats
                }
                Err(err) => {
                    world.counters.failed = world.counters.failed.saturating_add(1);
                    return Err(err);
                }
            }
        };

        let receivers = self.publisher.publish(world.snapshot());
        Ok(TickOutcome {
            engine: name,
            paused,
            stats,
            receivers,
        })
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply an operator command and publish the result.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownThreat`] if the command names a
    /// threat that does not exist. The world is unchanged in that case.
    pub async fn apply(&self, command: Command, now: DateTime<Utc>) -> Result<CommandOutcome, CommandError> {
        let mut world = self.world.lock().await;
        match command {
            Command::TogglePause => {
                world.toggle_pause();
            }
            Command::SetPaused { paused } => world.set_paused(paused),
            Command::TriggerScan { enemy_id } => {
                if !world.set_scanning(enemy_id, true) {
                    return Err(CommandError::UnknownThreat { id: enemy_id });
                }
            }
            Command::SetScanning { enemy_id, scanning } => {
                if !world.set_scanning(enemy_id, scanning) {
                    return Err(CommandError::UnknownThreat { id: enemy_id });
                }
            }
            Command::ResetSimulation => world.reset(now),
        }

        tracing::info!(
            command = command.name(),
            mission_status = world.mission_status(),
            "Operator command applied"
        );
        let receivers = self.publisher.publish(world.snapshot());
        Ok(CommandOutcome {
            command: command.name(),
            mission_status: world.mission_status().to_owned(),
            is_paused: world.is_paused(),
            receivers,
        })
    }

    // -----------------------------------------------------------------------
    // Subscriptions and queries
    // -----------------------------------------------------------------------

    /// Subscribe to snapshots. The first item is the current world.
    pub async fn subscribe(&self) -> Subscription {
        let world = self.world.lock().await;
        self.publisher.attach(world.snapshot())
    }

    /// Full-state query.
    pub async fn snapshot(&self) -> WorldSnapshot {
        self.world.lock().await.snapshot()
    }

    /// Squadron query.
    pub async fn squadron(&self) -> Vec<Jet> {
        self.world.lock().await.jets().to_vec()
    }

    /// Threat query.
    pub async fn threats(&self) -> Vec<Threat> {
        self.world.lock().await.threats().to_vec()
    }

    /// Signal-intelligence query, newest first.
    pub async fn signal_intelligence(&self) -> Vec<SignalReport> {
        self.world.lock().await.signal_intelligence()
    }

    /// Health summary.
    pub async fn status(&self) -> SimulationStatus {
        let world = self.world.lock().await;
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        SimulationStatus {
            is_paused: world.is_paused(),
            mission_status: world.mission_status().to_owned(),
            started_at: self.started_at,
            uptime_seconds: u64::try_from(elapsed.max(0)).unwrap_or(0),
            jets: world.jets().len(),
            threats: world.threats().len(),
            subscribers: self.publisher.subscriber_count(),
            ticks: world.counters(),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-string panic payload"))
}
