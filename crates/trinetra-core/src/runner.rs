//! Periodic loops that drive the engines.
//!
//! Each engine runs on its own Tokio task with its own cadence: motion
//! every 500 ms and detection every 1 s by default. A tick that fails is
//! logged, the loop waits out the error cooldown, and scheduling resumes.
//! Nothing a single tick does can end the loop; only the shutdown signal
//! stops it.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::detection::DetectionEngine;
use crate::handle::SimulationHandle;
use crate::motion::MotionEngine;
use crate::shutdown::{Shutdown, ShutdownListener};
use crate::tick::TickEngine;

/// Timing for one periodic loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Time between ticks.
    pub interval: Duration,
    /// Extra wait after a failed tick.
    pub cooldown: Duration,
}

/// Counts reported by a loop when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopResult {
    /// Engine the loop drove.
    pub engine: &'static str,
    /// Ticks that completed, paused ones included.
    pub completed: u64,
    /// Ticks that failed.
    pub failed: u64,
}

/// Drive `engine` against `handle` until shutdown is signalled.
pub async fn run_periodic<E: TickEngine>(
    mut engine: E,
    handle: SimulationHandle,
    timing: LoopTiming,
    mut shutdown: ShutdownListener,
) -> LoopResult {
    let mut result = LoopResult {
        engine: engine.name(),
        ..LoopResult::default()
    };

    info!(
        engine = result.engine,
        interval_ms = u64::try_from(timing.interval.as_millis()).unwrap_or(u64::MAX),
        "Engine loop starting"
    );

    let mut ticker = tokio::time::interval(timing.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match handle.run_tick(&mut engine, Utc::now()).await {
            Ok(outcome) => {
                result.completed = result.completed.saturating_add(1);
                debug!(
                    engine = outcome.engine,
                    paused = outcome.paused,
                    pulses = outcome.stats.pulses,
                    locks = outcome.stats.locks,
                    receivers = outcome.receivers,
                    "Tick complete"
                );
            }
            Err(err) => {
                result.failed = result.failed.saturating_add(1);
                warn!(engine = result.engine, error = %err, "Tick failed, cooling down");
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(timing.cooldown) => {}
                }
                ticker.reset();
            }
        }
    }

    info!(
        engine = result.engine,
        completed = result.completed,
        failed = result.failed,
        "Engine loop stopped"
    );
    result
}

/// The two running engine loops.
#[derive(Debug)]
pub struct EngineTasks {
    shutdown: Shutdown,
    motion: JoinHandle<LoopResult>,
    detection: JoinHandle<LoopResult>,
}

impl EngineTasks {
    /// Signal both loops to stop and wait for them.
    ///
    /// A loop whose task was aborted or panicked reports an empty result.
    pub async fn stop(self) -> [LoopResult; 2] {
        self.shutdown.trigger();
        let motion = self.motion.await.unwrap_or_else(|err| {
            warn!(error = %err, "Motion loop did not exit cleanly");
            LoopResult::default()
        });
        let detection = self.detection.await.unwrap_or_else(|err| {
            warn!(error = %err, "Detection loop did not exit cleanly");
            LoopResult::default()
        });
        [motion, detection]
    }
}

/// Spawn the motion and detection loops.
///
/// With `world.seed` set each engine derives its own seed from it so the
/// whole run is reproducible.
pub fn spawn_engines(handle: &SimulationHandle, config: &SimulationConfig, shutdown: &Shutdown) -> EngineTasks {
    let seed = config.world.seed;
    let motion = MotionEngine::seeded(config.motion.clone(), seed.map(|s| s.wrapping_add(1)));
    let detection = DetectionEngine::seeded(&config.detection, seed.map(|s| s.wrapping_add(2)));
    let cooldown = Duration::from_millis(config.scheduling.error_cooldown_ms);

    let motion = tokio::spawn(run_periodic(
        motion,
        handle.clone(),
        LoopTiming {
            interval: Duration::from_millis(config.scheduling.motion_interval_ms),
            cooldown,
        },
        shutdown.listener(),
    ));
    let detection = tokio::spawn(run_periodic(
        detection,
        handle.clone(),
        LoopTiming {
            interval: Duration::from_millis(config.scheduling.detection_interval_ms),
            cooldown,
        },
        shutdown.listener(),
    ));

    EngineTasks {
        shutdown: shutdown.clone(),
        motion,
        detection,
    }
}

/// Log the per-loop totals after [`EngineTasks::stop`].
pub fn log_engines_end(results: &[LoopResult]) {
    for result in results {
        info!(
            engine = result.engine,
            completed = result.completed,
            failed = result.failed,
            "Engine totals"
        );
    }
    if results.iter().all(|r| r.completed == 0) {
        warn!("Engines stopped with no ticks executed");
    }
}
