//! The engine seam shared by the motion and detection loops.
//!
//! An engine computes one tick against an exclusively borrowed
//! [`WorldState`]. It must stage its updates and validate them before
//! writing anything back, so a failed tick leaves the world untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::world::WorldState;

/// Errors raised by a single engine tick.
///
/// A tick error never stops the loop that produced it: the runner logs it,
/// waits out the cooldown, and schedules the next tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A staged update produced a NaN or infinite value.
    #[error("{engine} tick produced a non-finite {field} for {entity}")]
    NonFinite {
        /// Engine that staged the update.
        engine: &'static str,
        /// Entity the value belongs to, e.g. `jet 3`.
        entity: String,
        /// Name of the offending field.
        field: &'static str,
    },

    /// The engine panicked while the world lock was held.
    #[error("{engine} tick panicked: {message}")]
    Panicked {
        /// Engine that panicked.
        engine: &'static str,
        /// Panic payload, when it was a string.
        message: String,
    },
}

/// What one applied tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    /// Jets and threats moved.
    pub moved: usize,
    /// Detection pulses appended to the pulse history.
    pub pulses: usize,
    /// Signal records appended to jets.
    pub signals: usize,
    /// Jets that acquired a lock this tick.
    pub locks: usize,
}

/// One periodic unit of simulation work.
pub trait TickEngine: Send {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Apply one tick to the world.
    ///
    /// # Errors
    ///
    /// Returns a [`TickError`] if the staged update is invalid. The world
    /// must be unchanged in that case.
    fn step(&mut self, world: &mut WorldState, now: DateTime<Utc>) -> Result<TickStats, TickError>;
}

/// Reject a non-finite value with a [`TickError::NonFinite`].
pub(crate) fn ensure_finite(
    engine: &'static str,
    entity: impl FnOnce() -> String,
    field: &'static str,
    value: f64,
) -> Result<(), TickError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TickError::NonFinite {
            engine,
            entity: entity(),
            field,
        })
    }
}
