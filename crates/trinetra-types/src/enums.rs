//! Enumeration types for the Trinetra simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Range classification
// ---------------------------------------------------------------------------

/// Coarse range classification reported with every detection.
///
/// The band is derived from the scaled threat-to-jet distance (roughly
/// kilometres). Serialized in upper case to match the dashboard feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum RangeBand {
    /// Closer than the near threshold (5 by default).
    Near,
    /// Between the near and mid thresholds (5 to 15 by default).
    Mid,
    /// At or beyond the mid threshold.
    Far,
}

impl RangeBand {
    /// Upper-case label used in event log messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Near => "NEAR",
            Self::Mid => "MID",
            Self::Far => "FAR",
        }
    }
}

impl core::fmt::Display for RangeBand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Jet status
// ---------------------------------------------------------------------------

/// Operational status of a jet as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum JetStatus {
    /// Flying its patrol with no threat locked.
    #[default]
    Patrol,
    /// A threat has been locked; stays until the next reset.
    Locked,
}
