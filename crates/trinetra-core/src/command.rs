//! Operator commands.
//!
//! Commands arrive as JSON over the `WebSocket` (`{"type": "toggle_pause"}`)
//! or through the REST control endpoint (`{"command": "reset_simulation"}`).
//! Both forms parse into [`Command`]; the [`SimulationHandle`] applies them
//! under the world lock and publishes a snapshot afterwards.
//!
//! [`SimulationHandle`]: crate::handle::SimulationHandle

use serde::{Deserialize, Serialize};
use trinetra_types::ThreatId;

/// A single operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Flip the pause flag.
    TogglePause,
    /// Set the pause flag explicitly.
    SetPaused {
        /// Desired pause state.
        paused: bool,
    },
    /// Order a threat to start scanning.
    TriggerScan {
        /// Threat to scan with.
        enemy_id: ThreatId,
    },
    /// Set or clear a threat's scanning flag.
    SetScanning {
        /// Threat to update.
        enemy_id: ThreatId,
        /// Desired scanning state.
        scanning: bool,
    },
    /// Return every agent to a near-default layout.
    #[serde(alias = "reset")]
    ResetSimulation,
}

impl Command {
    /// Parse a JSON command message.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Malformed`] if the text is not a JSON object
    /// describing a known command with valid fields.
    pub fn from_json(text: &str) -> Result<Self, CommandError> {
        serde_json::from_str(text).map_err(|err| CommandError::Malformed {
            reason: err.to_string(),
        })
    }

    /// Resolve a bare command name from the REST control endpoint.
    ///
    /// Only parameterless commands are reachable this way.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Unrecognized`] for any other name.
    pub fn from_name(name: &str) -> Result<Self, CommandError> {
        match name {
            "toggle_pause" => Ok(Self::TogglePause),
            "pause" => Ok(Self::SetPaused { paused: true }),
            "resume" => Ok(Self::SetPaused { paused: false }),
            "reset" | "reset_simulation" => Ok(Self::ResetSimulation),
            other => Err(CommandError::Unrecognized {
                name: other.to_owned(),
            }),
        }
    }

    /// Wire name of the command.
    pub const fn name(self) -> &'static str {
        match self {
            Self::TogglePause => "toggle_pause",
            Self::SetPaused { .. } => "set_paused",
            Self::TriggerScan { .. } => "trigger_scan",
            Self::SetScanning { .. } => "set_scanning",
            Self::ResetSimulation => "reset_simulation",
        }
    }
}

/// Errors from parsing or applying a command.
///
/// A rejected command leaves the world unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The message could not be parsed as a command.
    #[error("malformed command: {reason}")]
    Malformed {
        /// Parser diagnostic.
        reason: String,
    },

    /// The command name is not known.
    #[error("unrecognized command: {name}")]
    Unrecognized {
        /// The name that was sent.
        name: String,
    },

    /// The command referenced a threat that does not exist.
    #[error("unknown threat: {id}")]
    UnknownThreat {
        /// The id that was sent.
        id: ThreatId,
    },
}

/// Result of an applied command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    /// Wire name of the command that ran.
    pub command: &'static str,
    /// Mission status after the command.
    pub mission_status: String,
    /// Pause flag after the command.
    pub is_paused: bool,
    /// Subscribers that received the resulting snapshot.
    pub receivers: usize,
}
