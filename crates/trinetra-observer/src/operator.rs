//! Operator REST handlers for runtime simulation control.
//!
//! Every accepted command mutates the world under the simulation lock and
//! triggers an immediate snapshot broadcast. A rejected command leaves the
//! world untouched.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/control` | Pause, resume, toggle, or reset |
//! | `POST` | `/api/threats/{id}/scan` | Order a threat to scan |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chrono::Utc;
use trinetra_core::{Command, CommandOutcome};
use trinetra_types::ThreatId;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/control`.
#[derive(Debug, serde::Deserialize)]
pub struct ControlRequest {
    /// Command name: `toggle_pause`, `pause`, `resume`, or
    /// `reset_simulation`.
    pub command: String,
}

/// Response body for an accepted command.
#[derive(Debug, serde::Serialize)]
struct ControlResponse {
    /// Always `"success"`.
    status: &'static str,
    /// Wire name of the command that ran.
    command_received: &'static str,
    /// Mission status after the command.
    mission_status: String,
    /// Pause flag after the command.
    is_paused: bool,
}

impl From<CommandOutcome> for ControlResponse {
    fn from(outcome: CommandOutcome) -> Self {
        Self {
            status: "success",
            command_received: outcome.command,
            mission_status: outcome.mission_status,
            is_paused: outcome.is_paused,
        }
    }
}

// ---------------------------------------------------------------------------
// POST /api/control
// ---------------------------------------------------------------------------

/// Apply a parameterless operator command.
pub async fn control(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ControlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(request) = body.map_err(|e| ObserverError::BadRequest(e.body_text()))?;
    let command = Command::from_name(&request.command)?;
    let outcome = state.simulation.apply(command, Utc::now()).await?;
    Ok(Json(ControlResponse::from(outcome)))
}

// ---------------------------------------------------------------------------
// POST /api/threats/{id}/scan
// ---------------------------------------------------------------------------

/// Order a threat to start scanning.
pub async fn trigger_scan(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Path(id) = id.map_err(|e| ObserverError::BadRequest(e.body_text()))?;
    let command = Command::TriggerScan {
        enemy_id: ThreatId::new(id),
    };
    let outcome = state.simulation.apply(command, Utc::now()).await?;
    Ok(Json(ControlResponse::from(outcome)))
}
