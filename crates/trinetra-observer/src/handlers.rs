//! REST query handlers for the Observer server.
//!
//! All handlers are read-only: they lock the world just long enough to
//! copy what they need and never trigger a broadcast.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/world` | Full world snapshot |
//! | `GET` | `/api/squadron_status` | All jets |
//! | `GET` | `/api/threats` | All threats |
//! | `GET` | `/api/signal_intelligence` | Every signal record, newest first |
//! | `GET` | `/api/status` | Pause flag, tick counters, subscribers |
//!
//! Any other path falls through to [`not_found`].

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::Uri;
use axum::response::{Html, IntoResponse};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing simulation status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.simulation.status().await;
    let mission = status.mission_status;
    let run_state = if status.is_paused { "PAUSED" } else { "RUNNING" };
    let jets = status.jets;
    let threats = status.threats;
    let motion_ticks = status.ticks.motion;
    let detection_ticks = status.ticks.detection;
    let subscribers = status.subscribers;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Trinetra Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Trinetra Observer</h1>
    <p class="subtitle">Air-picture simulation monitor</p>

    <p>Status: <span class="status">{run_state}</span> -- {mission}</p>

    <div>
        <div class="metric">
            <div class="label">Jets</div>
            <div class="value">{jets}</div>
        </div>
        <div class="metric">
            <div class="label">Threats</div>
            <div class="value">{threats}</div>
        </div>
        <div class="metric">
            <div class="label">Motion ticks</div>
            <div class="value">{motion_ticks}</div>
        </div>
        <div class="metric">
            <div class="label">Detection ticks</div>
            <div class="value">{detection_ticks}</div>
        </div>
        <div class="metric">
            <div class="label">Subscribers</div>
            <div class="value">{subscribers}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/world">/api/world</a> -- Full world snapshot</li>
        <li>GET <a href="/api/squadron_status">/api/squadron_status</a> -- Squadron</li>
        <li>GET <a href="/api/threats">/api/threats</a> -- Threat emitters</li>
        <li>GET <a href="/api/signal_intelligence">/api/signal_intelligence</a> -- Signal records, newest first</li>
        <li>GET <a href="/api/status">/api/status</a> -- Loop status</li>
        <li>POST /api/control -- {{"command": "toggle_pause" | "pause" | "resume" | "reset_simulation"}}</li>
        <li>POST /api/threats/:id/scan -- Order a threat to scan</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws</code> -- Live snapshot stream and command channel</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/world -- full snapshot
// ---------------------------------------------------------------------------

/// Return the full world snapshot.
pub async fn get_world(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulation.snapshot().await)
}

// ---------------------------------------------------------------------------
// GET /api/squadron_status
// ---------------------------------------------------------------------------

/// Return every jet in creation order.
pub async fn squadron_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let jets = state.simulation.squadron().await;
    Json(serde_json::json!({ "jets": jets }))
}

// ---------------------------------------------------------------------------
// GET /api/threats
// ---------------------------------------------------------------------------

/// Return every threat in creation order.
pub async fn list_threats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let threats = state.simulation.threats().await;
    Json(serde_json::json!({ "threats": threats }))
}

// ---------------------------------------------------------------------------
// GET /api/signal_intelligence
// ---------------------------------------------------------------------------

/// Return every jet's signal records merged and sorted newest first.
pub async fn signal_intelligence(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulation.signal_intelligence().await)
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Return the pause flag, mission status, tick counters, and subscriber
/// count.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulation.status().await)
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Reject unknown paths with the same JSON error body as other failures.
pub async fn not_found(uri: Uri) -> ObserverError {
    ObserverError::NotFound(format!("no route for {}", uri.path()))
}
