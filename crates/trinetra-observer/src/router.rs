//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, operator, ws};

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` snapshot stream and command channel
/// - `GET /api/world` -- full world snapshot
/// - `GET /api/squadron_status` -- all jets
/// - `GET /api/threats` -- all threats
/// - `GET /api/signal_intelligence` -- signal records, newest first
/// - `GET /api/status` -- loop status
/// - `POST /api/control` -- pause, resume, toggle, reset
/// - `POST /api/threats/{id}/scan` -- order a threat to scan
///
/// Unknown paths get a JSON 404.
///
/// CORS allows any origin so the dashboard can be served from anywhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_snapshots))
        // Queries
        .route("/api/world", get(handlers::get_world))
        .route("/api/squadron_status", get(handlers::squadron_status))
        .route("/api/threats", get(handlers::list_threats))
        .route("/api/signal_intelligence", get(handlers::signal_intelligence))
        .route("/api/status", get(handlers::status))
        // Operator control
        .route("/api/control", post(operator::control))
        .route("/api/threats/{id}/scan", post(operator::trigger_scan))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
