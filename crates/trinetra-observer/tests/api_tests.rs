//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use trinetra_core::{SimulationConfig, SimulationHandle};
use trinetra_observer::router::build_router;
use trinetra_observer::state::AppState;
use trinetra_types::{JetId, Position, RangeBand, SignalRecord, ThreatId};

fn make_test_state() -> Arc<AppState> {
    let mut config = SimulationConfig::default();
    config.world.seed = Some(99);
    Arc::new(AppState::new(SimulationHandle::from_config(&config)))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_get_world() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/world").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["is_paused"], false);
    assert_eq!(json["mission_status"], "AWAITING COMMANDS");
    assert_eq!(json["squadron"].as_array().unwrap().len(), 5);
    assert_eq!(json["threats"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["events"][0],
        "System Initialized. Awaiting operator input."
    );
    assert!(json["pulse_history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_squadron_status() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::get("/api/squadron_status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let jets = json["jets"].as_array().unwrap();
    assert_eq!(jets.len(), 5);
    assert_eq!(jets[0]["name"], "1");
    assert_eq!(jets[0]["status"], "PATROL");
    assert_eq!(jets[0]["fuel"], 100.0);
    assert!(jets[0]["locked_enemy"].is_null());
}

#[tokio::test]
async fn test_list_threats() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/threats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let threats = json["threats"].as_array().unwrap();
    assert_eq!(threats[0]["id"], 1);
    assert_eq!(threats[0]["x"], 22.25);
    assert_eq!(threats[1]["is_scanning"], false);
}

#[tokio::test]
async fn test_signal_intelligence_sorted_newest_first() {
    let state = make_test_state();
    let base = Utc::now();
    {
        let mut world = state.simulation.lock().await;
        world.place_jet(JetId::new(1), Position::new(22.30, 84.80));
        world.place_threat(ThreatId::new(1), Position::new(22.30, 84.82));
    }
    // Jet 1 locks threat 1 on the first pass, then picks up threat 2.
    let mut engine = trinetra_core::detection::DetectionEngine::seeded(
        &trinetra_core::config::DetectionConfig::default(),
        Some(1),
    );
    state.simulation.run_tick(&mut engine, base).await.unwrap();
    {
        let mut world = state.simulation.lock().await;
        world.place_threat(ThreatId::new(2), Position::new(22.30, 84.81));
    }
    let later = base + chrono::Duration::seconds(5);
    state.simulation.run_tick(&mut engine, later).await.unwrap();

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::get("/api/signal_intelligence")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let records = json.as_array().unwrap();
    assert!(records.len() >= 2);
    let stamps: Vec<String> = records
        .iter()
        .map(|r| r["timestamp"].as_str().unwrap().to_owned())
        .collect();
    let mut sorted = stamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(stamps, sorted);
    assert!(records.iter().all(|r| r["jet_id"].is_number()));
}

#[tokio::test]
async fn test_status_reports_counters() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["is_paused"], false);
    assert_eq!(json["jets"], 5);
    assert_eq!(json["ticks"]["motion"], 0);
    assert_eq!(json["subscribers"], 0);
}

#[tokio::test]
async fn test_control_toggle_pause_broadcasts() {
    let state = make_test_state();
    let mut subscription = state.subscribe().await;
    subscription.try_next().unwrap();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(post_json("/api/control", r#"{"command":"toggle_pause"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["command_received"], "toggle_pause");
    assert_eq!(json["mission_status"], "SIMULATION PAUSED");
    assert_eq!(json["is_paused"], true);

    let snapshot = subscription.try_next().unwrap();
    assert!(snapshot.is_paused);
}

#[tokio::test]
async fn test_control_reset() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(post_json("/api/control", r#"{"command":"reset_simulation"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let world = state.simulation.snapshot().await;
    assert_eq!(world.mission_status, "SIMULATION RESET");
    assert!(world.events[0].ends_with("Simulation reset."));
    assert_eq!(world.events.len(), 2);
}

#[tokio::test]
async fn test_control_unknown_command_is_400() {
    let state = make_test_state();
    let before = state.simulation.snapshot().await;
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(post_json("/api/control", r#"{"command":"self_destruct"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
    assert_eq!(json["error"], "unrecognized command: self_destruct");
    assert_eq!(state.simulation.snapshot().await, before);
}

#[tokio::test]
async fn test_control_malformed_body_is_400() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(post_json("/api/control", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_trigger_scan() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(
            Request::post("/api/threats/2/scan")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["command_received"], "trigger_scan");
    let threats = state.simulation.threats().await;
    assert!(threats[1].is_scanning);
    assert!(!threats[0].is_scanning);
}

#[tokio::test]
async fn test_trigger_scan_unknown_threat_is_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::post("/api/threats/9/scan")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "unknown threat: 9");
}

#[tokio::test]
async fn test_trigger_scan_bad_id_is_400() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(
            Request::post("/api/threats/abc/scan")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_queries_do_not_broadcast() {
    let state = make_test_state();
    let mut subscription = state.subscribe().await;
    subscription.try_next().unwrap();

    for uri in [
        "/api/world",
        "/api/squadron_status",
        "/api/threats",
        "/api/signal_intelligence",
        "/api/status",
    ] {
        let router = build_router(Arc::clone(&state));
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    assert!(subscription.try_next().is_none());
}

#[tokio::test]
async fn test_signal_record_wire_format() {
    let record = SignalRecord {
        timestamp: Utc::now(),
        frequency_ghz: 12.0,
        strength_db: -40.0,
        angle_deg: 90.0,
        range: RangeBand::Mid,
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["range"], "MID");
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_nonexistent_route_returns_json_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
    assert_eq!(json["error"], "no route for /api/nope");
}
