//! Integration tests for the Rover API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic, routing, and
//! the SSE stream contract without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use image::{ImageFormat, Rgba, RgbaImage};
use rover_server::router::build_router;
use rover_server::state::AppState;
use rover_session::RoverConfig;
use serde_json::Value;
use tower::ServiceExt;

/// Create a state with a real 80x60 map asset in a fresh temp directory.
fn make_test_state(tag: &str) -> Arc<AppState> {
    let dir = std::env::temp_dir().join(format!("rover-api-tests-{tag}"));
    std::fs::create_dir_all(&dir).unwrap();

    let map = RgbaImage::from_pixel(80, 60, Rgba([0x28, 0x28, 0x28, 0xff]));
    map.save_with_format(dir.join("test.png"), ImageFormat::Png)
        .unwrap();

    let mut config = RoverConfig::default();
    config.maps.dir.clone_from(&dir);
    config.scenario.path = dir.join("scenario.yaml");
    config.world.width_px = 80;
    config.world.height_px = 60;
    config.world.px_per_metre = 10.0;
    config.session.step_ceiling = 3;
    config.session.pacing_interval_ms = 1;

    Arc::new(AppState::new(config))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect an SSE body and return the JSON payload of each `data:` line.
async fn sse_events(body: Body) -> Vec<Value> {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    text.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|payload| serde_json::from_str(payload).unwrap())
        .collect()
}

fn start_request(robot_count: u32, map_name: &str) -> Request<Body> {
    let body = serde_json::json!({
        "map_name": map_name,
        "robot_count": robot_count,
        "robot_position": {"x": 10.0, "y": 50.0},
        "goals": [],
    });
    Request::post("/api/simulation/start")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn pause_request(paused: bool) -> Request<Body> {
    Request::post("/api/simulation/pause")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!("{{\"paused\": {paused}}}")))
        .unwrap()
}

fn stop_request() -> Request<Body> {
    Request::post("/api/simulation/stop")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn health_returns_service_status() {
    let router = build_router(make_test_state("health"));
    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "rover-backend");
}

#[tokio::test]
async fn index_returns_html_status_page() {
    let router = build_router(make_test_state("index"));
    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Rover Backend"));
    assert!(html.contains("idle"));
}

#[tokio::test]
async fn map_bytes_are_served() {
    let state = make_test_state("map-ok");
    let expected = std::fs::read(state.maps.root().join("test.png")).unwrap();

    let router = build_router(state);
    let response = router
        .oneshot(Request::get("/api/maps/test.png").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.to_vec(), expected);
}

#[tokio::test]
async fn missing_map_is_404() {
    let router = build_router(make_test_state("map-missing"));
    let response = router
        .oneshot(Request::get("/api/maps/ghost.png").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn traversal_map_name_is_400() {
    let router = build_router(make_test_state("map-traversal"));
    let response = router
        .oneshot(Request::get("/api/maps/..").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pause_without_session_is_conflict() {
    let router = build_router(make_test_state("pause-none"));
    let response = router.oneshot(pause_request(true)).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "no active simulation session");
}

#[tokio::test]
async fn stop_without_session_is_conflict() {
    let router = build_router(make_test_state("stop-none"));
    let response = router.oneshot(stop_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn start_with_zero_robots_is_bad_request() {
    let router = build_router(make_test_state("start-zero"));
    let response = router.oneshot(start_request(0, "test.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn start_with_unknown_map_is_404() {
    let router = build_router(make_test_state("start-nomap"));
    let response = router.oneshot(start_request(1, "ghost.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_streams_frames_then_completed() {
    let state = make_test_state("start-stream");
    let router = build_router(Arc::clone(&state));

    let response = router.oneshot(start_request(1, "test.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Ceiling is 3: exactly three frames then one completed marker.
    let events = sse_events(response.into_body()).await;
    assert_eq!(events.len(), 4);

    for (index, event) in events.iter().take(3).enumerate() {
        assert_eq!(event["step"], u64::try_from(index).unwrap());
        let frame = event["frame"].as_str().unwrap();
        assert!(!frame.is_empty(), "frame payload must be base64 text");
    }
    assert_eq!(events.last().unwrap(), &serde_json::json!({"status": "completed"}));

    // The slot is free again once the stream has ended.
    assert!(state.registry.current().is_none());

    // The scenario file was persisted for this session.
    let scenario = std::fs::read_to_string(&state.config.scenario.path).unwrap();
    assert!(scenario.contains("obstacle_map: test.png"));
}

#[tokio::test]
async fn stop_during_stream_yields_stopped_terminal() {
    let state = make_test_state("start-stop");
    let mut config = state.config.clone();
    config.session.step_ceiling = 100_000;
    config.session.pacing_interval_ms = 20;
    let state = Arc::new(AppState::new(config));
    let router = build_router(Arc::clone(&state));

    let response = router
        .clone()
        .oneshot(start_request(1, "test.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stopper = {
        let router = router.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            router.oneshot(stop_request()).await.unwrap()
        }
    };

    let (events, stop_response) =
        tokio::join!(sse_events(response.into_body()), stopper);

    assert_eq!(stop_response.status(), StatusCode::OK);

    // Zero or more frames, then exactly one stopped terminal event.
    let (terminal, frames) = events.split_last().unwrap();
    assert_eq!(terminal, &serde_json::json!({"status": "stopped"}));
    for (index, event) in frames.iter().enumerate() {
        assert_eq!(event["step"], u64::try_from(index).unwrap());
    }
}

#[tokio::test]
async fn second_start_is_conflict_while_streaming() {
    let state = make_test_state("start-conflict");
    let mut config = state.config.clone();
    config.session.step_ceiling = 100_000;
    config.session.pacing_interval_ms = 20;
    let state = Arc::new(AppState::new(config));
    let router = build_router(Arc::clone(&state));

    let first = router
        .clone()
        .oneshot(start_request(1, "test.png"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .clone()
        .oneshot(start_request(1, "test.png"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // Clean up: stop the first session and drain its stream.
    let stop = router.oneshot(stop_request()).await.unwrap();
    assert_eq!(stop.status(), StatusCode::OK);
    let events = sse_events(first.into_body()).await;
    assert_eq!(
        events.last().unwrap(),
        &serde_json::json!({"status": "stopped"})
    );
}
