//! Integration tests for the HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic, routing, and
//! middleware without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use overlay_core::{HubConfig, ToggleMode};
use overlay_server::router::build_router;
use overlay_server::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

fn make_state(config: &HubConfig) -> Arc<AppState> {
    Arc::new(AppState::new(config))
}

fn make_router() -> (Router, Arc<AppState>) {
    let state = make_state(&HubConfig::default());
    (build_router(Arc::clone(&state)), state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn toggle(router: &Router, name: &str, body: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post(format!("/api/overlay/{name}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

/// A unique scratch directory holding an index page and one asset.
fn scratch_static_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("overlay-hub-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<!DOCTYPE html><title>index</title>").unwrap();
    std::fs::write(dir.join("admin.html"), "<!DOCTYPE html><title>admin</title>").unwrap();
    std::fs::write(dir.join("app.js"), "console.log('hi');").unwrap();
    dir
}

// =========================================================================
// Toggle
// =========================================================================

#[tokio::test]
async fn test_toggle_returns_flag_and_version() {
    let (router, _) = make_router();

    let (status, body) = toggle(&router, "chicken", r#"{"on": true}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "name": "chicken", "on": true, "version": 1}));
}

#[tokio::test]
async fn test_toggle_versions_are_monotonic() {
    let (router, _) = make_router();

    for expected in 1..=4 {
        let (_, body) = toggle(&router, "a", r#"{"on": true}"#).await;
        assert_eq!(body["version"], json!(expected));
    }
}

#[tokio::test]
async fn test_toggle_omits_version_when_disabled() {
    let mut config = HubConfig::default();
    config.http.include_version = false;
    let router = build_router(make_state(&config));

    let (status, body) = toggle(&router, "a", r#"{"on": true}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "name": "a", "on": true}));
}

#[tokio::test]
async fn test_toggle_coerces_malformed_body_to_off() {
    let (router, state) = make_router();
    let _ = toggle(&router, "a", r#"{"on": true}"#).await;

    let (status, body) = toggle(&router, "a", r#"{"on": "yes"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["on"], json!(false));

    let (status, body) = toggle(&router, "b", "garbage").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["on"], json!(false));

    let snap = state.hub.read();
    assert_eq!(snap.version, 3);
    assert!(!snap.state.is_on("a"));
}

#[tokio::test]
async fn test_exclusive_toggle_turns_others_off() {
    let (router, _) = make_router();
    let _ = toggle(&router, "a", r#"{"on": true}"#).await;
    let _ = toggle(&router, "b", r#"{"on": true}"#).await;

    let (_, body) = get_json(&router, "/api/state").await;

    assert_eq!(body["version"], json!(2));
    assert_eq!(body["state"]["overlays"], json!({"a": false, "b": true}));
    assert_eq!(body["state"]["active"], json!("b"));
}

#[tokio::test]
async fn test_independent_toggle_leaves_others_on() {
    let mut config = HubConfig::default();
    config.overlays.mode = ToggleMode::Independent;
    let router = build_router(make_state(&config));
    let _ = toggle(&router, "a", r#"{"on": true}"#).await;
    let _ = toggle(&router, "b", r#"{"on": true}"#).await;

    let (_, body) = get_json(&router, "/api/state").await;

    assert_eq!(body["state"], json!({"overlays": {"a": true, "b": true}}));
}

// =========================================================================
// Long-poll
// =========================================================================

#[tokio::test]
async fn test_poll_fresh_system_returns_immediately() {
    let (router, _) = make_router();
    let started = Instant::now();

    let (status, body) = get_json(&router, "/api/poll?timeout_ms=5000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], json!(0));
    assert_eq!(body["state"], json!({"overlays": {}}));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_poll_read_your_write() {
    let (router, _) = make_router();
    let (_, toggled) = toggle(&router, "n", r#"{"on": true}"#).await;
    let version = toggled["version"].as_i64().unwrap();

    let started = Instant::now();
    let (_, body) = get_json(
        &router,
        &format!("/api/poll?since={}&timeout_ms=25000", version - 1),
    )
    .await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(body["version"], json!(version));
    assert_eq!(body["state"]["overlays"]["n"], json!(true));
}

#[tokio::test]
async fn test_poll_times_out_with_unchanged_version() {
    let (router, _) = make_router();
    let started = Instant::now();

    let (status, body) = get_json(&router, "/api/poll?since=0&timeout_ms=50").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], json!(0));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_poll_wakes_on_change() {
    let (router, state) = make_router();

    let waiter = {
        let router = router.clone();
        tokio::spawn(async move { get_json(&router, "/api/poll?since=0&timeout_ms=25000").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let _ = state.hub.set_overlay("x", true).await;

    let (status, body) = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], json!(1));
    assert_eq!(body["state"]["overlays"]["x"], json!(true));
}

#[tokio::test]
async fn test_poll_is_idempotent() {
    let (router, _) = make_router();
    let _ = toggle(&router, "a", r#"{"on": true}"#).await;

    let (_, first) = get_json(&router, "/api/poll?since=0&timeout_ms=10").await;
    let (_, second) = get_json(&router, "/api/poll?since=0&timeout_ms=10").await;

    assert_eq!(first, second);
}

// =========================================================================
// Static collaborators and cache policy
// =========================================================================

#[tokio::test]
async fn test_api_responses_are_not_cached() {
    let (router, _) = make_router();

    let response = router
        .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
}

#[tokio::test]
async fn test_entry_pages_and_static_assets() {
    let dir = scratch_static_dir("static");
    let mut config = HubConfig::default();
    config.server.static_dir = dir.to_string_lossy().into_owned();
    config.server.static_max_age_secs = 120;
    let router = build_router(make_state(&config));

    let index = router
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(
        index.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(index.headers().get(header::PRAGMA).unwrap(), "no-cache");
    assert_eq!(index.headers().get(header::EXPIRES).unwrap(), "0");

    let admin = router
        .clone()
        .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::OK);

    let asset = router
        .oneshot(Request::get("/static/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(
        asset.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=120, s-maxage=120"
    );
    assert!(asset.headers().get(header::VARY).is_some());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_post_is_not_given_cache_headers() {
    let (router, _) = make_router();

    let response = router
        .oneshot(
            Request::post("/api/overlay/a")
                .body(Body::from(r#"{"on": true}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
}
