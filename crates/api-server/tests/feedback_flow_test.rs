//! HTTP-level tests for the visit/feedback flow, driven through the router
//! without binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use variant_api::{build_router, AppState};
use variant_core::config::AgentConfig;
use variant_rl_engine::EpsilonGreedyAgent;

fn test_agent(epsilon: f64, cold_start_size: usize) -> Arc<EpsilonGreedyAgent> {
    let config = AgentConfig {
        epsilon,
        cold_start_size,
        ..Default::default()
    };
    Arc::new(EpsilonGreedyAgent::with_seed(&config, 11).expect("valid agent config"))
}

fn test_app(agent: Arc<EpsilonGreedyAgent>) -> Router {
    build_router(AppState::new(agent, "test-node"), None)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_visit_returns_configured_arm() {
    let app = test_app(test_agent(0.1, 10));

    let (status, body) = send(&app, Method::POST, "/api/visit", None).await;
    assert_eq!(status, StatusCode::OK);
    let version = body["version"].as_str().expect("version string");
    assert!(version == "day" || version == "night");
}

#[tokio::test]
async fn test_visits_follow_balanced_cold_start() {
    let app = test_app(test_agent(0.1, 10));

    let mut day = 0;
    for _ in 0..10 {
        let (_, body) = send(&app, Method::POST, "/api/visit", None).await;
        if body["version"] == "day" {
            day += 1;
        }
    }
    assert_eq!(day, 5);
}

#[tokio::test]
async fn test_book_feedback_updates_state() {
    let agent = test_agent(0.1, 10);
    let app = test_app(agent.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({"version": "day", "action": "Book"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agentState"]["q"]["day"], 1.0);
    assert_eq!(body["agentState"]["n"]["day"], 1);
    assert_eq!(body["agentState"]["q"]["night"], 0.0);
    assert_eq!(body["agentState"]["n"]["night"], 0);
    let next = body["nextVersion"].as_str().expect("nextVersion string");
    assert!(next == "day" || next == "night");

    // The feedback call consumed one warm-up slot for the next visitor.
    assert_eq!(agent.cold_start_remaining(), 9);
}

#[tokio::test]
async fn test_non_book_feedback_is_zero_reward() {
    let app = test_app(test_agent(0.1, 10));

    for action in ["Not Interested", "not_interested", "", "booking"] {
        send(
            &app,
            Method::POST,
            "/api/feedback",
            Some(json!({"version": "night", "action": action})),
        )
        .await;
    }
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({"version": "night"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agentState"]["q"]["night"], 0.0);
    assert_eq!(body["agentState"]["n"]["night"], 5);
}

#[tokio::test]
async fn test_invalid_version_is_rejected() {
    let agent = test_agent(0.1, 10);
    let app = test_app(agent.clone());

    let rejected = [
        json!({"version": "nonexistent_arm", "action": "book"}),
        json!({"version": "DAY", "action": "book"}),
        json!({"action": "book"}),
        json!({"version": 3, "action": "book"}),
    ];
    for payload in rejected {
        let (status, body) = send(&app, Method::POST, "/api/feedback", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid version");
    }

    let state = agent.state();
    assert!(state.count.values().all(|&n| n == 0));
    assert!(state.value_estimate.values().all(|&q| q == 0.0));
    assert_eq!(agent.cold_start_remaining(), 10);
}

#[tokio::test]
async fn test_missing_body_is_rejected() {
    let app = test_app(test_agent(0.1, 10));

    let (status, body) = send(&app, Method::POST, "/api/feedback", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid version");
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let agent = test_agent(0.10, 10);
    let app = test_app(agent.clone());

    for _ in 0..10 {
        send(&app, Method::POST, "/api/visit", None).await;
    }
    assert_eq!(agent.cold_start_remaining(), 0);

    for _ in 0..5 {
        send(
            &app,
            Method::POST,
            "/api/feedback",
            Some(json!({"version": "day", "action": "book"})),
        )
        .await;
    }
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({"version": "night", "action": "book"})),
    )
    .await;
    assert_eq!(body["agentState"]["q"], json!({"day": 1.0, "night": 1.0}));
    assert_eq!(body["agentState"]["n"], json!({"day": 5, "night": 1}));

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({"version": "night", "action": "not interested"})),
    )
    .await;
    assert_eq!(body["agentState"]["q"]["night"], 0.5);
    assert_eq!(body["agentState"]["n"]["night"], 2);
}

#[tokio::test]
async fn test_state_endpoint() {
    let agent = test_agent(0.25, 10);
    agent.update(&"night".into(), 1.0).expect("known arm");
    let app = test_app(agent);

    let (status, body) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["epsilon"], 0.25);
    assert_eq!(body["coldStartRemaining"], 10);
    assert_eq!(body["q"]["night"], 1.0);
    assert_eq!(body["n"]["night"], 1);
}

#[tokio::test]
async fn test_operational_probes() {
    let app = test_app(test_agent(0.1, 10));

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["node_id"], "test-node");

    let (status, _) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/live", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_lists_bandit_paths() {
    let app = test_app(test_agent(0.1, 10));

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/visit"].is_object());
    assert!(body["paths"]["/api/feedback"].is_object());
}

#[tokio::test]
async fn test_static_front_end_is_served() {
    let dir = std::env::temp_dir().join(format!("variant-express-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    std::fs::write(dir.join("index.html"), "<h1>landing</h1>").expect("write index");

    let app = build_router(AppState::new(test_agent(0.1, 10), "test-node"), Some(dir.as_path()));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("router is infallible");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    assert_eq!(&bytes[..], b"<h1>landing</h1>");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_cors_headers_present() {
    let app = test_app(test_agent(0.1, 10));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/visit")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router is infallible");
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
