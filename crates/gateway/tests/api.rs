//! HTTP surface tests driven through `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{completed, ScriptedAssistant};
use gm_domain::config::Config;
use gm_domain::error::Error;
use gm_gateway::api;
use gm_gateway::bootstrap::hash_token;
use gm_gateway::runtime::session_lock::SessionLockMap;
use gm_gateway::state::AppState;

fn app(assistant: Option<Arc<ScriptedAssistant>>, token: Option<&str>) -> Router {
    let state = AppState {
        config: Arc::new(Config::default()),
        assistant: assistant.map(|a| a as Arc<dyn gm_assistant::AssistantService>),
        session_locks: Arc::new(SessionLockMap::new(Duration::from_millis(50))),
        api_token_hash: token.map(hash_token),
    };
    api::router(state.clone()).with_state(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_configuration() {
    let resp = app(None, None)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "status": "ok", "assistant_configured": false })
    );
}

#[tokio::test]
async fn chat_without_assistant_is_503() {
    let resp = app(None, None)
        .oneshot(post_json("/chat", json!({ "message": "hi" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await["error"], "assistant_not_configured");
}

#[tokio::test]
async fn local_chat_returns_empty_thread_id() {
    let svc = ScriptedAssistant::new();
    let resp = app(Some(svc.clone()), None)
        .oneshot(post_json("/chat", json!({ "message": "coverage of 15%" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["thread_id"], "");
    assert_eq!(body["actions"][0]["type"], "apply_filters");
    assert_eq!(body["actions"][0]["min_coverage"], 15.0);
    assert!(svc.calls().is_empty());
}

#[tokio::test]
async fn chat_accepts_partial_map_state() {
    let svc = ScriptedAssistant::new();
    svc.on_message(completed("Noted."));

    let resp = app(Some(svc.clone()), None)
        .oneshot(post_json(
            "/chat",
            json!({
                "message": "what is selected?",
                "thread_id": "thr_x",
                "map_state": { "settlement": "Ayr", "show_buildings": true }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["message"], "Noted.");
    assert_eq!(body["thread_id"], "thr_x");
    assert_eq!(body["actions"], json!([]));
}

#[tokio::test]
async fn fatal_turn_error_is_502_with_thread() {
    let svc = ScriptedAssistant::new();
    svc.on_message(Err(Error::Http("connection refused".into())));

    let resp = app(Some(svc), None)
        .oneshot(post_json("/chat", json!({ "message": "hello" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["thread_id"], "thr_1");
}

#[tokio::test]
async fn create_thread_endpoint() {
    let svc = ScriptedAssistant::new();
    let resp = app(Some(svc), None)
        .oneshot(Request::post("/thread").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "thread_id": "thr_1" }));
}

#[tokio::test]
async fn bearer_token_is_enforced_on_protected_routes() {
    let svc = ScriptedAssistant::new();
    let router = app(Some(svc), Some("s3cret"));

    let denied = router
        .clone()
        .oneshot(Request::post("/thread").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let allowed = router
        .clone()
        .oneshot(
            Request::post("/thread")
                .header("authorization", "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);

    let health = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn busy_thread_is_429() {
    let svc = ScriptedAssistant::new();
    let locks = Arc::new(SessionLockMap::new(Duration::from_millis(20)));
    let state = AppState {
        config: Arc::new(Config::default()),
        assistant: Some(svc as Arc<dyn gm_assistant::AssistantService>),
        session_locks: locks.clone(),
        api_token_hash: None,
    };
    let router = api::router(state.clone()).with_state(state);

    let _held = locks.acquire("thr_busy").await.unwrap();
    let resp = router
        .oneshot(post_json(
            "/chat",
            json!({ "message": "anything", "thread_id": "thr_busy" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn local_command_on_busy_thread_skips_the_lock() {
    let svc = ScriptedAssistant::new();
    let locks = Arc::new(SessionLockMap::new(Duration::from_millis(20)));
    let state = AppState {
        config: Arc::new(Config::default()),
        assistant: Some(svc.clone() as Arc<dyn gm_assistant::AssistantService>),
        session_locks: locks.clone(),
        api_token_hash: None,
    };
    let router = api::router(state.clone()).with_state(state);

    let _held = locks.acquire("thr_busy").await.unwrap();
    let resp = router
        .oneshot(post_json(
            "/chat",
            json!({ "message": "set coverage to 25%", "thread_id": "thr_busy" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["thread_id"], "thr_busy");
    assert_eq!(body["actions"][0]["min_coverage"], 25.0);
    assert!(svc.calls().is_empty());
}
