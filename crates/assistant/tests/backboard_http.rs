//! HTTP round-trip tests for the Backboard adapter against a local mock
//! service. No network access beyond the loopback interface.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};

use gm_assistant::{AssistantService, BackboardClient, MessageRequest, RunStatus};
use gm_domain::config::{AssistantConfig, AuthConfig};
use gm_domain::tool::ToolOutput;
use gm_domain::Error;

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

impl Recorded {
    fn push(&self, path: String, headers: &HeaderMap, body: Value) {
        let key = headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.requests.lock().push((path, key, body));
    }
}

async fn create_thread(
    State(rec): State<Recorded>,
    Path(assistant_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    rec.push(format!("/assistants/{assistant_id}/threads"), &headers, body);
    Json(json!({ "thread_id": "thr_new" }))
}

async fn add_message(
    State(rec): State<Recorded>,
    Path(thread_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    rec.push(format!("/threads/{thread_id}/messages"), &headers, body);
    if thread_id == "thr_broken" {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid parameter: messages with role 'tool' must follow tool_calls",
        )
            .into_response();
    }
    Json(json!({
        "status": "REQUIRES_ACTION",
        "run_id": "run_1",
        "tool_calls": [
            { "id": "call_1", "function": { "name": "apply_filters", "parsed_arguments": { "min_coverage": 20 } } }
        ]
    }))
    .into_response()
}

async fn submit(
    State(rec): State<Recorded>,
    Path((thread_id, run_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    rec.push(
        format!("/threads/{thread_id}/runs/{run_id}/submit-tool-outputs"),
        &headers,
        body,
    );
    Json(json!({ "status": "COMPLETED", "content": "Done." }))
}

async fn spawn_mock() -> (String, Recorded) {
    let rec = Recorded::default();
    let app = Router::new()
        .route("/api/assistants/:assistant_id/threads", post(create_thread))
        .route("/api/threads/:thread_id/messages", post(add_message))
        .route(
            "/api/threads/:thread_id/runs/:run_id/submit-tool-outputs",
            post(submit),
        )
        .with_state(rec.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api/"), rec)
}

fn client_for(base_url: String) -> BackboardClient {
    let cfg = AssistantConfig {
        base_url,
        assistant_id: Some("asst_test".into()),
        auth: AuthConfig {
            key: Some("secret-key".into()),
            env: None,
            ..Default::default()
        },
        timeout_ms: 5_000,
        ..Default::default()
    };
    BackboardClient::from_config(&cfg).unwrap()
}

fn message(content: &str) -> MessageRequest {
    MessageRequest {
        content: content.into(),
        llm_provider: "openai".into(),
        model_name: "gpt-4o".into(),
        memory: "Auto".into(),
    }
}

#[tokio::test]
async fn full_thread_round_trip() {
    let (base, rec) = spawn_mock().await;
    let client = client_for(base);

    let thread_id = client.create_thread().await.unwrap();
    assert_eq!(thread_id, "thr_new");

    let run = client.add_message(&thread_id, &message("hello")).await.unwrap();
    assert_eq!(run.status, RunStatus::RequiresAction);
    assert_eq!(run.run_id.as_deref(), Some("run_1"));
    assert_eq!(run.tool_calls[0].arguments["min_coverage"], 20);

    let outputs = vec![run.tool_calls[0].acknowledge()];
    let done = client
        .submit_tool_outputs(&thread_id, "run_1", &outputs)
        .await
        .unwrap();
    assert_eq!(done.status, RunStatus::Completed);
    assert_eq!(done.content.as_deref(), Some("Done."));

    let requests = rec.requests.lock().clone();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].0, "/assistants/asst_test/threads");
    assert!(requests
        .iter()
        .all(|(_, key, _)| key.as_deref() == Some("secret-key")));

    let msg_body = &requests[1].2;
    assert_eq!(msg_body["content"], "hello");
    assert_eq!(msg_body["model_name"], "gpt-4o");
    assert_eq!(msg_body["stream"], false);

    let submit_body = &requests[2].2;
    assert_eq!(requests[2].0, "/threads/thr_new/runs/run_1/submit-tool-outputs");
    assert_eq!(submit_body["tool_outputs"][0]["tool_call_id"], "call_1");
}

#[tokio::test]
async fn http_error_surfaces_service_text() {
    let (base, _rec) = spawn_mock().await;
    let client = client_for(base);

    let err = client
        .add_message("thr_broken", &message("hi"))
        .await
        .unwrap_err();
    match err {
        Error::Provider { provider, message } => {
            assert_eq!(provider, "backboard");
            assert!(message.starts_with("HTTP 400"));
            assert!(message.contains("Invalid parameter"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_service_is_http_error() {
    // Bind and immediately drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{addr}"));
    let err = client.create_thread().await.unwrap_err();
    assert!(matches!(err, Error::Http(_) | Error::Timeout(_)));
}

#[test]
fn missing_assistant_id_fails_construction() {
    let cfg = AssistantConfig {
        assistant_id: None,
        assistant_id_env: "GM_TEST_NO_SUCH_ASSISTANT_VAR".into(),
        auth: AuthConfig {
            key: Some("k".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = BackboardClient::from_config(&cfg).err().unwrap();
    assert!(matches!(err, Error::Config(_)));
}
