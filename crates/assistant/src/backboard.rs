//! Backboard-style assistant service adapter.
//!
//! Speaks the thread / run / tool-output REST contract:
//!
//! - `POST {base}/assistants/{assistant_id}/threads` → `{ "thread_id" }`
//! - `POST {base}/threads/{thread_id}/messages` → run result
//! - `POST {base}/threads/{thread_id}/runs/{run_id}/submit-tool-outputs` → run result
//!
//! The service reports tool calls in two shapes depending on the endpoint:
//! object-style calls whose `function.parsed_arguments` is already a JSON
//! object, and plain mappings whose `function.arguments` is a JSON-encoded
//! string. Both are normalized into [`ToolCall`] right here.

use std::time::Duration;

use gm_domain::config::AssistantConfig;
use gm_domain::error::{Error, Result};
use gm_domain::tool::{ToolCall, ToolOutput};
use serde_json::Value;

use crate::traits::{AssistantService, MessageRequest, RunResult, RunStatus};
use crate::util::{from_reqwest, resolve_api_key};

const SERVICE_ID: &str = "backboard";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct BackboardClient {
    base_url: String,
    assistant_id: String,
    auth_header: String,
    auth_value: String,
    client: reqwest::Client,
}

impl BackboardClient {
    /// Build the client from config, resolving the API key and assistant id
    /// eagerly. Fails with [`Error::Auth`] / [`Error::Config`] when either
    /// is missing.
    pub fn from_config(cfg: &AssistantConfig) -> Result<Self> {
        let (api_key, key_source) = resolve_api_key(&cfg.auth)?;
        tracing::debug!(service = SERVICE_ID, source = ?key_source, "assistant API key resolved");
        let assistant_id = cfg.resolve_assistant_id().ok_or_else(|| {
            Error::Config(format!(
                "no assistant id: set assistant.assistant_id or the {} env var",
                cfg.assistant_id_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            assistant_id,
            auth_header: cfg.auth.header.clone(),
            auth_value: format!("{}{}", cfg.auth.prefix, api_key),
            client,
        })
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    // ── Internal: authenticated JSON POST ─────────────────────────

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        tracing::debug!(service = SERVICE_ID, url = %url, "assistant request");

        let resp = self
            .client
            .post(url)
            .header(&self.auth_header, &self.auth_value)
            .json(body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Provider {
                provider: SERVICE_ID.into(),
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        if resp_text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_str(&resp_text)?)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Ids come back as strings or bare numbers depending on the endpoint.
fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn parse_thread_id(body: &Value) -> Result<String> {
    body.get("thread_id")
        .and_then(id_string)
        .ok_or_else(|| Error::Provider {
            provider: SERVICE_ID.into(),
            message: "no thread_id in create-thread response".into(),
        })
}

pub(crate) fn parse_run_result(body: &Value) -> RunResult {
    let status = body
        .get("status")
        .and_then(Value::as_str)
        .map(RunStatus::parse)
        .unwrap_or_else(|| RunStatus::Other(String::new()));

    let content = body
        .get("content")
        .and_then(Value::as_str)
        .map(String::from);

    let run_id = body.get("run_id").and_then(id_string);

    let tool_calls = body
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(normalize_tool_call).collect())
        .unwrap_or_default();

    RunResult {
        run_id,
        status,
        content,
        tool_calls,
    }
}

/// Convert either wire representation of a tool call into a [`ToolCall`].
pub(crate) fn normalize_tool_call(tc: &Value) -> Option<ToolCall> {
    let call_id = tc
        .get("id")
        .or_else(|| tc.get("tool_call_id"))
        .and_then(id_string);
    let func = tc.get("function").unwrap_or(tc);
    let tool_name = func.get("name").and_then(Value::as_str);

    let (Some(call_id), Some(tool_name)) = (call_id, tool_name) else {
        tracing::warn!(raw = %tc, "dropping malformed tool call");
        return None;
    };

    let arguments = match func.get("parsed_arguments").or_else(|| func.get("arguments")) {
        Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!(tool = %tool_name, error = %e, "tool arguments are not valid JSON");
            Value::Object(Default::default())
        }),
        Some(v) => v.clone(),
        None => Value::Object(Default::default()),
    };

    Some(ToolCall::new(call_id, tool_name, arguments))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl AssistantService for BackboardClient {
    async fn create_thread(&self) -> Result<String> {
        let url = format!("{}/assistants/{}/threads", self.base_url, self.assistant_id);
        let body = self.post_json(&url, &serde_json::json!({})).await?;
        parse_thread_id(&body)
    }

    async fn add_message(&self, thread_id: &str, req: &MessageRequest) -> Result<RunResult> {
        let url = format!("{}/threads/{}/messages", self.base_url, thread_id);
        let body = serde_json::json!({
            "content": req.content,
            "llm_provider": req.llm_provider,
            "model_name": req.model_name,
            "memory": req.memory,
            "stream": false,
        });
        let resp = self.post_json(&url, &body).await?;
        Ok(parse_run_result(&resp))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<RunResult> {
        let url = format!(
            "{}/threads/{}/runs/{}/submit-tool-outputs",
            self.base_url, thread_id, run_id
        );
        let body = serde_json::json!({ "tool_outputs": outputs });
        let resp = self.post_json(&url, &body).await?;
        Ok(parse_run_result(&resp))
    }

    fn service_id(&self) -> &str {
        SERVICE_ID
    }
}
