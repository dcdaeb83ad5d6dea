//! `POST /chat`: the primary interface for running a turn.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

use gm_domain::{Action, MapState};

use crate::runtime::session_lock::SessionBusy;
use crate::runtime::{resolve_local_turn, run_turn, TurnRequest, TurnResponse};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / response shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User message text.
    pub message: String,
    /// Thread to continue. Absent or empty starts a new one.
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub map_state: MapState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    /// Empty when the turn never needed a thread.
    pub thread_id: String,
    pub actions: Vec<Action>,
}

impl From<TurnResponse> for ChatResponse {
    fn from(resp: TurnResponse) -> Self {
        Self {
            message: resp.message,
            thread_id: resp.thread_id.unwrap_or_default(),
            actions: resp.actions,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> impl IntoResponse {
    let deps = match super::require_assistant(&state) {
        Ok(d) => d,
        Err(resp) => return resp.into_response(),
    };

    let inbound = body
        .thread_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    let req = TurnRequest {
        utterance: body.message,
        thread_id: inbound,
        map_state: body.map_state,
    };

    // Local commands never touch the thread, so they skip the lock.
    if let Some(resp) = resolve_local_turn(&req) {
        return Json(ChatResponse::from(resp)).into_response();
    }

    // New threads cannot collide; only an existing handle is serialized.
    let permit = match &req.thread_id {
        Some(thread_id) => match state.session_locks.acquire(thread_id).await {
            Ok(p) => Some(p),
            Err(SessionBusy) => {
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(serde_json::json!({
                        "error": SessionBusy.to_string(),
                        "thread_id": thread_id,
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let result = run_turn(&deps, req).await;
    drop(permit);
    state.session_locks.prune_idle();

    match result {
        Ok(resp) => Json(ChatResponse::from(resp)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "turn failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "thread_id": e.thread_id().unwrap_or_default(),
                })),
            )
                .into_response()
        }
    }
}
