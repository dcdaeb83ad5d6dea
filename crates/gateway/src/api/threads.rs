use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

/// `POST /thread`: open a fresh conversation thread.
pub async fn create_thread(State(state): State<AppState>) -> impl IntoResponse {
    let deps = match super::require_assistant(&state) {
        Ok(d) => d,
        Err(resp) => return resp.into_response(),
    };

    match deps.assistant.create_thread().await {
        Ok(thread_id) => {
            tracing::info!(thread_id = %thread_id, "thread created via API");
            Json(serde_json::json!({ "thread_id": thread_id })).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "thread creation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": format!("assistant service error: {e}") })),
            )
                .into_response()
        }
    }
}
