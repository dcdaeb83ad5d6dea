pub mod auth;
pub mod chat;
pub mod health;
pub mod threads;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;

use crate::runtime::TurnDeps;
use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the `GM_API_TOKEN` bearer-token middleware).
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/health", get(health::health));

    let protected = Router::new()
        .route("/chat", post(chat::chat))
        .route("/thread", post(threads::create_thread))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}

/// Pre-flight: reject with 503 when the assistant service is unavailable.
pub(crate) fn require_assistant(
    state: &AppState,
) -> Result<TurnDeps, (StatusCode, Json<serde_json::Value>)> {
    state.turn_deps().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "assistant_not_configured",
                "reason": format!(
                    "No assistant service is available. Set [assistant] assistant_id \
                     (or the {} env var) and an API key (env {}), then restart.",
                    state.config.assistant.assistant_id_env,
                    state
                        .config
                        .assistant
                        .auth
                        .env
                        .as_deref()
                        .unwrap_or("BACKBOARD_IO_API_KEY"),
                ),
            })),
        )
    })
}
