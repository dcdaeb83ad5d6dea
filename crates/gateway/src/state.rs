use std::sync::Arc;

use gm_assistant::AssistantService;
use gm_domain::config::Config;

use crate::runtime::session_lock::SessionLockMap;
use crate::runtime::TurnDeps;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    /// `None` when the API key or assistant id is missing; `/chat` and
    /// `/thread` then answer 503.
    pub assistant: Option<Arc<dyn AssistantService>>,

    // ── Concurrency ───────────────────────────────────────────────────
    pub session_locks: Arc<SessionLockMap>,

    // ── Security (startup-computed) ───────────────────────────────────
    /// SHA-256 hash of the API bearer token (read once at startup).
    /// `None` = dev mode (no auth enforced).
    pub api_token_hash: Option<Vec<u8>>,
}

impl AppState {
    /// Turn dependencies, if the assistant service is available.
    pub fn turn_deps(&self) -> Option<TurnDeps> {
        let assistant = self.assistant.clone()?;
        Some(TurnDeps::new(
            assistant,
            &self.config.assistant,
            self.config.turn.clone(),
        ))
    }
}
