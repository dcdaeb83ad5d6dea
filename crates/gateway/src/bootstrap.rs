//! AppState construction shared by `serve`, `run`, `chat` and `thread`.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use gm_assistant::{AssistantService, BackboardClient};
use gm_domain::config::{AssistantConfig, Config, ConfigSeverity};

use crate::runtime::session_lock::SessionLockMap;
use crate::runtime::TurnDeps;
use crate::state::AppState;

/// Validate config and wire every component into an [`AppState`].
///
/// A missing API key or assistant id is not fatal here: the server still
/// starts and reports itself unconfigured.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Assistant service ────────────────────────────────────────────
    let assistant = match build_assistant(&config.assistant) {
        Ok(client) => {
            tracing::info!(
                base_url = %config.assistant.base_url,
                model = %config.assistant.model_name,
                "assistant service ready"
            );
            Some(client)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "assistant service not configured; /chat and /thread will return 503"
            );
            None
        }
    };

    // ── Per-thread locks ─────────────────────────────────────────────
    let session_locks = Arc::new(SessionLockMap::new(Duration::from_millis(
        config.turn.lock_wait_ms,
    )));

    // ── API token (read once, hash for constant-time comparison) ────
    let api_token_hash = {
        let env_var = &config.server.api_token_env;
        match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
            Some(token) => {
                tracing::info!(source = %format!("env:{env_var}"), "API bearer-token auth enabled");
                Some(hash_token(&token))
            }
            None => {
                tracing::warn!(
                    "API bearer-token auth DISABLED; set the {env_var} env var to require a token"
                );
                None
            }
        }
    };

    Ok(AppState {
        config,
        assistant,
        session_locks,
        api_token_hash,
    })
}

/// Construct the HTTP assistant client from config.
pub fn build_assistant(cfg: &AssistantConfig) -> gm_domain::Result<Arc<dyn AssistantService>> {
    let client = BackboardClient::from_config(cfg)?;
    Ok(Arc::new(client))
}

/// Turn dependencies for the one-shot CLI commands, which cannot do
/// anything useful without the assistant service.
pub fn require_turn_deps(state: &AppState) -> anyhow::Result<TurnDeps> {
    state.turn_deps().ok_or_else(|| {
        anyhow::anyhow!(
            "assistant service not configured: set [assistant] assistant_id (or {}) and an API key",
            state.config.assistant.assistant_id_env
        )
    })
}

pub fn hash_token(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}
