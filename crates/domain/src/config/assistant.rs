use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Remote assistant service (thread / run / tool-call API)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Assistant id to create threads under. Takes precedence over
    /// `assistant_id_env`.
    #[serde(default)]
    pub assistant_id: Option<String>,
    /// Env var consulted when `assistant_id` is unset.
    #[serde(default = "d_assistant_id_env")]
    pub assistant_id_env: String,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Model selector sent with every turn.
    #[serde(default = "d_llm_provider")]
    pub llm_provider: String,
    #[serde(default = "d_model_name")]
    pub model_name: String,
    /// Service-side memory mode (e.g. "Auto", "Off").
    #[serde(default = "d_memory")]
    pub memory: String,
    /// Per-request timeout. Expiry is a fatal turn error.
    #[serde(default = "d_60000u")]
    pub timeout_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            assistant_id: None,
            assistant_id_env: d_assistant_id_env(),
            auth: AuthConfig::default(),
            llm_provider: d_llm_provider(),
            model_name: d_model_name(),
            memory: d_memory(),
            timeout_ms: 60_000,
        }
    }
}

impl AssistantConfig {
    /// The configured assistant id, falling back to `assistant_id_env`.
    /// Empty values count as unset.
    pub fn resolve_assistant_id(&self) -> Option<String> {
        self.assistant_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| {
                std::env::var(&self.assistant_id_env)
                    .ok()
                    .filter(|id| !id.is_empty())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header name carrying the key.
    #[serde(default = "d_auth_header")]
    pub header: String,
    /// Header value prefix (e.g. "Bearer "). Empty for raw keys.
    #[serde(default)]
    pub prefix: String,
    /// Env var containing the key.
    #[serde(default = "d_auth_env")]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env or keychain).
    #[serde(default)]
    pub key: Option<String>,
    /// Keychain service name (e.g., "grantmap").
    #[serde(default)]
    pub service: Option<String>,
    /// Keychain account name (e.g., "backboard-api-key").
    #[serde(default)]
    pub account: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header: d_auth_header(),
            prefix: String::new(),
            env: d_auth_env(),
            key: None,
            service: None,
            account: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://app.backboard.io/api".into()
}
fn d_assistant_id_env() -> String {
    "BACKBOARD_ASSISTANT_ID".into()
}
fn d_llm_provider() -> String {
    "openai".into()
}
fn d_model_name() -> String {
    "gpt-4o".into()
}
fn d_memory() -> String {
    "Auto".into()
}
fn d_60000u() -> u64 {
    60_000
}
fn d_auth_header() -> String {
    "X-API-Key".into()
}
fn d_auth_env() -> Option<String> {
    Some("BACKBOARD_IO_API_KEY".into())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
