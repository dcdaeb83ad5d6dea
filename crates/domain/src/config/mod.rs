mod assistant;
mod observability;
mod server;
mod turn;

pub use assistant::*;
pub use observability::*;
pub use server::*;
pub use turn::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub turn: TurnConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |severity, field: &str, message: &str| {
            errors.push(ConfigError {
                severity,
                field: field.into(),
                message: message.into(),
            });
        };

        if self.server.port == 0 {
            push(ConfigSeverity::Error, "server.port", "port must be greater than 0");
        }
        if self.server.host.is_empty() {
            push(ConfigSeverity::Error, "server.host", "host must not be empty");
        }

        if self.assistant.base_url.is_empty() {
            push(
                ConfigSeverity::Error,
                "assistant.base_url",
                "base_url must not be empty",
            );
        }
        if self.assistant.model_name.is_empty() {
            push(
                ConfigSeverity::Error,
                "assistant.model_name",
                "model_name must not be empty",
            );
        }
        if self.assistant.timeout_ms == 0 {
            push(
                ConfigSeverity::Error,
                "assistant.timeout_ms",
                "timeout_ms must be greater than 0",
            );
        }
        if self.assistant.resolve_assistant_id().is_none() {
            push(
                ConfigSeverity::Warning,
                "assistant.assistant_id",
                "no assistant id configured; /chat and /thread will return 503",
            );
        }

        if self.turn.max_tool_rounds == 0 {
            push(
                ConfigSeverity::Warning,
                "turn.max_tool_rounds",
                "0 disables tool-call submission entirely",
            );
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            push(
                ConfigSeverity::Error,
                "observability.sample_rate",
                "sample_rate must be between 0.0 and 1.0",
            );
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            push(
                ConfigSeverity::Warning,
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            );
        }

        errors
    }
}
