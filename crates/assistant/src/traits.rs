use gm_domain::error::Result;
use gm_domain::tool::{ToolCall, ToolOutput};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One user turn sent to a thread.
#[derive(Debug, Clone)]
pub struct MessageRequest {
    /// Fully enriched prompt text.
    pub content: String,
    /// Upstream LLM provider the service should route to (e.g. "openai").
    pub llm_provider: String,
    /// Model name for that provider (e.g. "gpt-4o").
    pub model_name: String,
    /// Service-side memory mode.
    pub memory: String,
}

/// Run status as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    RequiresAction,
    Failed,
    /// Anything else (`in_progress`, `cancelled`, ...), kept verbatim.
    Other(String),
}

impl RunStatus {
    /// Parse a wire status. Matching is case-insensitive and treats `-`
    /// like `_`, so `REQUIRES_ACTION` and `requires-action` are the same.
    pub fn parse(raw: &str) -> Self {
        let norm = raw.trim().to_ascii_lowercase().replace('-', "_");
        match norm.as_str() {
            "completed" => Self::Completed,
            "requires_action" => Self::RequiresAction,
            "failed" => Self::Failed,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::RequiresAction => f.write_str("requires_action"),
            RunStatus::Failed => f.write_str("failed"),
            RunStatus::Other(s) => f.write_str(s),
        }
    }
}

/// The service's answer to a turn or a tool-output submission.
///
/// A newer result always replaces the previous one; results are never
/// merged.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Needed to submit tool outputs. May be absent on terminal results.
    pub run_id: Option<String>,
    pub status: RunStatus,
    /// Assistant text, if any.
    pub content: Option<String>,
    /// Pending tool calls, already normalized.
    pub tool_calls: Vec<ToolCall>,
}

impl RunResult {
    pub fn completed(content: impl Into<String>) -> Self {
        Self {
            run_id: None,
            status: RunStatus::Completed,
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn failed() -> Self {
        Self {
            run_id: None,
            status: RunStatus::Failed,
            content: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn requires_action(run_id: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            run_id: Some(run_id.into()),
            status: RunStatus::RequiresAction,
            content: None,
            tool_calls,
        }
    }

    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, str::len)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core service trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A remote conversational service with a thread / run / tool-call model.
///
/// Constructed once at startup and shared behind an `Arc`; tests swap in
/// a scripted implementation.
#[async_trait::async_trait]
pub trait AssistantService: Send + Sync {
    /// Create a fresh thread and return its handle.
    async fn create_thread(&self) -> Result<String>;

    /// Post a user message to `thread_id` and wait for the run (no streaming).
    async fn add_message(&self, thread_id: &str, req: &MessageRequest) -> Result<RunResult>;

    /// Submit one batch of tool outputs for a run awaiting action.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<RunResult>;

    /// A short identifier for logs and error messages.
    fn service_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(RunStatus::parse("COMPLETED"), RunStatus::Completed);
        assert_eq!(RunStatus::parse("requires_action"), RunStatus::RequiresAction);
        assert_eq!(RunStatus::parse("REQUIRES-ACTION"), RunStatus::RequiresAction);
        assert_eq!(RunStatus::parse("Failed"), RunStatus::Failed);
        assert_eq!(
            RunStatus::parse("IN_PROGRESS"),
            RunStatus::Other("IN_PROGRESS".into())
        );
    }

    #[test]
    fn content_len_handles_none() {
        assert_eq!(RunResult::failed().content_len(), 0);
        assert_eq!(RunResult::completed("hey").content_len(), 3);
    }
}
