use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn orchestration limits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnConfig {
    /// Tool-output submissions per turn before the loop gives up and
    /// finalizes with what it has collected.
    #[serde(default = "d_5")]
    pub max_tool_rounds: u32,
    /// Fresh-thread retries after the service reports a failed run (or a
    /// corrupted thread) before any tool call was made.
    #[serde(default = "d_2")]
    pub max_failed_retries: u32,
    /// How long a turn waits for another in-flight turn on the same thread
    /// before answering "busy".
    #[serde(default = "d_30000u")]
    pub lock_wait_ms: u64,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 5,
            max_failed_retries: 2,
            lock_wait_ms: 30_000,
        }
    }
}

fn d_5() -> u32 {
    5
}
fn d_2() -> u32 {
    2
}
fn d_30000u() -> u64 {
    30_000
}
