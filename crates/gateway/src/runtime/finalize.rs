//! Final message selection.

use gm_domain::Action;

/// Substituted when actions exist but the assistant gave no usable text.
pub const APPLIED_MESSAGE: &str = "I've applied the requested actions to the map.";
/// Substituted when there is neither usable text nor any action.
pub const NOTHING_USABLE_MESSAGE: &str =
    "I'm sorry, I encountered an issue processing your request. Please try again.";
/// Returned when top-level retries are exhausted.
pub const UNAVAILABLE_MESSAGE: &str =
    "I'm sorry, I'm having trouble processing your request right now. Please try again.";

/// Vendor error text the service sometimes passes through as content.
pub const CONTENT_LEAK_MARKERS: [&str; 5] = [
    "LLM API Error",
    "LLM Error",
    "tool_call_id",
    "Invalid parameter",
    "Error code:",
];

pub fn is_leaked_error(content: &str) -> bool {
    CONTENT_LEAK_MARKERS.iter().any(|m| content.contains(m))
}

/// Pick the user-facing message. Never returns an empty string.
pub fn final_message(content: Option<&str>, actions: &[Action]) -> String {
    let mut text = content.unwrap_or_default();
    if is_leaked_error(text) {
        tracing::warn!(len = text.len(), "assistant returned error text as content, scrubbing");
        text = "";
    }

    if !text.trim().is_empty() {
        text.to_string()
    } else if !actions.is_empty() {
        APPLIED_MESSAGE.to_string()
    } else {
        NOTHING_USABLE_MESSAGE.to_string()
    }
}
