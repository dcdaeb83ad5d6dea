//! Recovery from failed runs and corrupted threads.
//!
//! A thread left with dangling tool-call state rejects every further
//! message, so the only way forward is a brand-new thread. Two situations
//! are handled:
//!
//! - **top level**: the first execute-turn failed (status `failed`, or a
//!   transport error carrying a corruption marker) before any tool call.
//!   The thread is replaced and the constrained prompt resubmitted, at most
//!   `turn.max_failed_retries` times.
//! - **mid loop**: a submission failed after actions were collected. The
//!   thread is replaced for the *next* turn only and nothing is retried.

use gm_assistant::{RunResult, RunStatus};
use gm_domain::error::{Error, Result};

use super::prompt;
use super::session::ThreadHandle;
use super::turn::{execute_turn, TurnDeps, TurnError};

/// Transport error text that means the thread is stuck on unanswered tool
/// calls.
pub const CORRUPTION_MARKERS: [&str; 3] = ["tool_call_id", "tool_calls", "Invalid parameter"];

pub fn is_corrupted_session(err: &Error) -> bool {
    let text = err.to_string();
    CORRUPTION_MARKERS.iter().any(|m| text.contains(m))
}

/// Outcome of the top-level recovery step.
#[derive(Debug)]
pub enum TopLevel {
    /// A usable (non-failed) run result, possibly from a retry.
    Ready(RunResult),
    /// Retries ran out, or the service errored while retrying.
    Exhausted { attempts: u32 },
}

/// Inspect the first execute-turn outcome and retry on fresh threads when
/// it failed.
///
/// Errors without a corruption marker are fatal and returned as
/// [`TurnError::Remote`].
pub async fn recover_top_level(
    deps: &TurnDeps,
    thread: &mut ThreadHandle,
    enriched: &str,
    first: Result<RunResult>,
) -> std::result::Result<TopLevel, TurnError> {
    match first {
        Ok(run) if run.status != RunStatus::Failed => return Ok(TopLevel::Ready(run)),
        Ok(_) => tracing::warn!(thread_id = %thread.id(), "run failed before any tool call"),
        Err(e) if is_corrupted_session(&e) => {
            tracing::warn!(thread_id = %thread.id(), error = %e, "thread is corrupted")
        }
        Err(source) => {
            return Err(TurnError::Remote {
                thread_id: Some(thread.id().to_string()),
                source,
            })
        }
    }

    let retry_prompt = prompt::build_recovery_prompt(enriched);
    let mut attempts = 0;

    while attempts < deps.limits.max_failed_retries {
        attempts += 1;
        tracing::warn!(attempt = attempts, "retrying turn on a fresh thread");

        if let Err(e) = thread.replace(deps.assistant.as_ref()).await {
            tracing::warn!(attempt = attempts, error = %e, "thread replacement failed");
            break;
        }

        match execute_turn(deps, thread.id(), &retry_prompt).await {
            Ok(run) if run.status != RunStatus::Failed => {
                tracing::info!(
                    attempt = attempts,
                    status = %run.status,
                    content_len = run.content_len(),
                    "retry succeeded"
                );
                return Ok(TopLevel::Ready(run));
            }
            Ok(_) => tracing::warn!(attempt = attempts, "retry run failed"),
            Err(e) => {
                tracing::warn!(attempt = attempts, error = %e, "retry errored");
                break;
            }
        }
    }

    tracing::error!(attempts, thread_id = %thread.id(), "run still failing after retries");
    Ok(TopLevel::Exhausted { attempts })
}

/// Swap the thread after a mid-loop failure so the client does not reuse
/// the broken one. Failure to create a thread keeps the old handle.
pub async fn replace_after_failure(deps: &TurnDeps, thread: &mut ThreadHandle) {
    if let Err(e) = thread.replace(deps.assistant.as_ref()).await {
        tracing::warn!(
            thread_id = %thread.id(),
            error = %e,
            "could not replace corrupted thread, keeping it"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corruption_markers_are_detected() {
        let e = Error::Provider {
            provider: "backboard".into(),
            message: "HTTP 400 - Invalid parameter: messages with role 'tool'".into(),
        };
        assert!(is_corrupted_session(&e));
        assert!(is_corrupted_session(&Error::Other(
            "an assistant message with 'tool_calls' must be followed by tool messages".into()
        )));
    }

    #[test]
    fn plain_transport_errors_are_not_corruption() {
        assert!(!is_corrupted_session(&Error::Http("connection refused".into())));
        assert!(!is_corrupted_session(&Error::Timeout("60s elapsed".into())));
    }
}
