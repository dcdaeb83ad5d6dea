//! The tool-call round loop.
//!
//! Every pending call in a round is acknowledged, all outputs go back in a
//! single submission, and the next run result replaces the current one.
//! Calls naming a client-facing tool are also recorded as [`Action`]s;
//! service-internal tools are acknowledged only.

use gm_assistant::{RunResult, RunStatus};
use gm_domain::tool::{ToolCall, ToolOutput};
use gm_domain::{Action, ActionKind};

use super::recovery;
use super::session::ThreadHandle;
use super::turn::TurnDeps;

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEnd {
    /// No tool calls pending.
    Completed,
    /// Calls were listed but the run is no longer awaiting action.
    NotAwaitingAction,
    /// `max_tool_rounds` submissions made and calls still pending.
    RoundLimit,
    /// The service reported `failed` after a submission.
    RunFailed,
    /// The submission call itself errored.
    SubmitFailed,
    /// Awaiting action, but without a run id to submit against. The round
    /// is still collected and the thread replaced.
    MissingRunId,
}

#[derive(Debug)]
pub struct RoundOutcome {
    /// Collected actions, in call order.
    pub actions: Vec<Action>,
    /// Assistant text from the last result, if any.
    pub content: Option<String>,
    /// Submissions made.
    pub rounds: u32,
    pub end: LoopEnd,
}

/// Whether a result may be answered with tool outputs. An absent status
/// is given the benefit of the doubt.
fn awaiting_action(status: &RunStatus) -> bool {
    match status {
        RunStatus::RequiresAction => true,
        RunStatus::Other(s) => s.is_empty(),
        _ => false,
    }
}

/// Acknowledge one round of calls, recording client-facing ones.
pub fn collect_round(calls: &[ToolCall], actions: &mut Vec<Action>) -> Vec<ToolOutput> {
    calls
        .iter()
        .map(|tc| {
            match ActionKind::from_tool_name(&tc.tool_name) {
                Some(kind) => {
                    tracing::info!(tool = %tc.tool_name, args = %tc.arguments, "tool call");
                    actions.push(Action::from_tool_arguments(kind, &tc.arguments));
                }
                None => {
                    tracing::debug!(tool = %tc.tool_name, "service-internal tool call, acknowledging only");
                }
            }
            tc.acknowledge()
        })
        .collect()
}

/// Drive submissions until the run settles, fails, or the round budget is
/// spent. Never returns an error: every exit finalizes with what was
/// collected.
pub async fn run_tool_rounds(
    deps: &TurnDeps,
    thread: &mut ThreadHandle,
    mut run: RunResult,
) -> RoundOutcome {
    let mut actions = Vec::new();
    let mut rounds = 0u32;

    let end = loop {
        if run.tool_calls.is_empty() {
            break LoopEnd::Completed;
        }
        if !awaiting_action(&run.status) {
            tracing::info!(status = %run.status, "run not awaiting action, nothing to submit");
            break LoopEnd::NotAwaitingAction;
        }
        if rounds >= deps.limits.max_tool_rounds {
            tracing::warn!(
                rounds,
                pending = run.tool_calls.len(),
                "tool round limit reached, finalizing with collected actions"
            );
            break LoopEnd::RoundLimit;
        }
        let Some(run_id) = run.run_id.clone() else {
            // The calls stay unanswered on this thread, so it is abandoned
            // like a failed submission.
            tracing::warn!("run awaiting action has no run id, cannot submit");
            collect_round(&run.tool_calls, &mut actions);
            recovery::replace_after_failure(deps, thread).await;
            run.content = None;
            break LoopEnd::MissingRunId;
        };

        rounds += 1;
        tracing::info!(round = rounds, calls = run.tool_calls.len(), "processing tool round");
        let outputs = collect_round(&run.tool_calls, &mut actions);

        match deps
            .assistant
            .submit_tool_outputs(thread.id(), &run_id, &outputs)
            .await
        {
            Ok(next) => run = next,
            Err(e) => {
                tracing::warn!(round = rounds, error = %e, "submitting tool outputs failed");
                recovery::replace_after_failure(deps, thread).await;
                run.content = None;
                break LoopEnd::SubmitFailed;
            }
        }

        tracing::info!(
            round = rounds,
            status = %run.status,
            calls = run.tool_calls.len(),
            content_len = run.content_len(),
            "after submission"
        );

        if run.status == RunStatus::Failed {
            tracing::warn!(round = rounds, "run failed after submission, replacing thread");
            recovery::replace_after_failure(deps, thread).await;
            break LoopEnd::RunFailed;
        }
    };

    RoundOutcome {
        actions,
        content: run.content,
        rounds,
        end,
    }
}
