//! Turn orchestration: one user utterance in, one message plus a list of
//! map actions out.
//!
//! Entry point: [`run_turn`]. The flow is strictly sequential and at most
//! one assistant call is outstanding at any time:
//!
//! 1. local intent short-circuit (no remote call at all)
//! 2. thread resolution
//! 3. enriched execute-turn, with top-level recovery
//! 4. tool-call round loop
//! 5. augmentation, dedupe, message finalization
//!
//! Dropping the returned future aborts any in-flight request; nothing is
//! surfaced that did not pass through finalization.

use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use gm_assistant::{AssistantService, MessageRequest, RunResult};
use gm_domain::config::{AssistantConfig, TurnConfig};
use gm_domain::error::{Error, Result};
use gm_domain::{Action, MapState};

use super::recovery::{self, TopLevel};
use super::rounds::{self, LoopEnd};
use super::{augment, finalize, intent, prompt, session};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn parameters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything a turn needs besides its input.
#[derive(Clone)]
pub struct TurnDeps {
    pub assistant: Arc<dyn AssistantService>,
    /// Model routing sent with every message.
    pub model: ModelSelection,
    pub limits: TurnConfig,
}

/// Which upstream model the assistant service should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub llm_provider: String,
    pub model_name: String,
    pub memory: String,
}

impl From<&AssistantConfig> for ModelSelection {
    fn from(cfg: &AssistantConfig) -> Self {
        Self {
            llm_provider: cfg.llm_provider.clone(),
            model_name: cfg.model_name.clone(),
            memory: cfg.memory.clone(),
        }
    }
}

impl TurnDeps {
    pub fn new(
        assistant: Arc<dyn AssistantService>,
        assistant_cfg: &AssistantConfig,
        limits: TurnConfig,
    ) -> Self {
        Self {
            assistant,
            model: ModelSelection::from(assistant_cfg),
            limits,
        }
    }
}

/// Input to a single turn.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    pub utterance: String,
    /// Thread to continue. `None` (or empty) starts a new one if needed.
    pub thread_id: Option<String>,
    pub map_state: MapState,
}

/// Result of a single turn. `message` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResponse {
    pub message: String,
    /// The handle the client should use next time. `None` only for a
    /// locally answered turn that arrived without one.
    pub thread_id: Option<String>,
    pub actions: Vec<Action>,
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The assistant service failed in a way recovery does not cover.
    #[error("assistant service error: {source}")]
    Remote {
        /// Any thread handle in play when the error happened.
        thread_id: Option<String>,
        #[source]
        source: Error,
    },
}

impl TurnError {
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            TurnError::Remote { thread_id, .. } => thread_id.as_deref(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// execute-turn
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Send one prompt to `thread_id` and wait for the run result.
pub async fn execute_turn(deps: &TurnDeps, thread_id: &str, content: &str) -> Result<RunResult> {
    let req = MessageRequest {
        content: content.to_string(),
        llm_provider: deps.model.llm_provider.clone(),
        model_name: deps.model.model_name.clone(),
        memory: deps.model.memory.clone(),
    };
    let run = deps.assistant.add_message(thread_id, &req).await?;
    tracing::info!(
        service = deps.assistant.service_id(),
        status = %run.status,
        calls = run.tool_calls.len(),
        content_len = run.content_len(),
        "assistant response"
    );
    Ok(run)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// run_turn
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Answer a mechanical command without the remote service. The inbound
/// handle is echoed as-is and never locked, created or replaced.
pub fn resolve_local_turn(req: &TurnRequest) -> Option<TurnResponse> {
    let local = intent::resolve_local(&req.utterance)?;
    tracing::info!(actions = local.actions.len(), "resolved locally");
    Some(TurnResponse {
        message: local.message,
        thread_id: req.thread_id.clone(),
        actions: local.actions,
    })
}

/// Resolve one user turn.
pub async fn run_turn(deps: &TurnDeps, req: TurnRequest) -> std::result::Result<TurnResponse, TurnError> {
    let turn_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "turn",
        %turn_id,
        thread_id = tracing::field::Empty,
        "otel.kind" = "SERVER",
    );
    run_turn_inner(deps, req).instrument(span).await
}

async fn run_turn_inner(
    deps: &TurnDeps,
    req: TurnRequest,
) -> std::result::Result<TurnResponse, TurnError> {
    // ── Local short-circuit ──────────────────────────────────────────
    if let Some(resp) = resolve_local_turn(&req) {
        return Ok(resp);
    }

    // ── Thread ───────────────────────────────────────────────────────
    let mut thread = session::resolve_thread(deps.assistant.as_ref(), req.thread_id.as_deref())
        .await
        .map_err(|source| TurnError::Remote {
            thread_id: None,
            source,
        })?;
    tracing::Span::current().record("thread_id", thread.id());

    // ── Execute + top-level recovery ─────────────────────────────────
    let enriched = prompt::build_enriched_prompt(&req.map_state, &req.utterance);
    let first = execute_turn(deps, thread.id(), &enriched).await;

    let run = match recovery::recover_top_level(deps, &mut thread, &enriched, first).await? {
        TopLevel::Ready(run) => run,
        TopLevel::Exhausted { .. } => {
            return Ok(TurnResponse {
                message: finalize::UNAVAILABLE_MESSAGE.to_string(),
                thread_id: Some(thread.into_id()),
                actions: Vec::new(),
            });
        }
    };

    // ── Tool rounds ──────────────────────────────────────────────────
    let outcome = rounds::run_tool_rounds(deps, &mut thread, run).await;
    if outcome.end != LoopEnd::Completed {
        tracing::debug!(end = ?outcome.end, rounds = outcome.rounds, "round loop ended early");
    }

    // ── Augment + finalize ───────────────────────────────────────────
    let actions = augment::augment(&req.utterance, outcome.actions);
    let message = finalize::final_message(outcome.content.as_deref(), &actions);

    tracing::info!(
        actions = actions.len(),
        rounds = outcome.rounds,
        replacements = thread.replacements(),
        "turn complete"
    );

    Ok(TurnResponse {
        message,
        thread_id: Some(thread.into_id()),
        actions,
    })
}
