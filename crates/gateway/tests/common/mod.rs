//! Scripted in-memory assistant service shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use gm_assistant::{AssistantService, MessageRequest, RunResult};
use gm_domain::config::{AssistantConfig, TurnConfig};
use gm_domain::error::{Error, Result};
use gm_domain::tool::{ToolCall, ToolOutput};
use gm_gateway::runtime::TurnDeps;

/// Every call the turn made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateThread,
    AddMessage { thread_id: String, content: String },
    Submit { thread_id: String, run_id: String, outputs: Vec<(String, Value)> },
}

/// Answers come from per-endpoint queues. An empty `create_thread` queue
/// hands out `thr_1`, `thr_2`, ...; empty message / submit queues answer
/// with an error so an unexpected call fails loudly.
#[derive(Default)]
pub struct ScriptedAssistant {
    threads: Mutex<VecDeque<Result<String>>>,
    messages: Mutex<VecDeque<Result<RunResult>>>,
    submits: Mutex<VecDeque<Result<RunResult>>>,
    created: Mutex<u32>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedAssistant {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_create_thread(&self, r: Result<String>) -> &Self {
        self.threads.lock().push_back(r);
        self
    }

    pub fn on_message(&self, r: Result<RunResult>) -> &Self {
        self.messages.lock().push_back(r);
        self
    }

    pub fn on_submit(&self, r: Result<RunResult>) -> &Self {
        self.submits.lock().push_back(r);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait::async_trait]
impl AssistantService for ScriptedAssistant {
    async fn create_thread(&self) -> Result<String> {
        self.calls.lock().push(Call::CreateThread);
        if let Some(r) = self.threads.lock().pop_front() {
            return r;
        }
        let mut n = self.created.lock();
        *n += 1;
        Ok(format!("thr_{}", *n))
    }

    async fn add_message(&self, thread_id: &str, req: &MessageRequest) -> Result<RunResult> {
        self.calls.lock().push(Call::AddMessage {
            thread_id: thread_id.to_string(),
            content: req.content.clone(),
        });
        self.messages
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("unscripted add_message".into())))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<RunResult> {
        let decoded = outputs
            .iter()
            .map(|o| {
                let v: Value = serde_json::from_str(&o.output).unwrap_or(Value::Null);
                (o.tool_call_id.clone(), v)
            })
            .collect();
        self.calls.lock().push(Call::Submit {
            thread_id: thread_id.to_string(),
            run_id: run_id.to_string(),
            outputs: decoded,
        });
        self.submits
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("unscripted submit_tool_outputs".into())))
    }

    fn service_id(&self) -> &str {
        "scripted"
    }
}

pub fn deps(assistant: Arc<ScriptedAssistant>) -> TurnDeps {
    TurnDeps::new(assistant, &AssistantConfig::default(), TurnConfig::default())
}

pub fn call(id: &str, tool: &str, args: Value) -> ToolCall {
    ToolCall::new(id, tool, args)
}

pub fn requires(run_id: &str, calls: Vec<ToolCall>) -> Result<RunResult> {
    Ok(RunResult::requires_action(run_id, calls))
}

pub fn completed(text: &str) -> Result<RunResult> {
    Ok(RunResult::completed(text))
}

pub fn failed() -> Result<RunResult> {
    Ok(RunResult::failed())
}
