//! `grantmap run`: one-shot turn for scripting and quick checks.

use std::sync::Arc;

use gm_domain::config::Config;
use gm_domain::MapState;

use crate::bootstrap;
use crate::runtime::{run_turn, TurnRequest, TurnResponse};

pub async fn run(
    config: Arc<Config>,
    message: String,
    thread: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;
    let deps = bootstrap::require_turn_deps(&state)?;

    let req = TurnRequest {
        utterance: message,
        thread_id: thread,
        map_state: MapState::default(),
    };

    let resp = match run_turn(&deps, req).await {
        Ok(r) => r,
        Err(e) => {
            if let Some(id) = e.thread_id() {
                eprintln!("thread: {id}");
            }
            anyhow::bail!(e);
        }
    };

    if json_output {
        let json = serde_json::to_string_pretty(&resp)
            .map_err(|e| anyhow::anyhow!("serializing response: {e}"))?;
        println!("{json}");
    } else {
        print_response(&resp);
    }
    Ok(())
}

/// Message on stdout; actions and the thread handle dimmed on stderr.
pub(crate) fn print_response(resp: &TurnResponse) {
    println!("{}", resp.message);
    for action in &resp.actions {
        let args = serde_json::to_string(action).unwrap_or_default();
        eprintln!("\x1b[2m[action: {args}]\x1b[0m");
    }
    if let Some(id) = &resp.thread_id {
        eprintln!("\x1b[2m[thread: {id}]\x1b[0m");
    }
}
