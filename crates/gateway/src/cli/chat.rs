//! `grantmap chat`: interactive REPL.
//!
//! Behaves like the map client: the thread handle returned by each turn is
//! used for the next one, and applied actions are folded into a local map
//! state that is sent along with every message.

use std::sync::Arc;

use gm_domain::config::Config;
use gm_domain::{Action, ActionKind, MapState};

use crate::bootstrap;
use crate::runtime::{run_turn, TurnDeps, TurnRequest};

use super::run::print_response;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(config: Arc<Config>, mut thread: Option<String>) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;
    let deps = bootstrap::require_turn_deps(&state)?;

    let mut rl = rustyline::DefaultEditor::new()?;
    let mut map_state = MapState::default();

    eprintln!("grantmap interactive chat");
    eprintln!(
        "Thread: {}  |  Type /help for commands, Ctrl+D to exit",
        thread.as_deref().unwrap_or("(new)")
    );
    eprintln!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                // ── Slash commands ────────────────────────────────
                if trimmed.starts_with('/') {
                    if handle_slash_command(trimmed, &mut thread, &mut map_state) {
                        break;
                    }
                    continue;
                }

                // ── User message → turn ──────────────────────────
                if let Err(e) = send_message(&deps, &mut thread, &mut map_state, trimmed).await {
                    eprintln!("\x1B[31merror: {e}\x1B[0m");
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process a slash command. Returns `true` if the REPL should exit.
fn handle_slash_command(
    input: &str,
    thread: &mut Option<String>,
    map_state: &mut MapState,
) -> bool {
    let (cmd, arg) = match input.split_once(' ') {
        Some((c, a)) => (c, Some(a.trim())),
        None => (input, None),
    };

    match cmd {
        "/exit" | "/quit" => return true,

        "/thread" => match arg.filter(|s| !s.is_empty()) {
            Some(id) => {
                *thread = Some(id.to_string());
                eprintln!("Thread switched to: {id}");
            }
            None => {
                eprintln!("Current thread: {}", thread.as_deref().unwrap_or("(none)"));
                eprintln!("Usage: /thread <id>");
            }
        },

        "/new" => {
            *thread = None;
            eprintln!("Next message starts a new thread.");
        }

        "/state" => match toml::to_string_pretty(&*map_state) {
            Ok(s) => eprint!("{s}"),
            Err(e) => eprintln!("cannot render map state: {e}"),
        },

        "/reset" => {
            *map_state = MapState::default();
            eprintln!("Map state reset to defaults.");
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /thread <id>     Continue a specific thread");
            eprintln!("  /new             Start a new thread on the next message");
            eprintln!("  /state           Show the simulated map state");
            eprintln!("  /reset           Reset the simulated map state");
            eprintln!("  /exit, /quit     Exit the chat");
            eprintln!("  /help            Show this help");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    false
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn + local state tracking
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn send_message(
    deps: &TurnDeps,
    thread: &mut Option<String>,
    map_state: &mut MapState,
    message: &str,
) -> anyhow::Result<()> {
    let req = TurnRequest {
        utterance: message.to_string(),
        thread_id: thread.clone(),
        map_state: map_state.clone(),
    };

    match run_turn(deps, req).await {
        Ok(resp) => {
            print_response(&resp);
            println!();
            for action in &resp.actions {
                apply_action(map_state, action);
            }
            if resp.thread_id.is_some() {
                *thread = resp.thread_id;
            }
            Ok(())
        }
        Err(e) => {
            if let Some(id) = e.thread_id() {
                *thread = Some(id.to_string());
            }
            Err(e.into())
        }
    }
}

/// Fold an action into the map state the way the map client does: unset
/// fields leave the state unchanged.
pub(crate) fn apply_action(ms: &mut MapState, action: &Action) {
    match action.kind {
        ActionKind::HighlightSettlement | ActionKind::ZoomToSettlement => {
            if let Some(s) = &action.settlement {
                ms.settlement = s.clone();
            }
        }
        ActionKind::ShowBuildingPoints => {
            if let Some(v) = action.visible {
                ms.show_buildings = v;
            }
        }
        ActionKind::ApplyFilters => {
            if let Some(v) = action.size_eligible_only {
                ms.size_eligible_only = v;
            }
            if let Some(t) = &action.building_type {
                ms.building_type = t.clone();
            }
            if let Some(t) = &action.storey_tier {
                ms.storey_tier = t.clone();
            }
            if let Some(v) = action.min_coverage {
                ms.min_coverage = v;
            }
            if let Some(v) = action.min_buildings {
                ms.min_buildings = v;
            }
        }
    }
}
