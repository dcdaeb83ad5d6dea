pub mod chat;
pub mod config;
pub mod run;
pub mod thread;

use clap::{Parser, Subcommand};

/// grantmap: conversational gateway for the grant-targeting map.
#[derive(Debug, Parser)]
#[command(name = "grantmap", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP gateway (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Resolve a single turn and print the reply and map actions.
    Run {
        /// The message to send.
        message: String,
        /// Continue an existing thread.
        #[arg(long)]
        thread: Option<String>,
        /// Output the full response as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat; the thread handle carries over between turns.
    Chat {
        /// Continue an existing thread.
        #[arg(long)]
        thread: Option<String>,
    },
    /// Create a new thread and print its id.
    Thread,
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `GM_CONFIG` (or `config.toml`).
/// A missing file yields the defaults. Returns the config and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(gm_domain::config::Config, String)> {
    let config_path = std::env::var("GM_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        gm_domain::config::Config::default()
    };

    Ok((config, config_path))
}
