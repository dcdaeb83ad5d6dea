use std::sync::Arc;

use gm_domain::config::Config;

use crate::bootstrap;

/// `grantmap thread`: create a thread and print its id on stdout.
pub async fn create(config: Arc<Config>) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;
    let deps = bootstrap::require_turn_deps(&state)?;
    let thread_id = deps.assistant.create_thread().await?;
    println!("{thread_id}");
    Ok(())
}
