//! Thread handle resolution and replacement.

use gm_assistant::AssistantService;
use gm_domain::error::Result;

/// The thread a turn is running against.
///
/// Replacement swaps in a brand-new handle; a replaced handle is never
/// reused within the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadHandle {
    id: String,
    replaced: u32,
}

impl ThreadHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            replaced: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// How many times this turn swapped threads.
    pub fn replacements(&self) -> u32 {
        self.replaced
    }

    pub fn into_id(self) -> String {
        self.id
    }

    /// Create a fresh thread and switch to it.
    ///
    /// On failure the current handle is kept and the error returned.
    pub async fn replace(&mut self, service: &dyn AssistantService) -> Result<()> {
        let fresh = service.create_thread().await?;
        tracing::info!(old = %self.id, new = %fresh, "thread replaced");
        self.id = fresh;
        self.replaced += 1;
        Ok(())
    }
}

/// Reuse the caller's handle, or create a new thread when none (or an
/// empty string) was supplied.
pub async fn resolve_thread(
    service: &dyn AssistantService,
    inbound: Option<&str>,
) -> Result<ThreadHandle> {
    match inbound.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => {
            tracing::debug!(thread_id = %id, "reusing thread");
            Ok(ThreadHandle::new(id))
        }
        None => {
            let id = service.create_thread().await?;
            tracing::info!(thread_id = %id, "created thread");
            Ok(ThreadHandle::new(id))
        }
    }
}
