//! Per-thread concurrency control.
//!
//! The assistant service serializes runs on a thread, and a second message
//! posted while a run is awaiting tool outputs corrupts the thread. Turns
//! that name the same thread therefore run one at a time; a waiter gives up
//! after a bounded wait.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Maps each thread handle to a `Semaphore(1)`.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
    wait: Duration,
}

impl SessionLockMap {
    pub fn new(wait: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            wait,
        }
    }

    /// Acquire the run lock for `thread_id`.
    ///
    /// The permit releases on drop. Fails with [`SessionBusy`] when the
    /// current holder does not finish within the configured wait.
    pub async fn acquire(&self, thread_id: &str) -> Result<OwnedSemaphorePermit, SessionBusy> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(thread_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        if let Ok(permit) = sem.clone().try_acquire_owned() {
            return Ok(permit);
        }

        tracing::debug!(thread_id, "thread busy, waiting for in-flight turn");
        match tokio::time::timeout(self.wait, sem.acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) | Err(_) => Err(SessionBusy),
        }
    }

    /// Number of tracked threads.
    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop entries nobody holds or waits on.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| Arc::strong_count(sem) > 1 || sem.available_permits() == 0);
    }
}

/// A turn is already running on this thread.
#[derive(Debug, thiserror::Error)]
#[error("thread is busy: a turn is already in progress")]
pub struct SessionBusy;
