//! Focus recheck watcher
//!
//! Listens for host focus signals and turns each one into a recheck
//! while the funnel is LOCKED. A recheck only re-announces the locked
//! state; it never verifies on its own.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::core::session::{self, Shared};

/// Signals the embedding host can feed into a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// The host window or surface returned to the foreground
    FocusRegained,
}

pub(crate) struct FocusWatcher {
    task: JoinHandle<()>,
}

impl FocusWatcher {
    pub fn spawn(shared: Arc<Shared>, mut signals: broadcast::Receiver<HostSignal>) -> Self {
        let task = tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(HostSignal::FocusRegained) => {
                        session::trigger_recheck(&shared);
                    }
                    // Missed signals collapse into the next one
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Self { task }
    }
}

impl Drop for FocusWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
