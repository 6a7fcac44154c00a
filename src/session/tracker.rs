//! Background task reacting to host debugger lifecycle signals.
//!
//! Consumes [`DebugEvent`]s from the host: process creation registers a
//! session record and freezes resurrection, engine load-complete
//! attributes the engine to its process, and the return to design mode
//! persists the session set and unfreezes. Events are handled one at a
//! time so session-set mutations never race, and the host's delivery
//! context is decoupled from persistence by the channel in between.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::host::{DebugEvent, DebuggerHost, Severity};
use crate::models::short_name;

use super::store::RecordStore;

/// Builder for the lifecycle-signal tracker task.
pub struct SessionTracker {
    store: Arc<RecordStore>,
    host: Arc<dyn DebuggerHost>,
    events: mpsc::Receiver<DebugEvent>,
    cancel: CancellationToken,
    ignored_suffixes: Vec<String>,
}

impl SessionTracker {
    /// Construct a tracker (does not start the task yet).
    #[must_use]
    pub fn new(
        store: Arc<RecordStore>,
        host: Arc<dyn DebuggerHost>,
        events: mpsc::Receiver<DebugEvent>,
        cancel: CancellationToken,
        ignored_suffixes: Vec<String>,
    ) -> Self {
        Self {
            store,
            host,
            events,
            cancel,
            ignored_suffixes,
        }
    }

    /// Spawn the event loop and return a handle for shutting it down.
    #[must_use]
    pub fn spawn(self) -> SessionTrackerHandle {
        let cancel = self.cancel.clone();
        let join_handle = tokio::spawn(self.run());
        SessionTrackerHandle {
            cancel,
            join_handle: Some(join_handle),
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("session tracker cancelled");
                    return;
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        debug!("debug event channel closed; session tracker stopping");
                        return;
                    };
                    self.handle(event).await;
                }
            }
        }
    }

    async fn handle(&self, event: DebugEvent) {
        match event {
            DebugEvent::ProcessCreated { path } => {
                if self.is_placeholder(&path) {
                    debug!(path, "placeholder host process ignored");
                    return;
                }
                if self.store.track_process(&path) {
                    self.store.freeze();
                    info!(path, "debug target recorded; resurrection frozen");
                }
            }
            DebugEvent::EngineLoaded { path, engine_id } => {
                self.store.track_engine(&path, engine_id);
            }
            DebugEvent::DesignModeEntered => match self.store.persist().await {
                Ok(()) => {
                    self.store.unfreeze();
                    info!("design mode entered; session records persisted");
                }
                Err(err) => {
                    // Session data stays in memory and the freeze flag
                    // stays set; the next design-mode signal retries.
                    warn!(%err, "failed to persist session records");
                    self.host
                        .notify(
                            &format!("Could not store debug targets for later resurrection: {err}"),
                            Severity::Error,
                        )
                        .await;
                }
            },
        }
    }

    fn is_placeholder(&self, path: &str) -> bool {
        let name = short_name(path).to_lowercase();
        self.ignored_suffixes
            .iter()
            .any(|suffix| name.ends_with(&suffix.to_lowercase()))
    }
}

/// Handle returned from [`SessionTracker::spawn`].
pub struct SessionTrackerHandle {
    cancel: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl SessionTrackerHandle {
    /// Signal the tracker to stop and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for SessionTrackerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
