//! Auto-attach watcher.
//!
//! Background task over OS-level process-start notifications. When a
//! newly started process matches a historic record by short file name,
//! the orchestrator is invoked for that single process — the same
//! reconciliation and confirmation path as a manual resurrection.
//!
//! Events are ignored while the watcher is disabled, while resurrection
//! is frozen, or while the historic set is empty.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::host::ProcessStartEvent;
use crate::orchestrator::AttachOrchestrator;
use crate::session::RecordStore;

/// Builder for the auto-attach watcher task.
pub struct AutoAttachWatcher {
    orchestrator: Arc<AttachOrchestrator>,
    store: Arc<RecordStore>,
    events: mpsc::Receiver<ProcessStartEvent>,
    cancel: CancellationToken,
    enabled: Arc<AtomicBool>,
}

impl AutoAttachWatcher {
    /// Construct a watcher (does not start the task yet).
    #[must_use]
    pub fn new(
        orchestrator: Arc<AttachOrchestrator>,
        store: Arc<RecordStore>,
        events: mpsc::Receiver<ProcessStartEvent>,
        cancel: CancellationToken,
        enabled: bool,
    ) -> Self {
        Self {
            orchestrator,
            store,
            events,
            cancel,
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Spawn the watcher loop and return its control handle.
    #[must_use]
    pub fn spawn(self) -> AutoAttachHandle {
        let cancel = self.cancel.clone();
        let enabled = Arc::clone(&self.enabled);
        let join_handle = tokio::spawn(self.run());
        AutoAttachHandle {
            cancel,
            enabled,
            join_handle: Some(join_handle),
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("auto-attach watcher cancelled");
                    return;
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        debug!("process-start channel closed; auto-attach watcher stopping");
                        return;
                    };
                    self.handle(event).await;
                }
            }
        }
    }

    async fn handle(&self, event: ProcessStartEvent) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        if self.store.is_frozen() {
            debug!(path = event.path, "process start ignored: frozen");
            return;
        }
        if !self.store.has_historic() {
            return;
        }
        if !self.store.historic_matches_short_name(&event.path) {
            return;
        }

        info!(path = event.path, "recorded process started; auto-attaching");
        match self.orchestrator.resurrect_one(&event.path).await {
            Ok(outcome) => debug!(path = event.path, ?outcome, "auto-attach pass finished"),
            Err(err) => warn!(path = event.path, %err, "auto-attach pass failed"),
        }
    }
}

/// Handle returned from [`AutoAttachWatcher::spawn`].
pub struct AutoAttachHandle {
    cancel: CancellationToken,
    enabled: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl AutoAttachHandle {
    /// Enable auto-attach.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Disable auto-attach; events are ignored until re-enabled.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Whether auto-attach is currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Signal the watcher to stop and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for AutoAttachHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
