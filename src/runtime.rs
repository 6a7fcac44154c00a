//! One-shot wiring of the resurrection core.
//!
//! One store, one tracker, one orchestrator per host session,
//! constructed here and shared by `Arc`. The embedder feeds host
//! signals into the returned channel senders and calls
//! [`ResurrectRuntime::shutdown`] to release everything.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::GlobalConfig;
use crate::host::{DebugEvent, DebuggerHost, ProcessStartEvent};
use crate::orchestrator::AttachOrchestrator;
use crate::persistence::db::Database;
use crate::persistence::HistoryRepo;
use crate::session::{RecordStore, SessionTracker, SessionTrackerHandle};
use crate::status::{StatusRefresher, StatusRefresherHandle};
use crate::watcher::{AutoAttachHandle, AutoAttachWatcher};

/// Capacity of the host signal channels. Lifecycle signals are rare;
/// the buffer only has to absorb short bursts (processes starting
/// back-to-back) so the host's delivery thread never blocks.
const SIGNAL_BUFFER: usize = 64;

/// Senders the embedder uses to deliver host signals into the core.
///
/// This is the handler-registration seam: dropping both senders (or
/// calling [`ResurrectRuntime::shutdown`]) unsubscribes the core.
pub struct SignalSenders {
    /// Debugger lifecycle signals (process created, engine loaded,
    /// design mode entered).
    pub debug_events: mpsc::Sender<DebugEvent>,
    /// OS-level process-start notifications for the auto-attach watcher.
    pub process_starts: mpsc::Sender<ProcessStartEvent>,
}

/// Running resurrection core: shared state plus the spawned background
/// tasks (tracker, auto-attach watcher, status refresher).
pub struct ResurrectRuntime {
    store: Arc<RecordStore>,
    orchestrator: Arc<AttachOrchestrator>,
    tracker: SessionTrackerHandle,
    auto_attach: AutoAttachHandle,
    status: StatusRefresherHandle,
    cancel: CancellationToken,
}

impl ResurrectRuntime {
    /// Build the core, load historic records for the host's current
    /// workspace, and spawn the background tasks.
    pub async fn start(
        config: &GlobalConfig,
        host: Arc<dyn DebuggerHost>,
        db: Database,
    ) -> (Self, SignalSenders) {
        let store = Arc::new(RecordStore::new(HistoryRepo::new(db)));
        store.open_workspace(&host.workspace_key()).await;

        let orchestrator = Arc::new(AttachOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&host),
        ));

        let cancel = CancellationToken::new();
        let (debug_tx, debug_rx) = mpsc::channel(SIGNAL_BUFFER);
        let (start_tx, start_rx) = mpsc::channel(SIGNAL_BUFFER);

        let tracker = SessionTracker::new(
            Arc::clone(&store),
            Arc::clone(&host),
            debug_rx,
            cancel.child_token(),
            config.ignored_process_suffixes.clone(),
        )
        .spawn();

        let auto_attach = AutoAttachWatcher::new(
            Arc::clone(&orchestrator),
            Arc::clone(&store),
            start_rx,
            cancel.child_token(),
            config.auto_attach,
        )
        .spawn();

        let status = StatusRefresher::new(
            Arc::clone(&store),
            Arc::clone(&host),
            Duration::from_millis(config.status_refresh_ms),
            cancel.child_token(),
        )
        .spawn();

        info!(auto_attach = config.auto_attach, "resurrection core started");

        let runtime = Self {
            store,
            orchestrator,
            tracker,
            auto_attach,
            status,
            cancel,
        };
        let senders = SignalSenders {
            debug_events: debug_tx,
            process_starts: start_tx,
        };
        (runtime, senders)
    }

    /// The reattachment orchestrator, for wiring the manual
    /// "resurrect" command.
    #[must_use]
    pub fn orchestrator(&self) -> Arc<AttachOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    /// The shared record store (freeze flag, record snapshots).
    #[must_use]
    pub fn store(&self) -> Arc<RecordStore> {
        Arc::clone(&self.store)
    }

    /// Control handle for the auto-attach watcher (toggle command).
    #[must_use]
    pub fn auto_attach(&self) -> &AutoAttachHandle {
        &self.auto_attach
    }

    /// Reload historic records after the host switched workspaces.
    pub async fn workspace_opened(&self, key: &str) {
        self.store.open_workspace(key).await;
    }

    /// Drop historic state when the host closes its workspace.
    pub fn workspace_closed(&self) {
        self.store.close_workspace();
    }

    /// Stop all background tasks and wait for them to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.tracker.shutdown().await;
        self.auto_attach.shutdown().await;
        self.status.shutdown().await;
        info!("resurrection core stopped");
    }
}
