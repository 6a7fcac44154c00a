//! Display-only status refresh loop.
//!
//! Re-reads the historic set and the freeze flag on a fixed interval and
//! pushes a rendered one-liner to the host's command UI. Reads are
//! non-authoritative; a stale line is corrected on the next tick.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::host::DebuggerHost;
use crate::models::{AttachRecord, RecordSet};
use crate::orchestrator::resolve_engine_names;
use crate::session::RecordStore;

/// Maximum rendered length of the process listing before truncation.
const STATUS_WIDTH: usize = 50;

/// Builder for the status refresh task.
pub struct StatusRefresher {
    store: Arc<RecordStore>,
    host: Arc<dyn DebuggerHost>,
    interval: Duration,
    cancel: CancellationToken,
}

impl StatusRefresher {
    /// Construct a refresher (does not start the task yet).
    #[must_use]
    pub fn new(
        store: Arc<RecordStore>,
        host: Arc<dyn DebuggerHost>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            host,
            interval,
            cancel,
        }
    }

    /// Spawn the refresh loop and return its handle.
    #[must_use]
    pub fn spawn(self) -> StatusRefresherHandle {
        let cancel = self.cancel.clone();
        let join_handle = tokio::spawn(self.run());
        StatusRefresherHandle {
            cancel,
            join_handle: Some(join_handle),
        }
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        // The engine catalog changes only when the host does; cache it
        // after the first successful fetch.
        let mut catalog: Option<HashMap<Uuid, String>> = None;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("status refresher cancelled");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let historic = self.store.historic_snapshot();
            if catalog.is_none() && !historic.is_empty() {
                if let Ok(engines) = self.host.known_engines().await {
                    catalog = Some(engines.into_iter().map(|e| (e.id, e.name)).collect());
                }
            }

            let text = render_status(&historic, catalog.as_ref());
            let enabled = !self.store.is_frozen() && !historic.is_empty();
            self.host.update_status(&text, enabled).await;
        }
    }
}

/// Render the command status line, e.g.
/// `Resurrect: server.exe, worker.exe / Native, Managed`.
#[must_use]
pub fn render_status(historic: &RecordSet, catalog: Option<&HashMap<Uuid, String>>) -> String {
    if historic.is_empty() {
        return "Resurrect: (no targets yet)".into();
    }

    let mut processes = historic
        .values()
        .map(AttachRecord::short_name)
        .collect::<Vec<_>>()
        .join(", ");
    if processes.chars().count() > STATUS_WIDTH {
        processes = format!(
            "{}\u{2026}",
            processes.chars().take(STATUS_WIDTH).collect::<String>()
        );
    }

    let ids: Vec<Uuid> = historic
        .values()
        .flat_map(|record| record.engines.iter().copied())
        .collect();
    if ids.is_empty() {
        return format!("Resurrect: {processes}");
    }

    let empty = HashMap::new();
    let names = resolve_engine_names(catalog.unwrap_or(&empty), &ids);
    let mut seen = Vec::new();
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    format!("Resurrect: {processes} / {}", seen.join(", "))
}

/// Handle returned from [`StatusRefresher::spawn`].
pub struct StatusRefresherHandle {
    cancel: CancellationToken,
    join_handle: Option<JoinHandle<()>>,
}

impl StatusRefresherHandle {
    /// Signal the refresher to stop and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StatusRefresherHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
