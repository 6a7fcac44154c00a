//! Reattachment orchestration.
//!
//! Reconciles historic attach records against the processes the host can
//! currently see, asks the user how to proceed when some targets are
//! gone, and issues one attach request per surviving process with
//! per-process failure isolation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::host::{DebuggerHost, EngineInfo, ProcessInfo, Severity};
use crate::models::{normalize_path, short_name, AttachRecord};
use crate::session::RecordStore;
use crate::{AppError, Result};

/// Structured result of a resurrection pass.
///
/// "Some attaches failed" is data, not an error: only total inability to
/// communicate with the host surfaces as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResurrectOutcome {
    /// A debug session is running; no attach may be issued now.
    Frozen,
    /// No historic process is currently alive (informational).
    NothingToResurrect,
    /// The user declined to continue without the missing processes.
    /// Silent all-or-nothing abort; zero attaches were attempted.
    Declined,
    /// Attaches were attempted; see the summary for per-process results.
    Completed(AttachSummary),
}

/// Counts and failures from one resurrection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachSummary {
    /// Processes newly attached.
    pub attached: usize,
    /// Processes skipped because a debugger was already attached.
    pub skipped: usize,
    /// Per-process failures; these never abort the rest of the batch.
    pub failures: Vec<AttachFailure>,
}

/// Classification of a single failed attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachFailure {
    /// The host denied the attach for authorization reasons; re-running
    /// the IDE elevated may help.
    ElevationRequired {
        /// Process the attach was aimed at.
        path: String,
    },
    /// Any other per-process failure.
    AttachFailed {
        /// Process the attach was aimed at.
        path: String,
        /// Host-reported failure detail.
        detail: String,
    },
}

/// Orchestrates resurrection passes over the shared record store.
pub struct AttachOrchestrator {
    store: Arc<RecordStore>,
    host: Arc<dyn DebuggerHost>,
    /// Serializes passes so the manual command and the auto-attach
    /// watcher can never double-attach the same process.
    pass_gate: Mutex<()>,
}

impl AttachOrchestrator {
    /// Create an orchestrator over the shared store and host.
    #[must_use]
    pub fn new(store: Arc<RecordStore>, host: Arc<dyn DebuggerHost>) -> Self {
        Self {
            store,
            host,
            pass_gate: Mutex::new(()),
        }
    }

    /// Resurrect the previous debug session: reattach to every historic
    /// process that is still alive.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Host` only when the host itself is unreachable
    /// (process enumeration or the confirmation dialog failed).
    pub async fn resurrect(&self) -> Result<ResurrectOutcome> {
        self.resurrect_filtered(None).await
    }

    /// Resurrect with the live set narrowed to a single process path.
    /// Used by the auto-attach watcher; runs the exact same
    /// reconciliation and confirmation path as a manual resurrection
    /// with one live process available. Historic records are matched to
    /// the narrowed process by short file name, so a recorded
    /// executable that restarted from a different directory still
    /// reattaches with its recorded engine set.
    ///
    /// # Errors
    ///
    /// Same contract as [`resurrect`](Self::resurrect).
    pub async fn resurrect_one(&self, path: &str) -> Result<ResurrectOutcome> {
        self.resurrect_filtered(Some(path)).await
    }

    async fn resurrect_filtered(&self, only: Option<&str>) -> Result<ResurrectOutcome> {
        let _pass = self.pass_gate.lock().await;

        if self.store.is_frozen() {
            debug!("resurrection requested while frozen; ignored");
            return Ok(ResurrectOutcome::Frozen);
        }

        let historic = self.store.historic_snapshot();
        if historic.is_empty() {
            self.host
                .notify(
                    "No recorded debug targets. There is nothing to resurrect.",
                    Severity::Info,
                )
                .await;
            return Ok(ResurrectOutcome::NothingToResurrect);
        }

        let only = only.and_then(normalize_path);
        let live: Vec<ProcessInfo> = self
            .host
            .enumerate_processes()
            .await?
            .into_iter()
            .filter(|process| match (&only, normalize_path(&process.path)) {
                (Some(filter), Some(path)) => *filter == path,
                (None, Some(_)) => true,
                (_, None) => false,
            })
            .collect();

        // Partition historic records into matched and missing. The
        // narrowed (auto-attach) pass matches by short file name: a
        // recorded executable may restart from a different directory,
        // and the watcher already triggered on the short name.
        let mut matched: Vec<(&ProcessInfo, &AttachRecord)> = Vec::new();
        let mut missing: Vec<&AttachRecord> = Vec::new();
        for record in historic.values() {
            let found = live.iter().find(|process| match normalize_path(&process.path) {
                Some(path) if only.is_some() => short_name(&path) == record.short_name(),
                Some(path) => path == record.path,
                None => false,
            });
            match found {
                Some(process) => matched.push((process, record)),
                None => missing.push(record),
            }
        }

        if matched.is_empty() {
            self.host
                .notify(
                    "No recorded processes are running. The debug session cannot be resurrected.",
                    Severity::Info,
                )
                .await;
            return Ok(ResurrectOutcome::NothingToResurrect);
        }

        if !missing.is_empty() {
            let listing = missing
                .iter()
                .map(|record| format!("    {}", record.short_name()))
                .collect::<Vec<_>>()
                .join(",\n");
            let question = format!(
                "Some of the recorded processes were not found:\n{listing}\n\n\
                 Continue to resurrect the debug session without them?"
            );
            if !self.host.confirm(&question).await? {
                info!("resurrection declined by user; no attaches attempted");
                return Ok(ResurrectOutcome::Declined);
            }
        }

        let catalog = self.engine_catalog().await;
        let mut summary = AttachSummary::default();
        for (process, record) in matched {
            self.attach_one(process, record, &catalog, &mut summary).await;
        }

        info!(
            attached = summary.attached,
            skipped = summary.skipped,
            failed = summary.failures.len(),
            "resurrection pass completed"
        );
        Ok(ResurrectOutcome::Completed(summary))
    }

    /// Attach one matched process, classifying any failure into the
    /// summary instead of propagating it. Already-debugged processes are
    /// skipped: attaching twice is a no-op, not an error.
    async fn attach_one(
        &self,
        process: &ProcessInfo,
        record: &AttachRecord,
        catalog: &HashMap<Uuid, String>,
        summary: &mut AttachSummary,
    ) {
        let name = short_name(&process.path);
        if process.is_being_debugged {
            debug!(path = record.path, "already being debugged; skipped");
            summary.skipped += 1;
            return;
        }

        let engines: Vec<Uuid> = record.engines.iter().copied().collect();
        let selection = (!engines.is_empty()).then_some(engines.as_slice());
        let engine_names = if engines.is_empty() {
            "auto-detected".to_owned()
        } else {
            resolve_engine_names(catalog, &engines).join(", ")
        };

        match self.host.attach(process, selection).await {
            Ok(()) => {
                info!(path = record.path, engines = engine_names, "attached");
                summary.attached += 1;
            }
            Err(AppError::AccessDenied(detail)) => {
                warn!(path = record.path, detail, "attach denied; elevation required");
                self.host
                    .notify(
                        &format!(
                            "Unable to attach to {name}: the operation requires elevated \
                             privileges. Restarting the IDE as administrator may help."
                        ),
                        Severity::Error,
                    )
                    .await;
                summary.failures.push(AttachFailure::ElevationRequired {
                    path: record.path.clone(),
                });
            }
            Err(err) if !self.host.has_elevated_privileges() => {
                // Host attach errors rarely say *why* the attach failed;
                // a missing elevation is the one cause we can detect on
                // our own.
                warn!(path = record.path, %err, "attach failed without elevation");
                self.host
                    .notify(
                        &format!(
                            "Unable to attach to {name}: the operation requires elevated \
                             privileges. Restarting the IDE as administrator may help."
                        ),
                        Severity::Error,
                    )
                    .await;
                summary.failures.push(AttachFailure::ElevationRequired {
                    path: record.path.clone(),
                });
            }
            Err(err) => {
                warn!(path = record.path, %err, "attach failed");
                self.host
                    .notify(
                        &format!(
                            "Unable to attach to {name}. A debugger may already be attached \
                             (otherwise, an unexpected problem occurred)."
                        ),
                        Severity::Warning,
                    )
                    .await;
                summary.failures.push(AttachFailure::AttachFailed {
                    path: record.path.clone(),
                    detail: err.to_string(),
                });
            }
        }
    }

    /// Fetch the host engine catalog as an id → name map. Failure is
    /// tolerated (names degrade to `Unknown`); the catalog is cosmetic.
    async fn engine_catalog(&self) -> HashMap<Uuid, String> {
        match self.host.known_engines().await {
            Ok(engines) => engines
                .into_iter()
                .map(|EngineInfo { id, name }| (id, name))
                .collect(),
            Err(err) => {
                debug!(%err, "engine catalog unavailable");
                HashMap::new()
            }
        }
    }
}

/// Resolve engine ids against a catalog map; ids the host no longer
/// knows render as `Unknown`.
#[must_use]
pub fn resolve_engine_names(catalog: &HashMap<Uuid, String>, ids: &[Uuid]) -> Vec<String> {
    ids.iter()
        .map(|id| catalog.get(id).cloned().unwrap_or_else(|| "Unknown".into()))
        .collect()
}
