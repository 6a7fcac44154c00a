//! Shared record store: the session set, the historic set, and the
//! freeze flag.
//!
//! The session set accumulates while a debug session is live and is
//! flushed to the [`HistoryRepo`] when the host returns to design mode.
//! The historic set mirrors the last persisted state for the open
//! workspace. Both sit behind poison-tolerant `std::sync` locks so the
//! tracker, the orchestrator, the watcher, and the status loop can share
//! one store without an async context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{normalize_path, short_name, AttachRecord, RecordSet};
use crate::persistence::HistoryRepo;
use crate::Result;

/// Shared in-memory state for one host session.
pub struct RecordStore {
    repo: HistoryRepo,
    /// Records accumulated during the live debug session; cleared on persist.
    session: Mutex<RecordSet>,
    /// Last persisted records for the open workspace.
    historic: RwLock<RecordSet>,
    /// Key scoping persistence to the open workspace; `None` when closed.
    workspace_key: RwLock<Option<String>>,
    /// Set while a debug session runs; no attach operation may run then.
    frozen: AtomicBool,
}

impl RecordStore {
    /// Create a store backed by the given repository.
    #[must_use]
    pub fn new(repo: HistoryRepo) -> Self {
        Self {
            repo,
            session: Mutex::new(RecordSet::new()),
            historic: RwLock::new(RecordSet::new()),
            workspace_key: RwLock::new(None),
            frozen: AtomicBool::new(false),
        }
    }

    /// Load historic records for a newly opened workspace.
    pub async fn open_workspace(&self, key: &str) {
        let records = self.repo.load(key).await;
        info!(workspace_key = key, record_count = records.len(), "workspace opened");
        *write(&self.historic) = records;
        *write(&self.workspace_key) = Some(key.to_owned());
    }

    /// Clear historic state when the workspace closes.
    pub fn close_workspace(&self) {
        write(&self.historic).clear();
        *write(&self.workspace_key) = None;
        debug!("workspace closed; historic records cleared");
    }

    /// Upsert a session record for a newly created process. Returns
    /// `true` when the process was tracked (empty paths are dropped).
    pub fn track_process(&self, raw_path: &str) -> bool {
        let Some(record) = AttachRecord::new(raw_path) else {
            debug!("process-create with empty path dropped");
            return false;
        };
        let path = record.path.clone();
        lock(&self.session).entry(path.clone()).or_insert(record);
        debug!(path, "process tracked in session set");
        true
    }

    /// Attribute an engine to an already-tracked process. Engine events
    /// for paths that were never tracked are dropped: engines are only
    /// ever attributed to processes registered by a process-create
    /// signal.
    pub fn track_engine(&self, raw_path: &str, engine_id: Uuid) {
        let Some(path) = normalize_path(raw_path) else {
            return;
        };
        let mut session = lock(&self.session);
        if let Some(record) = session.get_mut(&path) {
            record.add_engine(engine_id);
            debug!(path, %engine_id, "engine attributed");
        } else {
            debug!(path, %engine_id, "engine event for untracked process dropped");
        }
    }

    /// Flush the session set into durable storage for the open workspace
    /// and promote it to the historic set.
    ///
    /// An empty session set is a no-op that leaves prior historic data
    /// untouched. On a persistence failure the session set is retained
    /// in memory so the next design-mode transition can retry.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Persistence` when the durable store cannot be
    /// written.
    pub async fn persist(&self) -> Result<()> {
        let snapshot = lock(&self.session).clone();
        if snapshot.is_empty() {
            debug!("no session records; persist skipped");
            return Ok(());
        }

        let Some(key) = read(&self.workspace_key).clone() else {
            debug!("no open workspace; persist skipped");
            return Ok(());
        };

        self.repo.save(&key, &snapshot).await?;

        // Keep any records that arrived or changed while the save was in
        // flight; only the persisted snapshot leaves the session set.
        lock(&self.session).retain(|path, record| snapshot.get(path) != Some(record));
        *write(&self.historic) = snapshot;
        Ok(())
    }

    /// Enter the frozen state (a debug session is running).
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    /// Leave the frozen state.
    pub fn unfreeze(&self) {
        self.frozen.store(false, Ordering::SeqCst);
    }

    /// Whether resurrection is currently disabled.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }

    /// Clone of the historic record set.
    #[must_use]
    pub fn historic_snapshot(&self) -> RecordSet {
        read(&self.historic).clone()
    }

    /// Clone of the session record set.
    #[must_use]
    pub fn session_snapshot(&self) -> RecordSet {
        lock(&self.session).clone()
    }

    /// Whether any historic records exist for the open workspace.
    #[must_use]
    pub fn has_historic(&self) -> bool {
        !read(&self.historic).is_empty()
    }

    /// Case-insensitive short-file-name match against the historic set,
    /// used by the auto-attach watcher.
    #[must_use]
    pub fn historic_matches_short_name(&self, path: &str) -> bool {
        let candidate = short_name(path).to_lowercase();
        read(&self.historic)
            .values()
            .any(|record| record.short_name() == candidate)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(rwlock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(rwlock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    rwlock.write().unwrap_or_else(PoisonError::into_inner)
}
