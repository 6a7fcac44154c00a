//! Repository for per-workspace attach history.

use chrono::Utc;
use tracing::{debug, warn};

use crate::models::RecordSet;
use crate::Result;

use super::codec;
use super::db::Database;

/// Repository wrapper around the SQLite pool for attach-history blobs.
#[derive(Clone)]
pub struct HistoryRepo {
    pool: Database,
}

impl HistoryRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(pool: Database) -> Self {
        Self { pool }
    }

    /// Load the historic record set for a workspace.
    ///
    /// Fails soft: a missing row, an unreadable store, or a malformed
    /// blob all yield an empty set. Corrupt history must never take the
    /// host down; it just means there is nothing to resurrect.
    pub async fn load(&self, workspace_key: &str) -> RecordSet {
        let row: std::result::Result<Option<(String,)>, sqlx::Error> =
            sqlx::query_as("SELECT records FROM attach_history WHERE workspace_key = ?1")
                .bind(workspace_key)
                .fetch_optional(&self.pool)
                .await;

        let blob = match row {
            Ok(Some((blob,))) => blob,
            Ok(None) => return RecordSet::new(),
            Err(err) => {
                warn!(workspace_key, %err, "attach history unreadable; treating as empty");
                return RecordSet::new();
            }
        };

        match codec::decode(&blob) {
            Ok(records) => records,
            Err(err) => {
                warn!(workspace_key, %err, "malformed attach history; treating as empty");
                RecordSet::new()
            }
        }
    }

    /// Persist the record set for a workspace, replacing any previous
    /// blob. Saving an empty set is a no-op: there is nothing to persist
    /// and prior historic data is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Persistence` when the store cannot be written.
    /// This is a hard, reported error — silently losing the data would
    /// defeat the feature.
    pub async fn save(&self, workspace_key: &str, records: &RecordSet) -> Result<()> {
        if records.is_empty() {
            debug!(workspace_key, "empty session record set; nothing to persist");
            return Ok(());
        }

        let blob = codec::encode(records);
        sqlx::query(
            "INSERT INTO attach_history (workspace_key, records, updated_at) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT(workspace_key) DO UPDATE \
             SET records = excluded.records, updated_at = excluded.updated_at",
        )
        .bind(workspace_key)
        .bind(&blob)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(workspace_key, record_count = records.len(), "attach history persisted");
        Ok(())
    }
}
