//! Attach record value type and path normalization helpers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One historically-debugged executable and the debug engines that were
/// attached to it during the session.
///
/// Identity within a [`RecordSet`] is the normalized executable path;
/// engine ids are a set, so attribution order is irrelevant and
/// duplicates collapse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AttachRecord {
    /// Normalized full executable path, the matching key. Never empty.
    pub path: String,
    /// Debug engine identifiers attached to this process.
    pub engines: BTreeSet<Uuid>,
}

/// Record sets are keyed by normalized path; `BTreeMap` keeps iteration
/// deterministic for serialization and status rendering.
pub type RecordSet = BTreeMap<String, AttachRecord>;

impl AttachRecord {
    /// Build a record with an empty engine set from a raw host-reported
    /// path. Returns `None` for empty or whitespace-only input — empty
    /// paths are never stored.
    #[must_use]
    pub fn new(raw_path: &str) -> Option<Self> {
        let path = normalize_path(raw_path)?;
        Some(Self {
            path,
            engines: BTreeSet::new(),
        })
    }

    /// Record an engine id. Idempotent.
    pub fn add_engine(&mut self, engine: Uuid) {
        self.engines.insert(engine);
    }

    /// File-name component of the path, used for display and for
    /// auto-attach short-name matching.
    #[must_use]
    pub fn short_name(&self) -> &str {
        short_name(&self.path)
    }
}

/// Normalize a host-reported executable path for use as a matching key:
/// trimmed and lowercased. Returns `None` when nothing remains.
#[must_use]
pub fn normalize_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// File-name component of a path, tolerating both `/` and `\` separators
/// (paths come from the host verbatim and may be Windows-style).
#[must_use]
pub fn short_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
