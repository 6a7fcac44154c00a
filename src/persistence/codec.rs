//! Wire format for the per-workspace attach-history blob.
//!
//! Grammar: `record (';' record)*` with
//! `record = path '|' engineId (',' engineId)*`. A record whose engine
//! set is empty encodes as `path '|'` — records are created before any
//! engine loads, so empty sets are legal historic data.
//!
//! Legacy form: `record = path (',' path)* '|' engineId (',' engineId)*`,
//! i.e. several comma-joined paths sharing one engine list. Old history
//! blobs may carry it, so it is still parsed (every listed path receives
//! the shared engine list) but never produced — new writes always use
//! one path per record.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::models::{normalize_path, AttachRecord, RecordSet};
use crate::{AppError, Result};

/// Serialize a record set into the blob form. Engine order within a
/// record and record order within the blob carry no meaning; both are
/// emitted in path/id order for determinism.
#[must_use]
pub fn encode(records: &RecordSet) -> String {
    records
        .values()
        .map(|record| {
            let engines = record
                .engines
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            format!("{}|{}", record.path, engines)
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Parse a blob back into a record set. Duplicate paths across records
/// merge their engine sets.
///
/// # Errors
///
/// Returns `AppError::Codec` on a record without a `|` separator, a
/// record without any non-empty path, or an unparseable engine id.
pub fn decode(blob: &str) -> Result<RecordSet> {
    let mut records = RecordSet::new();

    for raw_record in blob.split(';').filter(|r| !r.trim().is_empty()) {
        let Some((paths_part, engines_part)) = raw_record.split_once('|') else {
            return Err(AppError::Codec(format!(
                "record without path/engine separator: {raw_record:?}"
            )));
        };

        let engines = parse_engines(engines_part)?;

        // Legacy records may carry several comma-joined paths sharing the
        // engine list; the modern form is the single-path special case.
        let mut any_path = false;
        for raw_path in paths_part.split(',') {
            let Some(path) = normalize_path(raw_path) else {
                continue;
            };
            any_path = true;
            records
                .entry(path.clone())
                .or_insert_with(|| AttachRecord {
                    path,
                    engines: BTreeSet::new(),
                })
                .engines
                .extend(engines.iter().copied());
        }
        if !any_path {
            return Err(AppError::Codec(format!(
                "record without a process path: {raw_record:?}"
            )));
        }
    }

    Ok(records)
}

fn parse_engines(engines_part: &str) -> Result<BTreeSet<Uuid>> {
    engines_part
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            Uuid::parse_str(id).map_err(|err| AppError::Codec(format!("bad engine id {id:?}: {err}")))
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
