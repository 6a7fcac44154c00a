//! Domain value types.

pub mod record;

pub use record::{normalize_path, short_name, AttachRecord, RecordSet};
