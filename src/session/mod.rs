//! In-memory session state and the host-signal tracker.

pub mod store;
pub mod tracker;

pub use store::RecordStore;
pub use tracker::{SessionTracker, SessionTrackerHandle};
