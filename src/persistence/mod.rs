//! Durable attach-history persistence.
//!
//! One SQLite row per workspace key, holding an opaque record blob in the
//! format described in [`codec`]. The repository is the only owner of
//! durable data; in-memory session state lives in
//! [`session::store`](crate::session::store).

pub mod codec;
pub mod db;
pub mod history_repo;

pub use history_repo::HistoryRepo;
