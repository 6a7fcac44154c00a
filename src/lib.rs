#![forbid(unsafe_code)]

//! Debug session resurrection core.
//!
//! Remembers which executables were being debugged in a workspace (and
//! with which debug engines), persists that memory per workspace key, and
//! reattaches to the still-running subset on demand or automatically when
//! a recorded process starts again.
//!
//! The host IDE is consumed through the [`host::DebuggerHost`] trait;
//! this crate never enumerates processes, renders UI, or registers
//! commands itself. Wire everything up once at startup through
//! [`runtime::ResurrectRuntime`].

pub mod config;
pub mod errors;
pub mod host;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod runtime;
pub mod session;
pub mod status;
pub mod watcher;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
