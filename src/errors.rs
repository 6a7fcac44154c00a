//! Error types shared across the crate.

use std::fmt::{Display, Formatter};

/// Shared crate result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Error enumeration covering all domain failure modes.
///
/// Per-process attach failures are deliberately *not* represented here:
/// they are collected into
/// [`AttachSummary`](crate::orchestrator::AttachSummary) so that one
/// failing process never aborts the rest of a resurrection pass.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Durable store unreachable or unwritable. The in-memory session
    /// data is retained so the next design-mode transition can retry.
    Persistence(String),
    /// Persisted blob did not match the record grammar.
    Codec(String),
    /// Total inability to communicate with the host debugger.
    Host(String),
    /// The host denied an operation for authorization reasons.
    AccessDenied(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Persistence(msg) => write!(f, "persistence: {msg}"),
            Self::Codec(msg) => write!(f, "codec: {msg}"),
            Self::Host(msg) => write!(f, "host: {msg}"),
            Self::AccessDenied(msg) => write!(f, "access denied: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
