//! Global configuration parsing and validation.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{AppError, Result};

fn default_status_refresh_ms() -> u64 {
    500
}

fn default_ignored_suffixes() -> Vec<String> {
    // The VS hosting process shows up as a process-create event but is a
    // test-harness placeholder, not a debug target worth remembering.
    vec!["vshost.exe".into()]
}

/// Global configuration parsed from `resurrect.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path of the SQLite file holding per-workspace attach history.
    pub db_path: PathBuf,
    /// Whether the auto-attach watcher starts enabled.
    #[serde(default)]
    pub auto_attach: bool,
    /// Interval of the display-only status refresh loop.
    #[serde(default = "default_status_refresh_ms")]
    pub status_refresh_ms: u64,
    /// Process file-name suffixes never tracked as debug targets.
    #[serde(default = "default_ignored_suffixes")]
    pub ignored_process_suffixes: Vec<String>,
}

impl GlobalConfig {
    /// Parse a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the TOML is invalid or a field fails
    /// validation.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` on an empty `db_path` or a zero refresh
    /// interval.
    pub fn validate(&self) -> Result<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("db_path must not be empty".into()));
        }
        if self.status_refresh_ms == 0 {
            return Err(AppError::Config(
                "status_refresh_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
