//! SQLite connection and schema bootstrap.

use std::fs;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{AppError, Result};

/// Alias for the shared SQLite pool.
pub type Database = SqlitePool;

/// Idempotent schema: one blob of attach records per workspace key.
const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS attach_history (
    workspace_key TEXT PRIMARY KEY,
    records       TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);";

/// Open (or create) the on-disk store and apply the schema.
///
/// # Errors
///
/// Returns `AppError::Persistence` if the database directory cannot be
/// created or the connection/schema application fails.
pub async fn connect(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| AppError::Persistence(format!("failed to create db dir: {err}")))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

/// Open an in-memory store for tests.
///
/// The pool is pinned to a single connection that never retires, since
/// each SQLite in-memory connection is its own database.
///
/// # Errors
///
/// Returns `AppError::Persistence` if the connection or schema
/// application fails.
pub async fn connect_memory() -> Result<Database> {
    let options = SqliteConnectOptions::new().in_memory(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &Database) -> Result<()> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}
