//! SQLite connection management.
//!
//! The primary store and the search mirror live in two separate database
//! files, each with its own pool, so one can be unavailable while the other
//! keeps serving. Both are opened the same way:
//!
//! - the file and its parent directories are created if missing;
//! - WAL journal mode, so searches and writes overlap without blocking;
//! - a busy timeout, so lock contention surfaces as an error instead of a hang;
//! - up to 5 pooled connections.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;

/// Open the primary store database.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    connect_path(&config.db.path).await
}

/// Open the search mirror database.
pub async fn connect_index(config: &Config) -> Result<SqlitePool> {
    connect_path(&config.index.path).await
}

pub async fn connect_path(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
