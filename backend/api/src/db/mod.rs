//! Database layer: pool setup and migrations, plus one module of typed queries
//! per entity.
//!
//! Every uniqueness rule (one participant per wallet and trip, one private
//! trip per code, one profile per wallet) lives in the schema. Writers insert
//! optimistically and translate a constraint violation into the matching
//! [`trip_escrow::TripError`].

pub mod messages;
pub mod nonces;
pub mod participants;
pub mod transactions;
pub mod trips;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::Result;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    // Make sure the file is created if it doesn't exist yet. Writers queue on
    // the write lock for up to `BUSY_TIMEOUT` instead of failing at once.
    let options = SqliteConnectOptions::from_str(&url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

/// In-memory database with the schema applied.
///
/// A single connection, because every SQLite `:memory:` connection is its
/// own database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// File-backed database behind the production pool settings, for tests that
/// need several connections writing at once. Keep the `TempDir` alive.
#[cfg(test)]
pub async fn file_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trusttrip.db");
    let pool = init_pool(path.to_str().unwrap()).await.unwrap();
    (dir, pool)
}

/// The constraint text of a unique-index violation, if `err` is one.
///
/// SQLite reports these as `UNIQUE constraint failed: <table>.<column>`.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Some(db.message().to_string()),
        _ => None,
    }
}

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
