//! Background task that evicts expired login nonces.

use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{debug, error, info};

use crate::db;

/// Sweep forever, once every `interval_secs`.
pub async fn run(pool: SqlitePool, interval_secs: u64) {
    info!("Nonce sweeper starting, interval {interval_secs}s");

    loop {
        tokio::time::sleep(Duration::from_secs(interval_secs.max(1))).await;

        match sweep_once(&pool).await {
            Ok(0) => {}
            Ok(n) => debug!("Swept {n} expired nonces"),
            Err(e) => error!("Nonce sweep error: {e}"),
        }
    }
}

async fn sweep_once(pool: &SqlitePool) -> crate::errors::Result<u64> {
    db::nonces::sweep_expired(pool, db::now_unix()).await
}
