//! Nonce store: one live login nonce per wallet, each with an expiry.
//!
//! Expired rows are never accepted, and [`sweep_expired`] evicts them.

use sqlx::SqlitePool;

use crate::errors::Result;

/// Replace any nonce previously issued for `wallet_key`.
pub async fn issue(pool: &SqlitePool, wallet_key: &str, nonce: &str, expires_at: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO auth_nonces (wallet_key, nonce, expires_at) VALUES (?1, ?2, ?3)
        ON CONFLICT (wallet_key) DO UPDATE SET nonce = excluded.nonce, expires_at = excluded.expires_at
        "#,
    )
    .bind(wallet_key)
    .bind(nonce)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete the nonce if it matches and has not expired. Single use.
pub async fn consume(pool: &SqlitePool, wallet_key: &str, nonce: &str, now: i64) -> Result<bool> {
    let rows = sqlx::query(
        "DELETE FROM auth_nonces WHERE wallet_key = ?1 AND nonce = ?2 AND expires_at > ?3",
    )
    .bind(wallet_key)
    .bind(nonce)
    .bind(now)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows == 1)
}

/// Evict every nonce whose expiry is at or before `now`.
pub async fn sweep_expired(pool: &SqlitePool, now: i64) -> Result<u64> {
    let rows = sqlx::query("DELETE FROM auth_nonces WHERE expires_at <= ?1")
        .bind(now)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows)
}
