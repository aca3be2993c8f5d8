//! Transaction log: best-effort record of payment attempts reported at
//! check-in. Nothing reads it back on the request path.

use sqlx::SqlitePool;
use trip_escrow::{Octas, PaymentStatus};

use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct PaymentAttempt<'a> {
    pub trip_id: &'a str,
    pub from: &'a str,
    pub to: Option<&'a str>,
    pub amount: &'a Octas,
    pub status: PaymentStatus,
    pub hash: Option<&'a str>,
    pub network: &'a str,
}

pub async fn log(pool: &SqlitePool, attempt: &PaymentAttempt<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (trip_id, from_wallet, to_wallet, amount_octas, status, hash, network)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(attempt.trip_id)
    .bind(attempt.from)
    .bind(attempt.to)
    .bind(attempt.amount.to_string())
    .bind(attempt.status.as_str())
    .bind(attempt.hash)
    .bind(attempt.network)
    .execute(pool)
    .await?;
    Ok(())
}
