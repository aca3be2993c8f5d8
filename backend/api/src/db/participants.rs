//! Participant store: at most one row per `(trip, wallet)`.

use serde::Serialize;
use sqlx::SqlitePool;
use trip_escrow::TripError;

use super::unique_violation;
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub wallet_address: String,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub joined_at: i64,
}

/// Insert a participant, but only while the trip is open.
///
/// The open-status check and the insert are one statement, and the
/// `(trip_id, wallet_address)` unique index decides duplicates: of two racing
/// check-ins for the same wallet exactly one lands, the other gets
/// [`TripError::AlreadyCheckedIn`]. `Ok(false)` means the trip is not open
/// (or no longer exists).
pub async fn insert_if_open(
    pool: &SqlitePool,
    trip_id: &str,
    wallet: &str,
    name: Option<&str>,
    age: Option<i64>,
) -> Result<bool> {
    let outcome = sqlx::query(
        r#"
        INSERT INTO participants (trip_id, wallet_address, name, age)
        SELECT ?1, ?2, ?3, ?4
        WHERE  EXISTS (SELECT 1 FROM trips WHERE id = ?1 AND status = 'open')
        "#,
    )
    .bind(trip_id)
    .bind(wallet)
    .bind(name)
    .bind(age)
    .execute(pool)
    .await;

    match outcome {
        Ok(done) => Ok(done.rows_affected() == 1),
        Err(e) if unique_violation(&e).is_some() => Err(TripError::AlreadyCheckedIn.into()),
        Err(e) => Err(e.into()),
    }
}

pub async fn count(pool: &SqlitePool, trip_id: &str) -> Result<u64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM participants WHERE trip_id = ?1")
        .bind(trip_id)
        .fetch_one(pool)
        .await?;
    Ok(u64::try_from(n).unwrap_or_default())
}

/// Participants of a trip in check-in order.
pub async fn list(pool: &SqlitePool, trip_id: &str) -> Result<Vec<ParticipantRecord>> {
    let rows = sqlx::query_as::<_, ParticipantRecord>(
        r#"
        SELECT wallet_address, name, age, joined_at
        FROM   participants
        WHERE  trip_id = ?1
        ORDER  BY joined_at ASC, id ASC
        "#,
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// `false` when there was no such participant.
pub async fn delete(pool: &SqlitePool, trip_id: &str, wallet: &str) -> Result<bool> {
    let rows = sqlx::query("DELETE FROM participants WHERE trip_id = ?1 AND wallet_address = ?2")
        .bind(trip_id)
        .bind(wallet)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows == 1)
}
