//! Trip store: trip records, their status and escrow counters.
//!
//! Status transitions and escrow writes are conditional updates: each one
//! names the state it expects to replace and reports whether it won.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use trip_escrow::{NewTrip, Octas, Trip, TripError, TripStatus};

use super::unique_violation;
use crate::errors::{ApiError, Result};

/// A trip row joined with its participant count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TripRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub date: String,
    pub end_date: String,
    pub amount: String,
    pub deadline: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub code: Option<String>,
    pub organizer: String,
    pub organizer_name: Option<String>,
    pub min_fund: String,
    pub whatsapp_link: Option<String>,
    pub discord_link: Option<String>,
    pub initial_deposit_octas: String,
    pub escrow_octas: String,
    pub penalty_octas: String,
    pub status: String,
    pub created_at: i64,
    pub participants: i64,
}

fn corrupt(id: &str, field: &str, err: impl std::fmt::Display) -> ApiError {
    ApiError::Corrupt(format!("trip {id}: {field}: {err}"))
}

impl TryFrom<TripRow> for Trip {
    type Error = ApiError;

    fn try_from(row: TripRow) -> Result<Trip> {
        let id = row.id;
        Ok(Trip {
            amount: row.amount.parse::<Decimal>().map_err(|e| corrupt(&id, "amount", e))?,
            min_fund: row
                .min_fund
                .parse::<Decimal>()
                .map_err(|e| corrupt(&id, "min_fund", e))?,
            kind: row.kind.parse().map_err(|e| corrupt(&id, "type", e))?,
            status: row.status.parse().map_err(|e| corrupt(&id, "status", e))?,
            initial_deposit_octas: row
                .initial_deposit_octas
                .parse()
                .map_err(|e| corrupt(&id, "initial_deposit_octas", e))?,
            escrow_octas: row
                .escrow_octas
                .parse()
                .map_err(|e| corrupt(&id, "escrow_octas", e))?,
            penalty_octas: row
                .penalty_octas
                .parse()
                .map_err(|e| corrupt(&id, "penalty_octas", e))?,
            participants: u64::try_from(row.participants).unwrap_or_default(),
            title: row.title,
            description: row.description,
            destination: row.destination,
            date: row.date,
            end_date: row.end_date,
            deadline: row.deadline,
            code: row.code,
            organizer: row.organizer,
            organizer_name: row.organizer_name,
            whatsapp_link: row.whatsapp_link,
            discord_link: row.discord_link,
            created_at: row.created_at,
            id,
        })
    }
}

const SELECT_TRIP: &str = r#"
    SELECT t.id, t.title, t.description, t.destination, t.date, t.end_date, t.amount,
           t.deadline, t.type, t.code, t.organizer, t.organizer_name, t.min_fund,
           t.whatsapp_link, t.discord_link, t.initial_deposit_octas, t.escrow_octas,
           t.penalty_octas, t.status, t.created_at,
           (SELECT COUNT(*) FROM participants p WHERE p.trip_id = t.id) AS participants
    FROM   trips t
"#;

fn into_trips(rows: Vec<TripRow>) -> Result<Vec<Trip>> {
    rows.into_iter().map(Trip::try_from).collect()
}

// ─────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Trip>> {
    let sql = format!("{SELECT_TRIP} WHERE t.id = ?1");
    let row = sqlx::query_as::<_, TripRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Trip::try_from).transpose()
}

/// Look up a private trip by its (already normalised) code.
pub async fn get_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Trip>> {
    let sql = format!("{SELECT_TRIP} WHERE t.code = ?1");
    let row = sqlx::query_as::<_, TripRow>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    row.map(Trip::try_from).transpose()
}

/// Universal trips, newest first.
pub async fn list_public(pool: &SqlitePool) -> Result<Vec<Trip>> {
    let sql = format!(
        "{SELECT_TRIP} WHERE t.type = 'universal' ORDER BY t.created_at DESC, t.rowid DESC"
    );
    let rows = sqlx::query_as::<_, TripRow>(&sql).fetch_all(pool).await?;
    into_trips(rows)
}

pub async fn list_by_organizer(pool: &SqlitePool, organizer: &str) -> Result<Vec<Trip>> {
    let sql = format!(
        "{SELECT_TRIP} WHERE t.organizer = ?1 ORDER BY t.created_at DESC, t.rowid DESC"
    );
    let rows = sqlx::query_as::<_, TripRow>(&sql)
        .bind(organizer)
        .fetch_all(pool)
        .await?;
    into_trips(rows)
}

/// Trips `wallet` has checked in to, most recently joined first.
pub async fn list_by_participant(pool: &SqlitePool, wallet: &str) -> Result<Vec<Trip>> {
    let sql = format!(
        r#"{SELECT_TRIP}
        JOIN   participants me ON me.trip_id = t.id AND me.wallet_address = ?1
        ORDER  BY me.joined_at DESC, me.id DESC"#
    );
    let rows = sqlx::query_as::<_, TripRow>(&sql)
        .bind(wallet)
        .fetch_all(pool)
        .await?;
    into_trips(rows)
}

/// An earlier submission of the same trip by the same organizer.
pub async fn find_duplicate(
    pool: &SqlitePool,
    organizer: &str,
    title: &str,
    date: &str,
) -> Result<Option<Trip>> {
    let sql = format!(
        "{SELECT_TRIP} WHERE t.organizer = ?1 AND t.title = ?2 AND t.date = ?3 LIMIT 1"
    );
    let row = sqlx::query_as::<_, TripRow>(&sql)
        .bind(organizer)
        .bind(title)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    row.map(Trip::try_from).transpose()
}

/// Current escrow of a trip, without the participant count.
pub async fn escrow_of(pool: &SqlitePool, id: &str) -> Result<Option<Octas>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT escrow_octas FROM trips WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(|(v,)| v.parse().map_err(|e| corrupt(id, "escrow_octas", e)))
        .transpose()
}

/// Escrow of every trip that still holds funds (anything not canceled).
pub async fn held_escrows(pool: &SqlitePool) -> Result<Vec<Octas>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT id, escrow_octas FROM trips WHERE status != 'canceled'")
            .fetch_all(pool)
            .await?;
    rows.into_iter()
        .map(|(id, v)| v.parse().map_err(|e| corrupt(&id, "escrow_octas", e)))
        .collect()
}

// ─────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────

/// Insert a new open trip whose escrow starts at the initial deposit.
///
/// Fails with [`TripError::DuplicateCode`] or [`TripError::DuplicateTripId`]
/// when the store's unique indexes reject the row.
pub async fn insert(pool: &SqlitePool, id: &str, trip: &NewTrip, code: Option<&str>) -> Result<()> {
    let deposit = trip.initial_deposit.to_string();
    let outcome = sqlx::query(
        r#"
        INSERT INTO trips
            (id, title, description, destination, date, end_date, amount, deadline, type,
             code, organizer, organizer_name, min_fund, whatsapp_link, discord_link,
             initial_deposit_octas, escrow_octas, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16, 'open')
        "#,
    )
    .bind(id)
    .bind(&trip.title)
    .bind(&trip.description)
    .bind(&trip.destination)
    .bind(&trip.date)
    .bind(&trip.end_date)
    .bind(trip.amount.to_string())
    .bind(&trip.deadline)
    .bind(trip.kind.as_str())
    .bind(code)
    .bind(&trip.organizer)
    .bind(&trip.organizer_name)
    .bind(trip.min_fund.to_string())
    .bind(&trip.whatsapp_link)
    .bind(&trip.discord_link)
    .bind(&deposit)
    .execute(pool)
    .await;

    match outcome {
        Ok(_) => Ok(()),
        Err(e) => match unique_violation(&e) {
            Some(msg) if msg.contains("trips.code") => Err(TripError::DuplicateCode.into()),
            Some(msg) if msg.contains("trips.id") => Err(TripError::DuplicateTripId.into()),
            _ => Err(e.into()),
        },
    }
}

/// Move an open trip to `status`. `false` when the trip was not open (or is gone).
pub async fn set_status_if_open(pool: &SqlitePool, id: &str, status: TripStatus) -> Result<bool> {
    let rows = sqlx::query("UPDATE trips SET status = ?2 WHERE id = ?1 AND status = 'open'")
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows == 1)
}

/// Add `paid` to an open trip's escrow and return the new total.
///
/// The first statement of the transaction is a write, so it takes the
/// database write lock (waiting out `busy_timeout`) before escrow is read.
/// Concurrent credits therefore serialise instead of overwriting each other.
/// `None` when the trip is missing or no longer open; nothing is written.
pub async fn credit_escrow(pool: &SqlitePool, id: &str, paid: &Octas) -> Result<Option<Octas>> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query(
        "UPDATE trips SET escrow_octas = escrow_octas WHERE id = ?1 AND status = 'open'",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if locked == 0 {
        return Ok(None);
    }

    let (current,): (String,) = sqlx::query_as("SELECT escrow_octas FROM trips WHERE id = ?1")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    let current: Octas = current
        .parse()
        .map_err(|e| corrupt(id, "escrow_octas", e))?;
    let next = &current + paid;

    sqlx::query("UPDATE trips SET escrow_octas = ?2 WHERE id = ?1")
        .bind(id)
        .bind(next.to_string())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(Some(next))
}

/// Cancel an open trip, applying a settlement computed from `expected_escrow`
/// and `expected_participants`.
///
/// `false` when any of the three moved since they were read.
pub async fn settle_cancel(
    pool: &SqlitePool,
    id: &str,
    expected_escrow: &Octas,
    expected_participants: u64,
    remaining: &Octas,
    penalty: &Octas,
) -> Result<bool> {
    let rows = sqlx::query(
        r#"
        UPDATE trips
        SET    status = 'canceled', escrow_octas = ?4, penalty_octas = ?5
        WHERE  id = ?1
          AND  status = 'open'
          AND  escrow_octas = ?2
          AND  (SELECT COUNT(*) FROM participants p WHERE p.trip_id = ?1) = ?3
        "#,
    )
    .bind(id)
    .bind(expected_escrow.to_string())
    .bind(i64::try_from(expected_participants).unwrap_or(i64::MAX))
    .bind(remaining.to_string())
    .bind(penalty.to_string())
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows == 1)
}

/// Delete a trip together with its participants and every user's reference
/// to it.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM participants WHERE trip_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM user_trips WHERE trip_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM trips WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
