//! Profile store: wallet-keyed users and their created / joined trip sets.
//!
//! Registration locks a profile: afterwards the name and age columns are
//! only ever rewritten with the values they already hold. The lock check is
//! the `WHERE` clause of the upsert itself, so there is no read-then-write
//! window.

use serde::Serialize;
use sqlx::SqlitePool;
use trip_escrow::{TripError, WalletProfile};

use crate::errors::Result;

/// Which of a user's trip sets an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripRelation {
    Created,
    Joined,
}

impl TripRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Joined => "joined",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    wallet_address: String,
    username: Option<String>,
    full_name: Option<String>,
    profile_image: Option<String>,
    age: Option<i64>,
    locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub wallet_address: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub profile_image: Option<String>,
    pub age: Option<i64>,
    pub locked: bool,
    pub created_trips: Vec<String>,
    pub joined_trips: Vec<String>,
}

/// Editable profile fields. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate<'a> {
    pub username: Option<&'a str>,
    pub profile_image: Option<&'a str>,
    pub age: Option<i64>,
}

// ─────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────

pub async fn get(pool: &SqlitePool, wallet: &str) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT wallet_address, username, full_name, profile_image, age, locked
        FROM   users
        WHERE  wallet_address = ?1
        "#,
    )
    .bind(wallet)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let created_trips = trip_ids(pool, wallet, TripRelation::Created).await?;
    let joined_trips = trip_ids(pool, wallet, TripRelation::Joined).await?;
    Ok(Some(User {
        wallet_address: row.wallet_address,
        username: row.username,
        full_name: row.full_name,
        profile_image: row.profile_image,
        age: row.age,
        locked: row.locked,
        created_trips,
        joined_trips,
    }))
}

async fn trip_ids(pool: &SqlitePool, wallet: &str, relation: TripRelation) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT trip_id FROM user_trips WHERE wallet_address = ?1 AND relation = ?2 ORDER BY rowid",
    )
    .bind(wallet)
    .bind(relation.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn must_get(pool: &SqlitePool, wallet: &str) -> Result<User> {
    get(pool, wallet)
        .await?
        .ok_or_else(|| TripError::not_found("User").into())
}

// ─────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────

/// Create or edit a profile. On a locked profile, changing the username or
/// age fails with [`TripError::ProfileLocked`]; the image stays editable.
pub async fn upsert_profile(pool: &SqlitePool, wallet: &str, update: ProfileUpdate<'_>) -> Result<User> {
    let rows = sqlx::query(
        r#"
        INSERT INTO users (wallet_address, username, profile_image, age)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (wallet_address) DO UPDATE SET
            username      = COALESCE(excluded.username, users.username),
            profile_image = COALESCE(excluded.profile_image, users.profile_image),
            age           = COALESCE(excluded.age, users.age)
        WHERE users.locked = 0
           OR ((excluded.username IS NULL OR excluded.username IS users.username)
               AND (excluded.age IS NULL OR excluded.age IS users.age))
        "#,
    )
    .bind(wallet)
    .bind(update.username)
    .bind(update.profile_image)
    .bind(update.age)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(TripError::ProfileLocked.into());
    }
    must_get(pool, wallet).await
}

/// Set full name (also used as username) and age, then lock the profile.
pub async fn register(pool: &SqlitePool, wallet: &str, full_name: &str, age: i64) -> Result<User> {
    let rows = sqlx::query(
        r#"
        INSERT INTO users (wallet_address, username, full_name, age, locked)
        VALUES (?1, ?2, ?2, ?3, 1)
        ON CONFLICT (wallet_address) DO UPDATE SET
            username  = excluded.username,
            full_name = excluded.full_name,
            age       = excluded.age,
            locked    = 1
        WHERE users.locked = 0
        "#,
    )
    .bind(wallet)
    .bind(full_name)
    .bind(age)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(TripError::ProfileLocked.into());
    }
    must_get(pool, wallet).await
}

/// Store a wallet-derived placeholder profile unless the user already
/// registered. Returns whatever profile is stored afterwards.
pub async fn store_derived(pool: &SqlitePool, profile: &WalletProfile) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (wallet_address, username, age)
        VALUES (?1, ?2, ?3)
        ON CONFLICT (wallet_address) DO UPDATE SET
            username = excluded.username,
            age      = excluded.age
        WHERE users.locked = 0
        "#,
    )
    .bind(&profile.wallet_address)
    .bind(&profile.username)
    .bind(i64::from(profile.age))
    .execute(pool)
    .await?;
    must_get(pool, &profile.wallet_address).await
}

/// Add `trip_id` to one of the user's trip sets. Adding twice is a no-op.
pub async fn add_trip(pool: &SqlitePool, wallet: &str, trip_id: &str, relation: TripRelation) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO user_trips (wallet_address, trip_id, relation) VALUES (?1, ?2, ?3)",
    )
    .bind(wallet)
    .bind(trip_id)
    .bind(relation.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove_trip(pool: &SqlitePool, wallet: &str, trip_id: &str, relation: TripRelation) -> Result<()> {
    sqlx::query("DELETE FROM user_trips WHERE wallet_address = ?1 AND trip_id = ?2 AND relation = ?3")
        .bind(wallet)
        .bind(trip_id)
        .bind(relation.as_str())
        .execute(pool)
        .await?;
    Ok(())
}
