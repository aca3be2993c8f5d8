//! Message store: per-recipient inbox records.

use serde::Serialize;
use sqlx::SqlitePool;
use trip_escrow::MessageKind;

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: i64,
    #[serde(rename = "from")]
    pub from_addr: String,
    #[serde(rename = "to")]
    pub to_addr: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: Option<String>,
    pub body: String,
    pub read: bool,
    pub created_at: i64,
}

/// Store a message and return its id.
pub async fn send(
    pool: &SqlitePool,
    from: &str,
    to: &str,
    kind: MessageKind,
    subject: Option<&str>,
    body: &str,
) -> Result<i64> {
    let done = sqlx::query(
        "INSERT INTO messages (from_addr, to_addr, type, subject, body) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(from)
    .bind(to)
    .bind(kind.as_str())
    .bind(subject)
    .bind(body)
    .execute(pool)
    .await?;
    Ok(done.last_insert_rowid())
}

/// Messages addressed to `to`, newest first.
pub async fn inbox(pool: &SqlitePool, to: &str) -> Result<Vec<MessageRecord>> {
    let rows = sqlx::query_as::<_, MessageRecord>(
        r#"
        SELECT id, from_addr, to_addr, type, subject, body, read, created_at
        FROM   messages
        WHERE  to_addr = ?1
        ORDER  BY created_at DESC, id DESC
        "#,
    )
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// `false` when no message `id` is addressed to `to`.
pub async fn mark_read(pool: &SqlitePool, id: i64, to: &str) -> Result<bool> {
    let rows = sqlx::query("UPDATE messages SET read = 1 WHERE id = ?1 AND to_addr = ?2")
        .bind(id)
        .bind(to)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows == 1)
}
