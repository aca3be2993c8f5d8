//! `/messages` handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use trip_escrow::{MessageKind, TripError};

use super::SharedState;
use crate::db;
use crate::db::messages::MessageRecord;
use crate::errors::Result;

/// Recipient of messages sent without an explicit `to`.
const ADMIN_INBOX: &str = "admin";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<MessageKind>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkReadRequest {
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct SentResponse {
    pub id: i64,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `POST /messages`: bug reports default to the admin inbox.
pub async fn send(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<SendRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SentResponse>)> {
    let Json(req) = payload?;
    let missing = || TripError::validation("from and body are required");
    let from = non_blank(req.from).ok_or_else(missing)?;
    let body = non_blank(req.body).ok_or_else(missing)?;
    let to = non_blank(req.to).unwrap_or_else(|| ADMIN_INBOX.to_string());

    let id = db::messages::send(
        &state.pool,
        &from,
        &to,
        req.kind.unwrap_or_default(),
        req.subject.as_deref(),
        &body,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(SentResponse { id })))
}

/// `GET /messages/inbox/:wallet`, newest first.
pub async fn inbox(
    State(state): State<SharedState>,
    Path(wallet): Path<String>,
) -> Result<Json<Vec<MessageRecord>>> {
    Ok(Json(db::messages::inbox(&state.pool, &wallet).await?))
}

/// `POST /messages/:id/read`
pub async fn mark_read(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<MarkReadRequest>, JsonRejection>,
) -> Result<Json<OkResponse>> {
    let Json(req) = payload?;
    let to = non_blank(req.to).ok_or_else(|| TripError::validation("id and to are required"))?;
    if !db::messages::mark_read(&state.pool, id, &to).await? {
        return Err(TripError::not_found("Message").into());
    }
    Ok(Json(OkResponse { ok: true }))
}
