//! `/trips` handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use trip_escrow::code::normalize_code;
use trip_escrow::{Octas, PaymentStatus, Trip, TripDraft, TripError};

use super::SharedState;
use crate::db;
use crate::db::participants::ParticipantRecord;
use crate::errors::Result;
use crate::lifecycle::{self, Cancellation, CheckIn, Confirmation, Created};

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckinRequest {
    pub wallet_address: Option<String>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub tx_hash: Option<String>,
    pub amount_octas: Option<Octas>,
    pub status: Option<PaymentStatus>,
    pub network: Option<String>,
}

#[derive(Serialize)]
pub struct CheckinResponse {
    pub success: bool,
    pub participants: u64,
}

/// Body of confirm, cancel and delete.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrganizerRequest {
    pub wallet_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoveParticipantRequest {
    pub organizer: Option<String>,
    pub participant_wallet: Option<String>,
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

#[derive(Serialize)]
pub struct FundsResponse {
    pub octas: Octas,
}

// ─────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────

/// `GET /trips`
pub async fn list_public(State(state): State<SharedState>) -> Result<Json<Vec<Trip>>> {
    Ok(Json(db::trips::list_public(&state.pool).await?))
}

/// `GET /trips/organizer/:wallet`
pub async fn by_organizer(
    State(state): State<SharedState>,
    Path(wallet): Path<String>,
) -> Result<Json<Vec<Trip>>> {
    Ok(Json(db::trips::list_by_organizer(&state.pool, &wallet).await?))
}

/// `GET /trips/participant/:wallet`
pub async fn by_participant(
    State(state): State<SharedState>,
    Path(wallet): Path<String>,
) -> Result<Json<Vec<Trip>>> {
    Ok(Json(db::trips::list_by_participant(&state.pool, &wallet).await?))
}

/// `GET /trips/:id`
pub async fn get_one(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<Trip>> {
    db::trips::get_by_id(&state.pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| TripError::not_found("Trip").into())
}

/// `GET /trips/code/:code`, case-insensitive.
pub async fn by_code(State(state): State<SharedState>, Path(code): Path<String>) -> Result<Json<Trip>> {
    db::trips::get_by_code(&state.pool, &normalize_code(&code))
        .await?
        .map(Json)
        .ok_or_else(|| TripError::not_found("Trip").into())
}

/// `GET /trips/:id/participants`, oldest check-in first.
pub async fn participants(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ParticipantRecord>>> {
    if db::trips::get_by_id(&state.pool, &id).await?.is_none() {
        return Err(TripError::not_found("Trip").into());
    }
    Ok(Json(db::participants::list(&state.pool, &id).await?))
}

/// `GET /trips/:id/funds`
pub async fn funds(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<FundsResponse>> {
    let octas = lifecycle::trip_funds(&state.pool, &id).await?;
    Ok(Json(FundsResponse { octas }))
}

/// `GET /trips/funds/total`
pub async fn total_funds(State(state): State<SharedState>) -> Result<Json<FundsResponse>> {
    let octas = lifecycle::total_funds(&state.pool).await?;
    Ok(Json(FundsResponse { octas }))
}

// ─────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────

/// `POST /trips`
///
/// 201 with the new trip, or 200 with the trip this organizer already
/// created under the same title and date.
pub async fn create(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<TripDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Trip>)> {
    let Json(draft) = payload?;
    Ok(match lifecycle::create_trip(&state.pool, draft).await? {
        Created::New(trip) => (StatusCode::CREATED, Json(trip)),
        Created::Existing(trip) => (StatusCode::OK, Json(trip)),
    })
}

/// `POST /trips/:id/checkin`
pub async fn checkin(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<CheckinRequest>, JsonRejection>,
) -> Result<Json<CheckinResponse>> {
    let Json(req) = payload?;
    let participants = lifecycle::checkin(
        &state.pool,
        &id,
        CheckIn {
            wallet_address: req.wallet_address,
            name: req.name,
            age: req.age,
            tx_hash: req.tx_hash,
            amount_octas: req.amount_octas,
            status: req.status,
            network: req.network,
        },
    )
    .await?;
    Ok(Json(CheckinResponse {
        success: true,
        participants,
    }))
}

/// `POST /trips/:id/confirm`
pub async fn confirm(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<OrganizerRequest>, JsonRejection>,
) -> Result<Json<Confirmation>> {
    let Json(req) = payload?;
    let out = lifecycle::confirm(&state.pool, &id, req.wallet_address.as_deref()).await?;
    Ok(Json(out))
}

/// `POST /trips/:id/cancel`
pub async fn cancel(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<OrganizerRequest>, JsonRejection>,
) -> Result<Json<Cancellation>> {
    let Json(req) = payload?;
    let out = lifecycle::cancel(&state.pool, &id, req.wallet_address.as_deref()).await?;
    Ok(Json(out))
}

/// `POST /trips/:id/remove-participant`
pub async fn remove_participant(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<RemoveParticipantRequest>, JsonRejection>,
) -> Result<Json<OkResponse>> {
    let Json(req) = payload?;
    lifecycle::remove_participant(
        &state.pool,
        &id,
        req.organizer.as_deref(),
        req.participant_wallet.as_deref(),
        req.reason.as_deref(),
    )
    .await?;
    Ok(Json(OkResponse { ok: true }))
}

/// `DELETE /trips/:id`
pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<OrganizerRequest>, JsonRejection>,
) -> Result<Json<DeletedResponse>> {
    let Json(req) = payload?;
    lifecycle::delete_trip(&state.pool, &id, req.wallet_address.as_deref()).await?;
    Ok(Json(DeletedResponse { deleted: true }))
}
