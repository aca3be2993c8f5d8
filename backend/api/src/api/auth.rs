//! `/auth` and `/wallet` handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use trip_escrow::profile::derive_wallet_profile;
use trip_escrow::{TripError, WalletProfile};

use super::SharedState;
use crate::auth;
use crate::db;
use crate::db::users::User;
use crate::errors::{ApiError, Result};

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NonceQuery {
    pub wallet: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WalletRequest {
    pub wallet_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyRequest {
    pub wallet_address: Option<String>,
    pub nonce: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub wallet_address: Option<String>,
    pub full_name: Option<String>,
    pub age: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceResponse {
    pub wallet_address: String,
    pub nonce: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub wallet_address: String,
    pub expires_at: u64,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetraVerifyResponse {
    pub verified: bool,
    pub wallet_address: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: User,
}

fn wallet_of(value: Option<String>) -> Result<String> {
    value
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .ok_or_else(|| TripError::validation("walletAddress is required").into())
}

// ─────────────────────────────────────────────────────────
// Nonce login
// ─────────────────────────────────────────────────────────

async fn nonce_for(state: &SharedState, wallet: Option<String>) -> Result<Json<NonceResponse>> {
    let wallet = wallet_of(wallet)?;
    let nonce = auth::issue_nonce(&state.pool, &state.config, &wallet).await?;
    Ok(Json(NonceResponse {
        wallet_address: wallet,
        nonce,
    }))
}

/// `GET /auth/nonce?wallet=`
pub async fn nonce_query(
    State(state): State<SharedState>,
    Query(query): Query<NonceQuery>,
) -> Result<Json<NonceResponse>> {
    nonce_for(&state, query.wallet).await
}

/// `POST /auth/nonce`
pub async fn nonce_body(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<WalletRequest>, JsonRejection>,
) -> Result<Json<NonceResponse>> {
    let Json(req) = payload?;
    nonce_for(&state, req.wallet_address).await
}

/// `POST /auth/verify`
pub async fn verify(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>> {
    let Json(req) = payload?;
    let wallet = wallet_of(req.wallet_address)?;
    let nonce = req
        .nonce
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| TripError::validation("nonce is required"))?;
    let token = auth::verify_nonce(&state.pool, &state.config, &wallet, &nonce).await?;
    Ok(Json(VerifyResponse {
        verified: true,
        token,
    }))
}

/// `GET /auth/session` with `Authorization: Bearer <token>`.
pub async fn session(State(state): State<SharedState>, headers: HeaderMap) -> Result<Json<SessionResponse>> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".into()))?;
    let claims = auth::verify_token(&state.config, token.trim())?;
    Ok(Json(SessionResponse {
        wallet_address: claims.sub,
        expires_at: claims.exp,
    }))
}

// ─────────────────────────────────────────────────────────
// Petra wallet login & registration
// ─────────────────────────────────────────────────────────

fn derived_profile(wallet: &str) -> Result<WalletProfile> {
    derive_wallet_profile(wallet).ok_or_else(|| TripError::validation("Invalid wallet address").into())
}

/// `POST /auth/petra`
///
/// Stores the wallet-derived profile unless the user already registered,
/// and returns the stored profile with a session token.
pub async fn petra_login(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<WalletRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(req) = payload?;
    let wallet = wallet_of(req.wallet_address)?;
    let profile = derived_profile(&wallet)?;
    let user = db::users::store_derived(&state.pool, &profile).await?;
    let token = auth::issue_token(&state.config, &wallet)?;
    Ok(Json(LoginResponse { user, token }))
}

/// `POST /auth/petra/verify`. Ownership is not checked.
pub async fn petra_verify(
    payload: std::result::Result<Json<WalletRequest>, JsonRejection>,
) -> Result<Json<PetraVerifyResponse>> {
    let Json(req) = payload?;
    Ok(Json(PetraVerifyResponse {
        verified: true,
        wallet_address: wallet_of(req.wallet_address)?,
    }))
}

/// `POST /auth/register`: set name and age once, then lock them.
pub async fn register(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>> {
    let Json(req) = payload?;
    let missing = || TripError::validation("walletAddress, fullName, and age are required");

    let wallet = wallet_of(req.wallet_address).map_err(|_| missing())?;
    let full_name = req
        .full_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(missing)?;
    let age = req.age.ok_or_else(missing)?;
    if age < 0 {
        return Err(TripError::validation("age must not be negative").into());
    }

    let user = db::users::register(&state.pool, &wallet, &full_name, age).await?;
    Ok(Json(RegisterResponse { user }))
}

/// `GET /wallet/:wallet/profile`
pub async fn wallet_profile(Path(wallet): Path<String>) -> Result<Json<WalletProfile>> {
    Ok(Json(derived_profile(&wallet)?))
}
