//! Wallet login: single-use nonces and HS256 session tokens.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use trip_escrow::TripError;

use crate::config::Config;
use crate::db;
use crate::errors::{ApiError, Result};

const NONCE_BYTES: usize = 16;

/// Session token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Wallet address the session was issued for
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Nonces are keyed by the lowercased wallet so `0xAB` and `0xab` share one.
fn wallet_key(wallet: &str) -> Result<String> {
    let wallet = wallet.trim();
    if wallet.is_empty() {
        return Err(TripError::validation("walletAddress required").into());
    }
    Ok(wallet.to_lowercase())
}

/// Issue a fresh nonce for `wallet`, replacing any earlier one.
pub async fn issue_nonce(pool: &SqlitePool, config: &Config, wallet: &str) -> Result<String> {
    let key = wallet_key(wallet)?;
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let nonce = hex::encode(bytes);

    let ttl = i64::try_from(config.nonce_ttl_secs).unwrap_or(i64::MAX);
    let expires_at = db::now_unix().saturating_add(ttl);
    db::nonces::issue(pool, &key, &nonce, expires_at).await?;
    debug!("Nonce issued for {key}, expires at {expires_at}");
    Ok(nonce)
}

/// Consume `nonce` and sign a session token for `wallet`.
pub async fn verify_nonce(pool: &SqlitePool, config: &Config, wallet: &str, nonce: &str) -> Result<String> {
    let key = wallet_key(wallet)?;
    if !db::nonces::consume(pool, &key, nonce.trim(), db::now_unix()).await? {
        return Err(TripError::validation("Invalid or expired nonce").into());
    }
    issue_token(config, wallet.trim())
}

pub fn issue_token(config: &Config, wallet: &str) -> Result<String> {
    let iat = u64::try_from(db::now_unix()).unwrap_or(0);
    let claims = Claims {
        sub: wallet.to_string(),
        iat,
        exp: iat.saturating_add(config.token_ttl_secs),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;
    Ok(token)
}

/// Validate signature and expiry of a session token.
pub fn verify_token(config: &Config, token: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| ApiError::Unauthorized(format!("Invalid session token: {e}")))?;
    Ok(data.claims)
}
