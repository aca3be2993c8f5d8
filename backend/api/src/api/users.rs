//! `/users` handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use trip_escrow::TripError;

use super::SharedState;
use crate::db;
use crate::db::users::{ProfileUpdate, User};
use crate::errors::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub profile_image: Option<String>,
    pub age: Option<i64>,
}

/// `GET /users/:wallet`
pub async fn get_one(State(state): State<SharedState>, Path(wallet): Path<String>) -> Result<Json<User>> {
    db::users::get(&state.pool, &wallet)
        .await?
        .map(Json)
        .ok_or_else(|| TripError::not_found("User").into())
}

/// `PUT /users/:wallet`
///
/// Omitted fields keep their stored value. A registered profile only
/// accepts a new profile image.
pub async fn update(
    State(state): State<SharedState>,
    Path(wallet): Path<String>,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let Json(req) = payload?;
    if req.age.is_some_and(|age| age < 0) {
        return Err(TripError::validation("age must not be negative").into());
    }
    let update = ProfileUpdate {
        username: req.username.as_deref(),
        profile_image: req.profile_image.as_deref(),
        age: req.age,
    };
    Ok(Json(db::users::upsert_profile(&state.pool, &wallet, update).await?))
}
