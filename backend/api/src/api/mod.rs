//! Axum REST API: router assembly and shared handler plumbing.
//!
//! Handlers are thin. They parse the request, call into [`crate::lifecycle`],
//! [`crate::auth`] or the store, and let [`ApiError`](crate::errors::ApiError)
//! pick the status code.

mod auth;
mod messages;
mod trips;
mod users;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub config: Config,
}

pub type SharedState = Arc<ApiState>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Every route, nested under `/api`.
pub fn router(state: ApiState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        // ─── Trips ────────────────────────────────────────
        .route("/trips", get(trips::list_public).post(trips::create))
        .route("/trips/funds/total", get(trips::total_funds))
        .route("/trips/organizer/:wallet", get(trips::by_organizer))
        .route("/trips/participant/:wallet", get(trips::by_participant))
        .route("/trips/code/:code", get(trips::by_code))
        .route("/trips/:id", get(trips::get_one).delete(trips::delete))
        .route("/trips/:id/participants", get(trips::participants))
        .route("/trips/:id/funds", get(trips::funds))
        .route("/trips/:id/checkin", post(trips::checkin))
        .route("/trips/:id/confirm", post(trips::confirm))
        .route("/trips/:id/cancel", post(trips::cancel))
        .route("/trips/:id/remove-participant", post(trips::remove_participant))
        // ─── Users & auth ─────────────────────────────────
        .route("/users/:wallet", get(users::get_one).put(users::update))
        .route("/auth/nonce", get(auth::nonce_query).post(auth::nonce_body))
        .route("/auth/verify", post(auth::verify))
        .route("/auth/session", get(auth::session))
        .route("/auth/petra", post(auth::petra_login))
        .route("/auth/petra/verify", post(auth::petra_verify))
        .route("/auth/register", post(auth::register))
        .route("/wallet/:wallet/profile", get(auth::wallet_profile))
        // ─── Messages ─────────────────────────────────────
        .route("/messages", post(messages::send))
        .route("/messages/inbox/:wallet", get(messages::inbox))
        .route("/messages/:id/read", post(messages::mark_read));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}


#[cfg(test)]
mod tests {
    use super::test_support::{app, call};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn health_is_under_api() {
        let app = app().await;
        let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, _) = call(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
