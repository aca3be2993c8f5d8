//! Application-wide error types and their HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use trip_escrow::TripError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] TripError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Stored data that no longer parses into domain types.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A conditional update kept losing to concurrent writers.
    #[error("Contention: {0}")]
    Contention(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Malformed or mistyped JSON bodies are validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Domain(TripError::validation(rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

fn status_for(err: &TripError) -> StatusCode {
    match err {
        TripError::Validation(_) => StatusCode::BAD_REQUEST,
        TripError::Forbidden(_) => StatusCode::FORBIDDEN,
        TripError::NotFound(_) => StatusCode::NOT_FOUND,
        TripError::TripNotOpen
        | TripError::AlreadyCheckedIn
        | TripError::DuplicateCode
        | TripError::DuplicateTripId
        | TripError::ProfileLocked => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Domain(e) => (
                status_for(e),
                ErrorResponse {
                    error: e.to_string(),
                    code: e.code(),
                },
            ),
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: msg.clone(),
                    code: "UNAUTHORIZED",
                },
            ),
            other => {
                error!("Unhandled error: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        code: "INTERNAL",
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
