//! Error types for the Depot server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input (username length, empty password, missing file field).
    #[error("{0}")]
    Validation(String),

    /// Duplicate username or filename.
    #[error("{0}")]
    Conflict(String),

    /// Unknown username at login.
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid bearer credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Wrong password.
    #[error("{0}")]
    Forbidden(String),

    #[error("multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

/// Map a failed insert to `Conflict` when the storage-level uniqueness
/// constraint rejected it. The constraint is the source of truth for
/// duplicates; pre-checks are only a fast path.
pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match err.as_database_error() {
        Some(db_err) if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::FORBIDDEN, "unauthorized", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Multipart(e) => (StatusCode::BAD_REQUEST, "bad_request", e.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "IO error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
