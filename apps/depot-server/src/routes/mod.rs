//! HTTP routes
//!
//! - `POST /register`, `POST /login`: account creation and token issuance
//! - `GET /files`: authenticated listing of upload records
//! - `POST /upload`: authenticated streaming multipart upload
//! - `GET /health`: liveness probe

pub mod auth;
pub mod files;
pub mod upload;

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(auth::router())
        .merge(files::router())
        .merge(upload::router())
        .with_state(state)
}
