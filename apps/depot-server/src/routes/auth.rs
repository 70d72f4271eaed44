//! Registration and login routes

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{password, AUTH_COOKIE};
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 12;

/// Request body for both `/register` and `/login`. The password is a
/// secret: it is never logged and never echoed back.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub jwt_token: String,
}

/// Create the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

fn validate(credentials: &Credentials) -> Result<()> {
    let len = credentials.username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AppError::Validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if credentials.password.is_empty() {
        return Err(AppError::Validation("password must not be empty".to_string()));
    }
    Ok(())
}

/// POST /register
async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<RegisterResponse>> {
    validate(&credentials)?;

    let repo = UserRepository::new(state.db());
    if repo.exists(&credentials.username).await? {
        tracing::info!(username = %credentials.username, "tried to register existing username");
        return Err(AppError::Conflict("Username already exists.".to_string()));
    }

    let password_hash = password::hash_password(&credentials.password);
    repo.create(&credentials.username, &password_hash).await?;

    tracing::info!(username = %credentials.username, "registered user");
    Ok(Json(RegisterResponse {
        username: credentials.username,
    }))
}

/// POST /login
///
/// On success the token is returned in the body and set as a bearer cookie
/// so subsequent requests carry it automatically.
async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let repo = UserRepository::new(state.db());
    let user = repo
        .find(&credentials.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    if !password::verify_password(&user.password_hash, &credentials.password) {
        tracing::info!(username = %credentials.username, "tried to login with wrong password");
        return Err(AppError::Forbidden(format!(
            "Invalid password for username {}",
            credentials.username
        )));
    }

    let token = state.tokens().issue(&user.username);
    tracing::info!(username = %user.username, "logged in");

    let cookie = format!("{AUTH_COOKIE}=Bearer {token}");
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            username: user.username,
            jwt_token: token,
        }),
    ))
}
