//! Authentication: password hashing, bearer tokens, and request extraction.

pub mod password;
pub mod token;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the cookie carrying the bearer credential.
pub const AUTH_COOKIE: &str = "Authorization";

/// Username extracted from a valid bearer credential.
///
/// The credential is carried as a cookie named `Authorization` with value
/// `Bearer <token>`. Absent or invalid credentials reject the request with
/// 403 before the handler runs.
pub struct CurrentUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_from_cookies(parts).ok_or_else(|| {
            AppError::Unauthorized("You need to login to use this feature.".to_string())
        })?;

        let username = state
            .tokens()
            .validate(&token)
            .map_err(|_| AppError::Unauthorized("Invalid credential.".to_string()))?;

        Ok(CurrentUser(username))
    }
}

/// Pull the token out of the `Authorization` cookie. The cookie value is
/// `Bearer <token>`; the token is everything after the last space.
fn bearer_from_cookies(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name != AUTH_COOKIE {
            return None;
        }
        value.rsplit(' ').next().map(str::to_string)
    })
}
