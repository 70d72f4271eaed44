//! Wire types shared with the server.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for `/register` and `/login`. The password is a secret and
/// must never be logged.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub jwt_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
}

/// One entry of the remote upload listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    pub filename: String,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

impl fmt::Display for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render the timestamp in local human-readable form when it parses,
        // raw otherwise.
        let when = DateTime::parse_from_rfc3339(&self.uploaded_at)
            .map(|dt| dt.format("%c").to_string())
            .unwrap_or_else(|_| self.uploaded_at.clone());
        write!(f, "{} - uploaded by {} ({})", self.filename, self.uploaded_by, when)
    }
}
