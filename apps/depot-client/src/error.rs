//! Client-side error taxonomy.
//!
//! Transport-level failures (the server could not be reached) are a
//! distinct class from HTTP error statuses; callers map both to user-facing
//! messages and never see a raised error cross into the presentation layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("cannot reach the server: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned status {status}")]
    Status { status: u16, body: String },

    /// A success response body did not decode.
    #[error("malformed server response: {0}")]
    Decode(#[source] reqwest::Error),

    /// Bad endpoint or request construction.
    #[error("{0}")]
    Config(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}
