//! Background login/registration flow.
//!
//! Each attempt runs on its own task and reports exactly one terminal
//! `AuthEvent` over the channel, so the interactive surface stays
//! responsive and can re-enable itself on any outcome. Failures are
//! translated into user-facing messages here; no error crosses the channel
//! raw. There are no automatic retries.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::types::Credentials;

/// Terminal result of a login or registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn { username: String },
    Registered { username: String },
    Failed { message: String },
}

pub const CONNECTION_FAILED: &str = "Could not connect to the server.";
pub const GENERIC_FAILURE: &str = "Something went wrong.";

/// Fixed status-to-message table, used identically for login and register.
pub fn failure_message(status: u16) -> &'static str {
    match status {
        403 => "Incorrect username or password.",
        404 => "User not found.",
        409 => "Username already exists.",
        422 => "Invalid username or password.",
        _ => GENERIC_FAILURE,
    }
}

/// Translate any client error into a user-facing message.
pub fn describe_failure(err: &ClientError) -> &'static str {
    match err {
        ClientError::Transport(_) => CONNECTION_FAILED,
        ClientError::Status { status, .. } => failure_message(*status),
        _ => GENERIC_FAILURE,
    }
}

/// Run a login attempt in the background.
pub fn spawn_login(
    api: ApiClient,
    credentials: Credentials,
    events: mpsc::UnboundedSender<AuthEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let event = match api.login(&credentials).await {
            Ok(response) => {
                tracing::info!(username = %response.username, "login successful");
                AuthEvent::LoggedIn {
                    username: response.username,
                }
            }
            Err(err) => {
                tracing::info!(error = %err, "login failed");
                AuthEvent::Failed {
                    message: describe_failure(&err).to_string(),
                }
            }
        };
        let _ = events.send(event);
    })
}

/// Run a registration attempt in the background.
pub fn spawn_register(
    api: ApiClient,
    credentials: Credentials,
    events: mpsc::UnboundedSender<AuthEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let event = match api.register(&credentials).await {
            Ok(response) => {
                tracing::info!(username = %response.username, "registration successful");
                AuthEvent::Registered {
                    username: response.username,
                }
            }
            Err(err) => {
                tracing::info!(error = %err, "registration failed");
                AuthEvent::Failed {
                    message: describe_failure(&err).to_string(),
                }
            }
        };
        let _ = events.send(event);
    })
}
