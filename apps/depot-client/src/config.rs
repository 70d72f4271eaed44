//! Client configuration.

use std::env;
use std::time::Duration;

/// Tunables for the client. All values have defaults and can be overridden
/// from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server endpoint, e.g. `http://localhost:8000`.
    pub endpoint: String,
    /// Cadence of the uploaded-files listing poll.
    pub poll_interval: Duration,
    /// Upload chunk size in bytes.
    pub chunk_size: usize,
}

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let poll_interval = env::var("DEPOT_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let chunk_size = env::var("DEPOT_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        ClientConfig {
            endpoint: env::var("DEPOT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            poll_interval,
            chunk_size,
        }
    }
}
