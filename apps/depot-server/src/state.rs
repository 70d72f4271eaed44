//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::token::TokenService;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let tokens = TokenService::new(config.auth.secret.clone());
        Self {
            inner: Arc::new(AppStateInner { config, db, tokens }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the token service
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
