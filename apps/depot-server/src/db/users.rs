//! User database operations

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{conflict_on_unique, Result};

/// User record. Created on registration, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub password_hash: String,
}

/// User repository
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a user by username
    pub async fn find(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Check whether a username is taken
    pub async fn exists(&self, username: &str) -> Result<bool> {
        Ok(self.find(username).await?.is_some())
    }

    /// Insert a new user. Losing a race against a concurrent registration
    /// of the same username yields `Conflict`.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<()> {
        sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Username already exists."))?;

        Ok(())
    }
}
