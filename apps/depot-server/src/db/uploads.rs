//! Upload record database operations

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{conflict_on_unique, Result};

/// Upload record. Created exactly once per filename on successful upload
/// completion, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileUpload {
    pub filename: String,
    pub uploaded_by: String,
    /// RFC 3339 timestamp of when the upload completed.
    pub uploaded_at: String,
}

/// Upload repository
pub struct UploadRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UploadRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Check whether a filename was already uploaded
    pub async fn exists(&self, filename: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM uploads WHERE filename = ?")
            .bind(filename)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Register a completed upload. Losing a race against a concurrent
    /// upload of the same filename yields `Conflict`.
    pub async fn create(&self, filename: &str, uploaded_by: &str, uploaded_at: &str) -> Result<()> {
        sqlx::query("INSERT INTO uploads (filename, uploaded_by, uploaded_at) VALUES (?, ?, ?)")
            .bind(filename)
            .bind(uploaded_by)
            .bind(uploaded_at)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Filename already exists."))?;

        Ok(())
    }

    /// List all upload records in insertion order.
    pub async fn list(&self) -> Result<Vec<FileUpload>> {
        let uploads = sqlx::query_as::<_, FileUpload>(
            "SELECT filename, uploaded_by, uploaded_at FROM uploads ORDER BY rowid",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(uploads)
    }
}
