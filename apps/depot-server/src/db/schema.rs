//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

// The primary keys on `username` and `filename` are the backstop for
// concurrent duplicate registrations/uploads; handlers only pre-check as a
// fast path.
const SCHEMA_SQL: &str = r#"
-- Registered users
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Upload records, one per filename
CREATE TABLE IF NOT EXISTS uploads (
    filename TEXT PRIMARY KEY,
    uploaded_by TEXT NOT NULL REFERENCES users(username),
    uploaded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_uploads_uploaded_by ON uploads(uploaded_by);
"#;
