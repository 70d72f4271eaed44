//! Streaming file upload route

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::{routing::post, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::auth::CurrentUser;
use crate::db::UploadRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
}

/// Create the upload router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::disable())
}

/// POST /upload
///
/// Accepts a multipart body with a `file` field and streams it to disk
/// chunk by chunk; the whole file is never held in memory. The upload
/// record is inserted only after the stream completes, so a cancelled or
/// severed transfer leaves at most an orphaned partial file and no record.
async fn upload_file(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(sanitize_filename)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Validation("file field has no filename".to_string()))?;

        let repo = UploadRepository::new(state.db());
        // Fast-path duplicate check before reading any of the body; the
        // primary key on `filename` still decides the winner if two uploads
        // race past this point.
        if repo.exists(&filename).await? {
            tracing::info!(filename = %filename, "tried to upload existing filename");
            return Err(AppError::Conflict("Filename already exists.".to_string()));
        }

        let dest = state.config().storage.upload_dir.join(&filename);
        // `create_new` loses to whichever racing upload created the file
        // first, and also refuses names left behind by a severed transfer.
        // Both cases are duplicates from the client's point of view.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .await
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::AlreadyExists {
                    AppError::Conflict("Filename already exists.".to_string())
                } else {
                    AppError::Io(err)
                }
            })?;

        let mut written: u64 = 0;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        let uploaded_at = Utc::now().to_rfc3339();
        repo.create(&filename, &username, &uploaded_at).await?;

        tracing::info!(
            filename = %filename,
            uploaded_by = %username,
            bytes = written,
            "stored uploaded file"
        );
        return Ok(Json(UploadResponse { filename }));
    }

    Err(AppError::Validation(
        "missing multipart field \"file\"".to_string(),
    ))
}

/// Reduce a client-supplied filename to its final path component so the
/// destination always stays inside the upload directory.
fn sanitize_filename(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
