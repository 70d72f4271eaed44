//! Upload listing route

use axum::extract::State;
use axum::{routing::get, Json, Router};

use crate::auth::CurrentUser;
use crate::db::{FileUpload, UploadRepository};
use crate::error::Result;
use crate::state::AppState;

/// Create the files router
pub fn router() -> Router<AppState> {
    Router::new().route("/files", get(list_files))
}

/// GET /files
///
/// Returns every upload record with its uploader and timestamp. No
/// pagination; the listing is small-scale by design.
async fn list_files(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<FileUpload>>> {
    let uploads = UploadRepository::new(state.db()).list().await?;
    Ok(Json(uploads))
}
