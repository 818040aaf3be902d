//! Upload, search, preview, download, move, delete and folder endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use crate::application::dto::UploadRequest;
use crate::domain::media_types::{MediaCategory, mime_from_filename};
use crate::presentation::http::error::ApiError;
use crate::presentation::http::response::success;
use crate::presentation::http::state::AppState;

/// `POST /file/upload`
pub async fn upload(
    State(state): State<AppState>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let stored = state.uploads.execute(request).await?;
    Ok(success("Files uploaded successfully", stored))
}

/// Query string of `GET /file/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Substring to look for.
    pub q: Option<String>,
    /// `image` or `office`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `GET /file/search?q=&type=`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::BadRequest(
            "Query parameter 'q' is required.".to_string(),
        ));
    }

    let category = match params.kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(filter) => Some(MediaCategory::from_filter(filter).ok_or_else(|| {
            ApiError::BadRequest(format!("Unknown type filter '{filter}'."))
        })?),
    };

    let hits = state.storage.search(query, category).await?;
    Ok(success("Files retrieved successfully.", hits))
}

async fn read_stored(state: &AppState, filename: &str) -> Result<(PathBuf, Vec<u8>), ApiError> {
    let not_found = || ApiError::NotFound("File not found.".to_string());

    let path = state.storage.find(filename).await.ok_or_else(not_found)?;
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok((path, bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// `GET /file/preview/{filename}`
pub async fn preview(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (path, bytes) = read_stored(&state, &filename).await?;

    debug!(path = %path.display(), size = bytes.len(), "Serving preview");
    Ok(([(CONTENT_TYPE, mime_from_filename(&filename))], bytes).into_response())
}

/// `GET /file/download/{filename}`
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (path, bytes) = read_stored(&state, &filename).await?;
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));

    debug!(path = %path.display(), size = bytes.len(), "Serving download");
    Ok((
        [
            (CONTENT_TYPE, mime_from_filename(&filename).to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Body of `PUT /file/move/{filename}`.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// Target folder below the primary storage directory.
    #[serde(default)]
    pub destination: String,
}

/// `PUT /file/move/{filename}`
pub async fn move_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let moved = state
        .storage
        .move_file(&filename, &request.destination)
        .await?;
    Ok(success("File moved successfully.", moved))
}

/// `DELETE /file/delete/{filename}`
pub async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.storage.delete_file(&filename).await?;
    Ok(success(
        "File deleted successfully.",
        serde_json::json!({ "filename": filename, "path": path }),
    ))
}

/// `GET /folder`
pub async fn folder_root(State(state): State<AppState>) -> Result<Response, ApiError> {
    folder_listing(&state, "").await
}

/// `GET /folder/{*path}`
pub async fn folder(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    folder_listing(&state, &path).await
}

async fn folder_listing(state: &AppState, relative: &str) -> Result<Response, ApiError> {
    let tree = state.storage.folder_tree(relative).await?;
    Ok(success("Folder structure retrieved successfully.", tree))
}
