//! Stored file endpoints.

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bimlib_core::fields::{file_path_for, is_safe_stored_name};
use bimlib_core::{ModelFormat, StoredFileResponse, FILE_FIELD};
use tokio_util::io::ReaderStream;

use crate::error::AppError;
use crate::state::AppState;
use crate::upload::receive_upload;

/// Fallback content type for files whose extension is not a model format.
const OCTET_STREAM: &str = "application/octet-stream";

/// Download route for stored files.
pub fn router() -> Router<AppState> {
    Router::new().route("/uploads/{filename}", get(serve_file))
}

/// Record-less upload route, mounted behind the body-size limit.
pub fn upload_router() -> Router<AppState> {
    Router::new().route("/upload", post(store_file))
}

/// GET /uploads/{filename}
///
/// Streams a stored file. Files may vanish independently of their records,
/// so a missing file is a 404 asking the caller to re-upload.
async fn serve_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if !is_safe_stored_name(&filename) {
        return Err(AppError::BadRequest(format!("Invalid file name: '{}'", filename)));
    }

    let Some((file, len)) = state
        .blobs
        .open(&filename)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to open '{}': {}", filename, e)))?
    else {
        tracing::warn!(file = %filename, "Requested file is missing");
        return Err(AppError::FileMissing(filename));
    };

    let content_type = ModelFormat::from_file_name(&filename)
        .map(ModelFormat::content_type)
        .unwrap_or(OCTET_STREAM);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

/// POST /upload
///
/// Stores a single `file` part without creating a catalog record.
async fn store_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StoredFileResponse>, AppError> {
    let mut multipart = multipart?;
    let received = receive_upload(
        &mut multipart,
        &state.blobs,
        FILE_FIELD,
        state.max_upload_bytes,
    )
    .await?;

    let Some(blob) = received.blob else {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    };

    let filename = blob.commit();
    tracing::info!(file = %filename, "File uploaded without record");

    Ok(Json(StoredFileResponse {
        message: "File uploaded successfully".to_string(),
        path: file_path_for(&filename),
        filename,
    }))
}
