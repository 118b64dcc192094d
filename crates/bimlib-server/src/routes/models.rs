//! Catalog record endpoints.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use bimlib_core::fields::file_path_for;
use bimlib_core::{ModelRecord, ModelView, UploadResponse, MODEL_FIELD};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::NewModel;
use crate::state::AppState;
use crate::upload::receive_upload;

/// Read routes, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/models", get(list_models))
        .route("/models/{id}", get(get_model))
}

/// Upload route, mounted under `/api` behind the body-size limit.
pub fn upload_router() -> Router<AppState> {
    Router::new().route("/upload", post(upload_model))
}

/// POST /api/upload
///
/// Stores the `model` file part and creates a record for it from the text
/// parts. The record is only written after the file is safely on disk; if
/// writing the record fails the file is removed again.
async fn upload_model(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    let received = receive_upload(
        &mut multipart,
        &state.blobs,
        MODEL_FIELD,
        state.max_upload_bytes,
    )
    .await?;

    let Some(blob) = received.blob else {
        tracing::info!("Upload rejected: no file part");
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    };

    let new_model = NewModel::new(
        received.form.into_metadata(),
        file_path_for(blob.stored_name()),
        blob.size(),
        blob.original_name().to_string(),
    );

    // `blob` is dropped, and its file removed, if this fails.
    let record = state.store.insert(new_model).await?;
    blob.commit();

    tracing::info!(
        id = %record.id,
        file_path = %record.file_path,
        size = ?record.file_size,
        "Model uploaded"
    );
    Ok(Json(UploadResponse::created(record)))
}

/// GET /api/models
///
/// Returns every record, newest first, annotated with whether its file is
/// still present.
async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelView>>, AppError> {
    let records = state.store.list().await?;

    let mut views = Vec::with_capacity(records.len());
    for record in records {
        views.push(annotate(&state, record).await);
    }

    tracing::debug!(count = views.len(), "Listed models");
    Ok(Json(views))
}

/// GET /api/models/{id}
///
/// A malformed id is a client error (400), distinct from an unknown id (404).
async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModelView>, AppError> {
    let id = parse_model_id(&id)?;

    let record = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Model '{}' not found", id)))?;

    Ok(Json(annotate(&state, record).await))
}

async fn annotate(state: &AppState, record: ModelRecord) -> ModelView {
    let exists = state.blobs.exists_for_path(&record.file_path).await;
    if !exists {
        tracing::warn!(id = %record.id, file_path = %record.file_path, "Model file missing");
    }
    ModelView::new(record, exists)
}

fn parse_model_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::BadRequest(format!("Invalid model id: '{}'", id)))
}
