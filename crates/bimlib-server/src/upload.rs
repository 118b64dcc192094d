//! Multipart upload intake.
//!
//! Reads an upload form field by field, streaming the file part straight
//! into the blob area and collecting text parts into a [`ModelForm`].

use axum::extract::multipart::{Field, Multipart};
use bimlib_core::fields::sanitize_file_name;
use bimlib_core::{ModelForm, ModelFormat};

use crate::blob::{BlobStore, PendingBlob};
use crate::error::AppError;

/// Everything received from one multipart upload.
#[derive(Debug, Default)]
pub struct ReceivedUpload {
    pub form: ModelForm,
    /// The first file part found under the expected field name.
    pub blob: Option<PendingBlob>,
}

/// Reads every part of `multipart`.
///
/// Only the first part named `file_field` is stored; later ones are skipped.
/// Unknown text fields are ignored. If any part fails, the stored file is
/// removed along with the returned error.
pub async fn receive_upload(
    multipart: &mut Multipart,
    blobs: &BlobStore,
    file_field: &str,
    max_bytes: u64,
) -> Result<ReceivedUpload, AppError> {
    let mut received = ReceivedUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::from_multipart(e, max_bytes))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            if received.blob.is_none() {
                received.blob = Some(receive_file(field, blobs, max_bytes).await?);
            }
            continue;
        }

        if field.file_name().is_some() {
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::from_multipart(e, max_bytes))?;
        received.form.set_field(&name, value);
    }

    Ok(received)
}

/// Validates the file part's name and streams its bytes to a new blob.
async fn receive_file(
    mut field: Field<'_>,
    blobs: &BlobStore,
    max_bytes: u64,
) -> Result<PendingBlob, AppError> {
    let original = sanitize_file_name(field.file_name().unwrap_or_default())?;
    ModelFormat::from_file_name(&original)?;

    let mut blob = blobs
        .create(&original)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload file: {}", e)))?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::from_multipart(e, max_bytes))?
    {
        if blob.size() + chunk.len() as u64 > max_bytes {
            tracing::warn!(file = %original, max_bytes, "Upload exceeds size limit");
            return Err(AppError::PayloadTooLarge { max: max_bytes });
        }
        blob.write_chunk(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write upload file: {}", e)))?;
    }

    blob.finish()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to flush upload file: {}", e)))?;

    tracing::debug!(
        original = %original,
        stored = %blob.stored_name(),
        size = blob.size(),
        "File stored"
    );
    Ok(blob)
}
