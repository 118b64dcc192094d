//! Error types for the catalog server.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bimlib_core::{ErrorBody, ValidationError};

use crate::store::StoreError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A record exists but its file is gone from the blob area.
    #[error("File not found: {0}")]
    FileMissing(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Upload exceeds the maximum size of {max} bytes")]
    PayloadTooLarge { max: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::TooLarge { max, .. } => AppError::PayloadTooLarge { max },
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// Maps a multipart read failure, keeping body-limit rejections as 413.
    pub fn from_multipart(err: MultipartError, max: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge { max }
        } else {
            AppError::BadRequest(err.body_text())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) | AppError::FileMissing(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "Record store error");
                ErrorBody::new(e.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorBody::new("Internal server error")
            }
            AppError::FileMissing(name) => ErrorBody {
                error: "File not found".to_string(),
                message: Some(format!(
                    "The file '{}' is no longer stored on this server. Please re-upload the model.",
                    name
                )),
            },
            other => ErrorBody::new(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
