// bimlib-core - Shared catalog vocabulary for the BIM model library

pub mod fields;
pub mod format;
pub mod types;

pub use fields::{ModelForm, ModelMetadata, FILE_FIELD, MODEL_FIELD};
pub use format::{validate_upload, ModelFormat, ValidationError, DEFAULT_MAX_UPLOAD_BYTES};
pub use types::{
    ErrorBody, FileStatus, HealthReport, ModelRecord, ModelView, StoredFileResponse,
    UploadResponse,
};
