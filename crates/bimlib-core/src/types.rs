//! Type definitions for catalog records and API responses.
//!
//! These types are the JSON contract between the catalog service and its
//! clients. All of them serialize with camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry describing one uploaded 3D model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    /// Identifier assigned by the service at creation.
    pub id: Uuid,
    /// Display name of the model.
    pub name: String,
    /// Catalog category (e.g. "Furniture").
    pub category: String,
    /// Free-form description.
    pub description: String,
    /// Materials, in the order given at upload time.
    pub materials: Vec<String>,
    /// Specifications, in the order given at upload time.
    pub specifications: Vec<String>,
    /// URL path of the stored file, always `/uploads/<stored name>`.
    pub file_path: String,
    /// Size of the stored file in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// File name as supplied by the client, before renaming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// When the record was created.
    pub upload_date: DateTime<Utc>,
}

/// Whether the file behind a record is still present in the blob area.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Available,
    Missing,
}

impl From<bool> for FileStatus {
    fn from(exists: bool) -> Self {
        if exists {
            FileStatus::Available
        } else {
            FileStatus::Missing
        }
    }
}

/// A record annotated with the live state of its file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelView {
    #[serde(flatten)]
    pub record: ModelRecord,
    pub file_exists: bool,
    pub file_status: FileStatus,
}

impl ModelView {
    /// Annotates a record with the result of a file-existence check.
    pub fn new(record: ModelRecord, file_exists: bool) -> Self {
        Self {
            record,
            file_exists,
            file_status: file_exists.into(),
        }
    }
}

/// Body returned by `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRecord>,
    /// Failure reason when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadResponse {
    pub fn created(model: ModelRecord) -> Self {
        Self {
            success: true,
            model: Some(model),
            message: None,
        }
    }
}

/// Body returned by `POST /upload`, which stores a file without a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFileResponse {
    pub message: String,
    pub filename: String,
    pub path: String,
}

/// JSON error body shared by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    /// Extra guidance for the caller, e.g. to re-upload a missing file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

/// Record store section of the health report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseHealth {
    pub connected: bool,
}

/// Blob area section of the health report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadsHealth {
    /// `"exists"` or `"missing"`.
    pub directory: String,
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
    pub uploads: UploadsHealth,
}
