//! Catalog record model as stored in the `models` table.

use bimlib_core::{ModelMetadata, ModelRecord};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `models` table.
#[derive(Debug, Clone, FromRow)]
pub struct ModelRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub materials: Vec<String>,
    pub specifications: Vec<String>,
    pub file_path: String,
    /// Stored as BIGINT; never negative.
    pub file_size: Option<i64>,
    pub original_name: Option<String>,
    pub upload_date: DateTime<Utc>,
}

impl From<ModelRow> for ModelRecord {
    fn from(row: ModelRow) -> Self {
        ModelRecord {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            materials: row.materials,
            specifications: row.specifications,
            file_path: row.file_path,
            file_size: row.file_size.and_then(|size| u64::try_from(size).ok()),
            original_name: row.original_name,
            upload_date: row.upload_date,
        }
    }
}

/// Data required to create a new record. The store assigns `upload_date`.
#[derive(Debug, Clone)]
pub struct NewModel {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub materials: Vec<String>,
    pub specifications: Vec<String>,
    pub file_path: String,
    pub file_size: u64,
    pub original_name: String,
}

impl NewModel {
    /// Builds a record for a file already written to the blob area.
    pub fn new(metadata: ModelMetadata, file_path: String, file_size: u64, original_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: metadata.name,
            category: metadata.category,
            description: metadata.description,
            materials: metadata.materials,
            specifications: metadata.specifications,
            file_path,
            file_size,
            original_name,
        }
    }

    /// Completes the record with its creation time.
    pub fn into_record(self, upload_date: DateTime<Utc>) -> ModelRecord {
        ModelRecord {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            materials: self.materials,
            specifications: self.specifications,
            file_path: self.file_path,
            file_size: Some(self.file_size),
            original_name: Some(self.original_name),
            upload_date,
        }
    }
}
