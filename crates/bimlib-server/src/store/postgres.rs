//! PostgreSQL-backed record store.

use async_trait::async_trait;
use bimlib_core::ModelRecord;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ModelStore, StoreError};
use crate::models::{ModelRow, NewModel};

const MODEL_COLUMNS: &str = "id, name, category, description, materials, specifications, \
                             file_path, file_size, original_name, upload_date";

/// Record store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgModelStore {
    pool: PgPool,
}

impl PgModelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModelStore for PgModelStore {
    async fn insert(&self, model: NewModel) -> Result<ModelRecord, StoreError> {
        let file_size = i64::try_from(model.file_size).unwrap_or(i64::MAX);
        let row = sqlx::query_as::<_, ModelRow>(&format!(
            r#"
            INSERT INTO models (id, name, category, description, materials, specifications,
                                file_path, file_size, original_name, upload_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING {MODEL_COLUMNS}
            "#
        ))
        .bind(model.id)
        .bind(&model.name)
        .bind(&model.category)
        .bind(&model.description)
        .bind(&model.materials)
        .bind(&model.specifications)
        .bind(&model.file_path)
        .bind(file_size)
        .bind(&model.original_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<ModelRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ModelRow>(&format!(
            "SELECT {MODEL_COLUMNS} FROM models ORDER BY upload_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ModelRecord::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ModelRecord>, StoreError> {
        let row = sqlx::query_as::<_, ModelRow>(&format!(
            "SELECT {MODEL_COLUMNS} FROM models WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ModelRecord::from))
    }

    async fn ping(&self) -> bool {
        crate::db::health_check(&self.pool).await.is_ok()
    }
}
