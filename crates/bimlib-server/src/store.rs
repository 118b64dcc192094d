//! Record store abstraction.
//!
//! Handlers talk to the record store through [`ModelStore`] so the same
//! routes run against PostgreSQL in production and an in-memory store in
//! tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use bimlib_core::ModelRecord;
use uuid::Uuid;

use crate::models::NewModel;

pub use memory::MemoryModelStore;
pub use postgres::PgModelStore;

/// Errors raised by a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database not connected: {0}")]
    Unavailable(String),
}

/// Persistence for catalog records. Records are created once and never
/// updated or deleted through this interface.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Persists a new record, returning it with its creation timestamp.
    async fn insert(&self, model: NewModel) -> Result<ModelRecord, StoreError>;

    /// All records, newest `upload_date` first.
    async fn list(&self) -> Result<Vec<ModelRecord>, StoreError>;

    /// One record by id, or `None` when no record has that id.
    async fn get(&self, id: Uuid) -> Result<Option<ModelRecord>, StoreError>;

    /// True when the store can currently serve queries.
    async fn ping(&self) -> bool;
}
