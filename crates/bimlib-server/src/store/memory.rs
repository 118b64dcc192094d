//! In-process record store.
//!
//! Keeps records in insertion order behind an async lock. It can be switched
//! into an unavailable state to exercise the service's database-outage
//! paths without a real database.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bimlib_core::ModelRecord;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ModelStore, StoreError};
use crate::models::NewModel;

#[derive(Debug)]
pub struct MemoryModelStore {
    records: RwLock<Vec<ModelRecord>>,
    available: AtomicBool,
}

impl Default for MemoryModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates losing or regaining the database connection.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl ModelStore for MemoryModelStore {
    async fn insert(&self, model: NewModel) -> Result<ModelRecord, StoreError> {
        self.ensure_available()?;
        let record = model.into_record(Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ModelRecord>, StoreError> {
        self.ensure_available()?;
        let mut records: Vec<ModelRecord> = self.records.read().await.iter().rev().cloned().collect();
        // Stable sort keeps later inserts first among equal timestamps.
        records.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(records)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ModelRecord>, StoreError> {
        self.ensure_available()?;
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn ping(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
