//! Shared application state.

use std::sync::Arc;

use crate::blob::BlobStore;
use crate::store::ModelStore;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Record store, acquired once at startup.
    pub store: Arc<dyn ModelStore>,
    /// Directory of stored model files.
    pub blobs: BlobStore,
    /// Largest accepted model file, in bytes.
    pub max_upload_bytes: u64,
}

impl AppState {
    pub fn new(store: Arc<dyn ModelStore>, blobs: BlobStore, max_upload_bytes: u64) -> Self {
        Self {
            store,
            blobs,
            max_upload_bytes,
        }
    }
}
