//! Health check endpoint.

use axum::{extract::State, routing::get, Json, Router};
use bimlib_core::types::{DatabaseHealth, UploadsHealth};
use bimlib_core::HealthReport;
use chrono::Utc;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
///
/// Always 200; reports record store connectivity and whether the blob
/// directory is present.
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let connected = state.store.ping().await;
    let directory = if state.blobs.dir_exists().await {
        "exists"
    } else {
        "missing"
    };

    let report = HealthReport {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        database: DatabaseHealth { connected },
        uploads: UploadsHealth {
            directory: directory.to_string(),
        },
    };
    tracing::debug!(connected, directory, "Health check");
    Json(report)
}
