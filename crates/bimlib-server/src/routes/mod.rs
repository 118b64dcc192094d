//! API routes for the catalog server.

pub mod health;
pub mod models;
pub mod uploads;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Allowance on top of the file limit for text fields and multipart framing.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Creates the main router with all routes mounted.
pub fn create_router(state: AppState) -> Router {
    let max = state.max_upload_bytes;

    Router::new()
        .nest("/api", api_routes(max))
        .merge(uploads::router())
        .merge(limited(uploads::upload_router(), max))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes under `/api`.
fn api_routes(max_upload_bytes: u64) -> Router<AppState> {
    Router::new()
        .merge(models::router())
        .merge(limited(models::upload_router(), max_upload_bytes))
}

/// Replaces axum's default body cap with one sized for model uploads.
/// Requests whose `Content-Length` exceeds it are refused with a JSON 413
/// before any handler runs.
fn limited(router: Router<AppState>, max_upload_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))
        .unwrap_or(usize::MAX);

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(middleware::map_response(move |response: Response| async move {
            json_limit_rejection(response, max_upload_bytes)
        }))
}

/// The body-limit layer answers 413 in plain text; rewrite it as the same
/// JSON error the upload handlers produce.
fn json_limit_rejection(response: Response, max_upload_bytes: u64) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        tracing::info!(max_upload_bytes, "Upload rejected by body limit");
        return AppError::PayloadTooLarge {
            max: max_upload_bytes,
        }
        .into_response();
    }
    response
}

/// Builds the CORS layer. `*` in `origins` allows any origin.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return Ok(cors.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cors.allow_origin(origins))
}
