//! bimlib server - catalog API for the BIM model library
//!
//! This crate provides the REST API that stores uploaded 3D model files,
//! records their metadata, and serves both back to the browse view.

pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod upload;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
