//! Database models for the model catalog.

pub mod model_record;

pub use model_record::{ModelRow, NewModel};
