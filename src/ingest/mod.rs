//! Batch orchestration and the pipeline data model.

mod service;
mod types;

pub use service::IngestService;
pub use types::{Chunk, FileError, FileState, IngestError, IngestionStats};
