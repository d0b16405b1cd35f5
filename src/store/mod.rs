//! External chunk store integration.
//!
//! The pipeline does not embed or rank anything; it only hands finished
//! chunks (text plus metadata) to a store that does. The store is consumed
//! through the narrow [`ChunkStore`] capability so tests and alternative
//! backends can stand in for the HTTP implementation.

mod http;

pub use http::HttpChunkStore;

use crate::ingest::Chunk;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned while handing chunks to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Store responded with an unexpected status code.
    #[error("Unexpected store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Capability to accept a batch of chunk documents for storage.
///
/// A failure aborts recording for the file whose chunks were offered, but
/// never the batch; the file keeps its old checksum and is retried next run.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Hand one document's deduplicated chunks to the store.
    async fn accept(&self, chunks: &[Chunk]) -> Result<(), StoreError>;
}
