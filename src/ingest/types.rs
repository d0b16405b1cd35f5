//! Core data types and error definitions for the ingestion pipeline.

use crate::extract::ExtractionStrategy;
use crate::ledger::LedgerError;
use crate::store::StoreError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The unit handed downstream: a bounded text passage with provenance metadata.
///
/// Immutable after creation. Construction rejects empty text, so an invalid
/// chunk cannot exist rather than being filtered later.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    /// Globally unique identifier for the chunk.
    pub id: String,
    /// Trimmed, non-empty passage text.
    pub text: String,
    /// Title of the source document the passage came from.
    pub source_title: String,
    /// 1-indexed page the passage originated on.
    pub page_number: u32,
    /// Zero-based index of the passage within its page.
    pub chunk_index: usize,
    /// Extraction engine that produced the page text.
    pub strategy: ExtractionStrategy,
}

impl Chunk {
    /// Construct a chunk, trimming the text and rejecting empty passages.
    pub fn new(
        text: &str,
        source_title: &str,
        page_number: u32,
        chunk_index: usize,
        strategy: ExtractionStrategy,
    ) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            text: trimmed.to_string(),
            source_title: source_title.to_string(),
            page_number,
            chunk_index,
            strategy,
        })
    }
}

/// Errors that fail a single file without aborting the batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Both extraction strategies yielded nothing usable.
    #[error("No text could be extracted from the document")]
    Extraction,
    /// No chunks survived the floor filters.
    #[error("No chunks were produced from the document")]
    EmptyChunks,
    /// The external store refused or failed to accept the chunks.
    #[error("Store rejected chunks: {0}")]
    Store(#[from] StoreError),
    /// Reading the source file failed.
    #[error("Failed to read source file: {0}")]
    Io(#[from] std::io::Error),
    /// The ledger could not be persisted after recording.
    #[error("Failed to persist ledger: {0}")]
    Ledger(#[from] LedgerError),
}

/// Terminal state of one file's trip through the pipeline.
#[derive(Debug)]
pub enum FileState {
    /// Ledger checksum matched; the file was not reprocessed.
    Skipped,
    /// Chunks were accepted by the store and the ledger was updated.
    Recorded {
        /// Number of chunks handed to the store.
        chunks: usize,
    },
    /// A pipeline stage failed; the ledger was left untouched.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

/// One failed file's identity and failure message.
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    /// Identity of the source file that failed.
    pub file: String,
    /// Failure message captured from the pipeline.
    pub message: String,
}

/// Run-scoped aggregate returned by a batch invocation.
#[derive(Debug, Default, Serialize)]
pub struct IngestionStats {
    /// Files fully processed and recorded during the run.
    pub files_processed: usize,
    /// Files skipped because their checksum was unchanged.
    pub files_skipped: usize,
    /// Total chunks handed to the store during the run.
    pub total_chunks: usize,
    /// Per-file errors collected during the run.
    pub errors: Vec<FileError>,
}

impl IngestionStats {
    /// Average chunk count across files processed this run.
    pub fn average_chunks_per_file(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.total_chunks as f64 / self.files_processed as f64
        }
    }
}
