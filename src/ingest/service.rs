//! Pipeline orchestrator sequencing extraction, cleaning, chunking,
//! deduplication, and storage per source file.

use crate::{
    chunking::chunk_page,
    clean::clean_pages,
    config::IngestOptions,
    dedupe::dedupe_chunks,
    extract::TextExtractor,
    ingest::types::{Chunk, FileError, FileState, IngestError, IngestionStats},
    ledger::{ChecksumLedger, compute_checksum},
    metrics::{IngestMetrics, MetricsSnapshot},
    store::ChunkStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Coordinates the full ingestion pipeline for single files and batches.
///
/// The service owns the extractor, the store handle, and the checksum ledger
/// for its lifetime. Files are processed one at a time; a failure in any
/// stage marks that file failed and the batch moves on.
pub struct IngestService {
    extractor: TextExtractor,
    store: Box<dyn ChunkStore>,
    ledger: ChecksumLedger,
    options: IngestOptions,
    metrics: Arc<IngestMetrics>,
}

impl IngestService {
    /// Build a service from an explicit store, ledger, and tunables.
    pub fn new(store: Box<dyn ChunkStore>, ledger: ChecksumLedger, options: IngestOptions) -> Self {
        Self {
            extractor: TextExtractor::new(),
            store,
            ledger,
            options,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Replace the default extraction engines. Mostly useful for tests.
    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Process every PDF found directly in `directory` (non-recursive).
    ///
    /// Per-file failures are collected into the returned stats; nothing short
    /// of the caller cancelling the task stops the batch. An empty or missing
    /// directory yields zeroed stats.
    pub async fn run_batch(&mut self, directory: &Path, force: bool) -> IngestionStats {
        let mut stats = IngestionStats::default();
        let files = list_pdf_files(directory);
        if files.is_empty() {
            tracing::info!(directory = %directory.display(), "No PDF files found");
            return stats;
        }

        tracing::info!(
            directory = %directory.display(),
            files = files.len(),
            force,
            "Starting ingestion batch"
        );

        for path in files {
            let identity = path.to_string_lossy().to_string();
            let state = match self.process_file(&path, force).await {
                Ok(state) => state,
                Err(err) => FileState::Failed {
                    reason: err.to_string(),
                },
            };
            match state {
                FileState::Skipped => {
                    stats.files_skipped += 1;
                    self.metrics.record_skip();
                }
                FileState::Recorded { chunks } => {
                    stats.files_processed += 1;
                    stats.total_chunks += chunks;
                }
                FileState::Failed { reason } => {
                    tracing::warn!(file = %identity, error = %reason, "File failed");
                    self.metrics.record_failure();
                    stats.errors.push(FileError {
                        file: identity,
                        message: reason,
                    });
                }
            }
        }

        if let Err(err) = self.ledger.persist() {
            tracing::warn!(error = %err, "Failed to flush ledger at end of batch");
        }

        tracing::info!(
            processed = stats.files_processed,
            skipped = stats.files_skipped,
            chunks = stats.total_chunks,
            errors = stats.errors.len(),
            "Batch finished"
        );
        stats
    }

    /// Ingest a single file, returning the number of chunks stored.
    ///
    /// Reuses the same stages as the batch path, including the ledger skip
    /// check; a skipped file reports zero chunks.
    pub async fn process_one(&mut self, path: &Path, force: bool) -> Result<usize, IngestError> {
        match self.process_file(path, force).await? {
            FileState::Recorded { chunks } => Ok(chunks),
            _ => Ok(0),
        }
    }

    /// Current process-lifetime metrics.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn process_file(&mut self, path: &Path, force: bool) -> Result<FileState, IngestError> {
        let identity = path.to_string_lossy().to_string();
        let bytes = std::fs::read(path)?;
        let checksum = compute_checksum(&bytes);

        if !self.ledger.should_process(&identity, &checksum, force) {
            tracing::info!(file = %identity, "Skipping unchanged file");
            return Ok(FileState::Skipped);
        }

        tracing::info!(file = %identity, "Processing file");
        let pages = self.extractor.extract(&bytes);
        if pages.is_empty() {
            return Err(IngestError::Extraction);
        }
        let extracted = pages.len();

        let pages = clean_pages(pages, &self.options);
        tracing::debug!(file = %identity, extracted, usable = pages.len(), "Pages cleaned");

        let title = source_title(path);
        let mut chunks: Vec<Chunk> = Vec::new();
        for page in &pages {
            let passages = chunk_page(
                &page.text,
                self.options.chunk_target_chars,
                self.options.chunk_overlap_chars,
                self.options.min_chunk_chars,
            );
            for (index, passage) in passages.iter().enumerate() {
                if let Some(chunk) = Chunk::new(passage, &title, page.number, index, page.strategy)
                {
                    chunks.push(chunk);
                }
            }
        }
        if chunks.is_empty() {
            return Err(IngestError::EmptyChunks);
        }

        let (chunks, skipped_duplicates) = dedupe_chunks(chunks, self.options.jaccard_threshold);

        // Store first, ledger second: recording a checksum before the store
        // accepted would silently lose content on a crash between the two.
        self.store.accept(&chunks).await?;
        self.ledger.record(&identity, &checksum);
        self.ledger.persist()?;

        self.metrics.record_file(chunks.len() as u64);
        tracing::info!(
            file = %identity,
            pages = pages.len(),
            chunks = chunks.len(),
            skipped_duplicates,
            "File ingested"
        );
        Ok(FileState::Recorded {
            chunks: chunks.len(),
        })
    }
}

/// PDF files directly inside `directory`, in a stable name order.
fn list_pdf_files(directory: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// Derive a human-readable source title from the file stem.
fn source_title(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "untitled".to_string());
    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
