#![deny(missing_docs)]

//! Core library for the corpus-ingest document pipeline.

/// Page-level text cleaning and repeated header/footer removal.
pub mod clean;
/// Overlap-aware recursive text chunking.
pub mod chunking;
/// Environment-driven configuration management.
pub mod config;
/// Near-duplicate chunk suppression.
pub mod dedupe;
/// Multi-strategy PDF text extraction.
pub mod extract;
/// Batch orchestration and the pipeline data model.
pub mod ingest;
/// Checksum ledger tracking previously ingested sources.
pub mod ledger;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// External chunk store integration.
pub mod store;
