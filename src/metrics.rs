use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion activity over the process lifetime.
#[derive(Default)]
pub struct IngestMetrics {
    files_ingested: AtomicU64,
    files_skipped: AtomicU64,
    files_failed: AtomicU64,
    chunks_ingested: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully ingested file and the number of chunks it produced.
    pub fn record_file(&self, chunk_count: u64) {
        self.files_ingested.fetch_add(1, Ordering::Relaxed);
        self.chunks_ingested.fetch_add(chunk_count, Ordering::Relaxed);
    }

    /// Record a file skipped because its checksum was unchanged.
    pub fn record_skip(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a file that failed at some pipeline stage.
    pub fn record_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_ingested: self.files_ingested.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            chunks_ingested: self.chunks_ingested.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of files ingested since startup.
    pub files_ingested: u64,
    /// Number of files skipped as unchanged since startup.
    pub files_skipped: u64,
    /// Number of files that failed since startup.
    pub files_failed: u64,
    /// Total chunk count produced across all ingested files.
    pub chunks_ingested: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_files_and_chunks() {
        let metrics = IngestMetrics::new();
        metrics.record_file(2);
        metrics.record_file(3);
        metrics.record_skip();
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_ingested, 2);
        assert_eq!(snapshot.chunks_ingested, 5);
        assert_eq!(snapshot.files_skipped, 1);
        assert_eq!(snapshot.files_failed, 1);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = IngestMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_ingested, 0);
        assert_eq!(snapshot.chunks_ingested, 0);
    }
}
