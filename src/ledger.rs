//! Checksum ledger deciding which source files need (re)processing.
//!
//! The ledger is a flat `{file identity: checksum}` map persisted as JSON. It
//! is loaded once at pipeline start, mutated in memory during a run, and
//! flushed back to disk after each successful file so that a crash mid-batch
//! loses at most the file in flight. A missing or unreadable ledger degrades
//! to an empty one; it must never stop a batch from running.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while persisting ledger state.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Filesystem access to the ledger path failed.
    #[error("Ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Ledger contents could not be serialized.
    #[error("Ledger serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistent mapping from source file identity to last-ingested checksum.
#[derive(Debug)]
pub struct ChecksumLedger {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ChecksumLedger {
    /// Load the ledger from `path`.
    ///
    /// A missing file yields an empty ledger; corrupt contents also yield an
    /// empty ledger with a warning, so every source is treated as new.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => parse_entries(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    path = %path.display(),
                    "Ledger file is corrupt; treating all sources as new"
                );
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "Could not read ledger; treating all sources as new"
                );
                BTreeMap::new()
            }
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "Ledger loaded");
        Self { path, entries }
    }

    /// Create an empty ledger that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Decide whether a source with the given identity and current checksum
    /// needs processing. `force` always wins.
    pub fn should_process(&self, identity: &str, current_checksum: &str, force: bool) -> bool {
        if force {
            return true;
        }
        match self.entries.get(identity) {
            Some(stored) => stored != current_checksum,
            None => true,
        }
    }

    /// Upsert the checksum recorded for a source. Idempotent.
    pub fn record(&mut self, identity: &str, checksum: &str) {
        self.entries
            .insert(identity.to_string(), checksum.to_string());
    }

    /// Number of entries currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger tracks no sources.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flush the ledger to its backing file, creating parent directories as
    /// needed. Safe to call repeatedly.
    pub fn persist(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)?;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "Ledger persisted");
        Ok(())
    }

    /// Path the ledger persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_entries(raw: &str) -> Option<BTreeMap<String, String>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let map = value.as_object()?;
    let mut entries = BTreeMap::new();
    for (key, value) in map {
        entries.insert(key.clone(), value.as_str()?.to_string());
    }
    Some(entries)
}

/// Compute the deterministic content checksum for a source's full byte stream.
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
