use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the ingestion pipeline.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the external chunk store.
    pub store_url: String,
    /// Name of the store collection that receives chunk documents.
    pub store_collection: String,
    /// Optional API key required to access the store.
    pub store_api_key: Option<String>,
    /// Path of the persisted checksum ledger.
    pub ledger_path: PathBuf,
    /// Tunable pipeline heuristics.
    pub options: IngestOptions,
}

/// Tunable thresholds governing cleaning, chunking, and deduplication.
///
/// The defaults mirror the reference deployment. None of them is derived from
/// first principles; treat them as starting points for tuning against a real
/// corpus rather than guaranteed-correct values.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestOptions {
    /// Target chunk size in characters.
    pub chunk_target_chars: usize,
    /// Overlap carried between adjacent chunks, in characters.
    pub chunk_overlap_chars: usize,
    /// Minimum chunk length; shorter fragments are dropped after splitting.
    pub min_chunk_chars: usize,
    /// Minimum cleaned page length; shorter pages are excluded from chunking.
    pub min_page_chars: usize,
    /// Minimum line length kept by the noise filter.
    pub min_line_chars: usize,
    /// Distinct-value ratio below which first/last lines count as repeated.
    pub header_distinct_ratio: f64,
    /// Fraction of pages a repeated line must appear on to be removed.
    pub header_page_ratio: f64,
    /// Jaccard similarity above which a chunk is considered a near-duplicate.
    pub jaccard_threshold: f64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_target_chars: 1000,
            chunk_overlap_chars: 200,
            min_chunk_chars: 30,
            min_page_chars: 50,
            min_line_chars: 3,
            header_distinct_ratio: 0.3,
            header_page_ratio: 0.5,
            jaccard_threshold: 0.9,
        }
    }
}

impl IngestOptions {
    /// Load tunables from the environment, falling back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            chunk_target_chars: load_env_parsed("CHUNK_TARGET_CHARS", defaults.chunk_target_chars)?,
            chunk_overlap_chars: load_env_parsed(
                "CHUNK_OVERLAP_CHARS",
                defaults.chunk_overlap_chars,
            )?,
            min_chunk_chars: load_env_parsed("MIN_CHUNK_CHARS", defaults.min_chunk_chars)?,
            min_page_chars: load_env_parsed("MIN_PAGE_CHARS", defaults.min_page_chars)?,
            min_line_chars: load_env_parsed("MIN_LINE_CHARS", defaults.min_line_chars)?,
            header_distinct_ratio: load_env_parsed(
                "HEADER_DISTINCT_RATIO",
                defaults.header_distinct_ratio,
            )?,
            header_page_ratio: load_env_parsed("HEADER_PAGE_RATIO", defaults.header_page_ratio)?,
            jaccard_threshold: load_env_parsed("JACCARD_THRESHOLD", defaults.jaccard_threshold)?,
        })
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store_url: load_env("STORE_URL")?,
            store_collection: load_env("STORE_COLLECTION")?,
            store_api_key: load_env_optional("STORE_API_KEY"),
            ledger_path: load_env_optional("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/ledger.json")),
            options: IngestOptions::from_env()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        store_url = %config.store_url,
        collection = %config.store_collection,
        ledger = %config.ledger_path.display(),
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
