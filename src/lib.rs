//! Hearth: a resumable real-estate listing harvester
//!
//! This crate implements a paginated listing extraction pipeline: it walks a
//! multi-page property catalog, extracts typed records from semi-structured
//! HTML using ordered fallback selector strategies, checkpoints progress
//! after every page so interrupted runs resume without redoing work, and
//! exports a schema-stable CSV sorted by record ID.

pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod export;
pub mod extract;
pub mod model;
pub mod urls;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        source: crawler::FetchError,
    },

    #[error("Retries exhausted for page {page} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        last_error: String,
    },

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointStore, Phase};
pub use config::Config;
pub use crawler::{harvest, Fetch, FetchError, HttpFetcher};
pub use model::{ExtractionOutcome, Listing, ListingStatus, PageDescriptor, RunReport};
