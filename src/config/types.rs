use serde::Deserialize;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Catalog target configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Starting search/listing URL
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Maximum number of listing pages to crawl (0 = unbounded)
    #[serde(rename = "max-pages", default)]
    pub max_pages: u32,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User agent string sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Mandatory delay between listing page fetches (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Mandatory delay between detail page fetches (milliseconds)
    #[serde(rename = "detail-delay-ms", default = "default_detail_delay")]
    pub detail_delay_ms: u64,

    /// Random jitter added to each delay (milliseconds, uniform 0..=jitter)
    #[serde(rename = "jitter-ms", default = "default_jitter")]
    pub jitter_ms: u64,

    /// Total fetch attempts per page before giving up
    #[serde(rename = "retry-limit", default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Base delay between retry attempts (milliseconds, scales linearly)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Commit the enrichment checkpoint every N detail results
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: u32,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout")]
    pub timeout_ms: u64,

    /// Skip the detail enrichment pass entirely
    #[serde(rename = "skip-details", default)]
    pub skip_details: bool,

    /// Maximum concurrent detail page fetches
    #[serde(rename = "max-concurrent-details", default = "default_max_details")]
    pub max_concurrent_details: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the checkpoint snapshot file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,

    /// Path to the exported CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

fn default_user_agent() -> String {
    format!("hearth/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_delay() -> u64 {
    1500
}

fn default_detail_delay() -> u64 {
    2500
}

fn default_jitter() -> u64 {
    500
}

fn default_retry_limit() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    5000
}

fn default_checkpoint_interval() -> u32 {
    10
}

fn default_timeout() -> u64 {
    30_000
}

fn default_max_details() -> u32 {
    4
}
