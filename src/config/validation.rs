use crate::config::types::{CatalogConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Floor for the listing page delay when the target is a live host.
/// Loopback targets (mock servers, local fixtures) are exempt.
const MIN_LIVE_PAGE_DELAY_MS: u64 = 500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let start_url = validate_catalog_config(&config.catalog)?;
    validate_crawler_config(&config.crawler, &start_url)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the catalog target, returning the parsed start URL
fn validate_catalog_config(config: &CatalogConfig) -> Result<Url, ConfigError> {
    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url must be http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(
            "start-url has no host".to_string(),
        ));
    }

    Ok(url)
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig, start_url: &Url) -> Result<(), ConfigError> {
    if config.retry_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-limit must be >= 1, got {}",
            config.retry_limit
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint-interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    if config.max_concurrent_details < 1 || config.max_concurrent_details > 32 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-details must be between 1 and 32, got {}",
            config.max_concurrent_details
        )));
    }

    if config.timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be >= 1000ms, got {}ms",
            config.timeout_ms
        )));
    }

    // Politeness delays can never be dropped below the floor when pointing
    // at a live external source.
    if !is_loopback_host(start_url) && config.page_delay_ms < MIN_LIVE_PAGE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "page-delay-ms must be >= {}ms for non-loopback targets, got {}ms",
            MIN_LIVE_PAGE_DELAY_MS, config.page_delay_ms
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint-path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        Some(url::Host::Domain(d)) => d == "localhost",
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::CatalogConfig;

    fn base_config(start_url: &str, page_delay_ms: u64) -> Config {
        Config {
            catalog: CatalogConfig {
                start_url: start_url.to_string(),
                max_pages: 0,
            },
            crawler: CrawlerConfig {
                user_agent: "hearth-test/1.0".to_string(),
                page_delay_ms,
                detail_delay_ms: 2500,
                jitter_ms: 500,
                retry_limit: 3,
                retry_backoff_ms: 5000,
                checkpoint_interval: 10,
                timeout_ms: 30_000,
                skip_details: false,
                max_concurrent_details: 4,
            },
            output: OutputConfig {
                checkpoint_path: "./checkpoint.json".to_string(),
                csv_path: "./listings.csv".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        let config = base_config("https://catalog.example.com/search", 1500);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_page_delay_for_live_host() {
        let config = base_config("https://catalog.example.com/search", 0);
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_allows_short_delay_for_loopback() {
        let config = base_config("http://127.0.0.1:8080/search", 10);
        assert!(validate(&config).is_ok());

        let config = base_config("http://localhost:8080/search", 0);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_retry_limit() {
        let mut config = base_config("https://catalog.example.com/search", 1500);
        config.crawler.retry_limit = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_checkpoint_interval() {
        let mut config = base_config("https://catalog.example.com/search", 1500);
        config.crawler.checkpoint_interval = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let config = base_config("ftp://catalog.example.com/search", 1500);
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_empty_output_paths() {
        let mut config = base_config("https://catalog.example.com/search", 1500);
        config.output.csv_path = String::new();
        assert!(validate(&config).is_err());
    }
}
