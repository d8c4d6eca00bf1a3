use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is stored in the checkpoint so a resumed run can warn the
/// operator when the configuration changed since the checkpoint was written.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [catalog]
        start-url = "https://catalog.example.com/search"

        [crawler]

        [output]
        checkpoint-path = "./checkpoint.json"
        csv-path = "./listings.csv"
    "#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let file = write_temp(MINIMAL);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.catalog.max_pages, 0);
        assert_eq!(config.crawler.page_delay_ms, 1500);
        assert_eq!(config.crawler.retry_limit, 3);
        assert_eq!(config.crawler.checkpoint_interval, 10);
        assert!(!config.crawler.skip_details);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = write_temp("not valid toml [[");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = write_temp(MINIMAL);
        let h1 = compute_config_hash(file.path()).unwrap();
        let h2 = compute_config_hash(file.path()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_config_hash_changes_with_content() {
        let a = write_temp(MINIMAL);
        let b = write_temp(&MINIMAL.replace("search", "search2"));
        assert_ne!(
            compute_config_hash(a.path()).unwrap(),
            compute_config_hash(b.path()).unwrap()
        );
    }
}
