//! Configuration module for the harvester
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, including the politeness-delay floor for live targets.
//!
//! # Example
//!
//! ```no_run
//! use hearth::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Catalog: {}", config.catalog.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, CrawlerConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
