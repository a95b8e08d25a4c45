//! Configuration module for Sumula
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumula::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sumula.toml")).unwrap();
//! println!("Harvesting {} teams", config.crawler.teams.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BackoffConfig, ColumnOverrides, Config, CrawlerConfig, DerbyGroupEntry, ListingConfig,
    ListingLayout, SinkBackend, StorageConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
