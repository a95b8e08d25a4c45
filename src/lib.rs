//! Sumula: a match-history harvester for ogol.com.br
//!
//! This crate crawls team fixture listings year by year, follows each match to
//! its report page for lineups and statistics, and persists the merged records
//! to a relational store. A progressive backoff reacts to the redirect the site
//! uses to signal blocking.

pub mod config;
pub mod crawler;
pub mod derby;
pub mod extract;
pub mod output;
pub mod record;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Sumula operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    /// Sink failures are reported through `SinkReport`; only a panicked
    /// writer task surfaces here
    #[error("Sink writer task failed: {0}")]
    Writer(String),
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

/// Result type alias for Sumula operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlReport, CrawlTask, RunSummary};
pub use derby::{normalize, DerbyTable};
pub use record::{CardEvent, Lineups, MatchRecord, PlayerAppearance, StatTable};
pub use state::{BackoffController, BackoffState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_errors_convert_with_question_mark() {
        fn parse_base(raw: &str) -> Result<::url::Url> {
            Ok(::url::Url::parse(raw)?)
        }

        assert!(matches!(parse_base("not a url"), Err(HarvestError::UrlParse(_))));
        assert!(parse_base("https://www.ogol.com.br").is_ok());
    }
}
