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
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Recorded with each persisted run so stored matches can be traced back to
/// the settings that produced them.
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
    use crate::config::{ListingLayout, SinkBackend};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let config_content = r#"
[crawler]
teams = ["sao-paulo"]

[storage]
database-path = "./ogol.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.teams, vec!["sao-paulo".to_string()]);
        assert_eq!(config.crawler.start_year, 2000);
        assert_eq!(config.crawler.end_year, 2025);
        assert_eq!(config.crawler.pages, vec![1, 2]);
        assert!(!config.crawler.rivalry_only);
        assert_eq!(config.backoff.base_interval, 360);
        assert_eq!(config.backoff.cap, 420);
        assert_eq!(config.backoff.block_statuses, vec![302]);
        assert_eq!(config.user_agent.pool.len(), 8);
        assert_eq!(config.listing.layout, ListingLayout::Current);
        assert_eq!(config.storage.backend, SinkBackend::Normalized);
        assert_eq!(config.storage.batch_size, 10);
        assert!(config.derby_groups.is_empty());
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[crawler]
teams = ["gremio", "internacional"]
start-year = 2010
end-year = 2012
pages = [1]
rivalry-only = true
max-concurrent-requests = 2

[listing]
layout = "legacy"

[listing.columns]
score = 9

[backoff]
base-interval = 60
cap = 90

[user-agent]
pool = ["TestAgent/1.0"]

[storage]
backend = "document"
database-path = "./rs.db"
batch-size = 5

[[derby-group]]
region = "RS"
teams = ["gremio", "internacional", "juventude"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert!(config.crawler.rivalry_only);
        assert_eq!(config.crawler.max_concurrent_requests, 2);
        assert_eq!(config.listing.layout, ListingLayout::Legacy);
        assert_eq!(config.listing.columns.score, Some(9));
        assert_eq!(config.listing.columns.date, None);
        assert_eq!(config.backoff.cap, 90);
        assert_eq!(config.user_agent.pool, vec!["TestAgent/1.0".to_string()]);
        assert_eq!(config.storage.backend, SinkBackend::Document);
        assert_eq!(config.derby_groups.len(), 1);
        assert_eq!(config.derby_groups[0].region, "RS");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/sumula.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_team_list_fails_fast() {
        let config_content = r#"
[crawler]
teams = []

[storage]
database-path = "./ogol.db"
"#;

        let result = parse_config(config_content);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
