use crate::config::types::{
    BackoffConfig, ColumnOverrides, Config, CrawlerConfig, DerbyGroupEntry, StorageConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_columns(&config.listing.columns)?;
    validate_backoff_config(&config.backoff)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_derby_groups(&config.derby_groups)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.teams.is_empty() {
        return Err(ConfigError::Validation(
            "teams cannot be empty; list at least one team slug (e.g. \"sao-paulo\")".to_string(),
        ));
    }

    if let Some(team) = config.teams.iter().find(|t| !is_slug(t)) {
        return Err(ConfigError::Validation(format!(
            "team '{}' must be a lowercase slug of letters, digits and hyphens",
            team
        )));
    }

    if config.start_year > config.end_year {
        return Err(ConfigError::Validation(format!(
            "start_year ({}) must not be after end_year ({})",
            config.start_year, config.end_year
        )));
    }

    if config.pages.is_empty() {
        return Err(ConfigError::Validation("pages cannot be empty".to_string()));
    }

    if config.pages.contains(&0) {
        return Err(ConfigError::Validation(
            "pages are numbered from 1".to_string(),
        ));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be at least 1 second".to_string(),
        ));
    }

    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    Ok(())
}

/// Column positions are 1-based
fn validate_columns(columns: &ColumnOverrides) -> Result<(), ConfigError> {
    let positions = [
        ("competition", columns.competition),
        ("date", columns.date),
        ("venue", columns.venue),
        ("opponent", columns.opponent),
        ("result", columns.result),
        ("score", columns.score),
    ];

    for (name, position) in positions {
        if position == Some(0) {
            return Err(ConfigError::Validation(format!(
                "column '{}' must be a 1-based position",
                name
            )));
        }
    }

    Ok(())
}

fn validate_backoff_config(config: &BackoffConfig) -> Result<(), ConfigError> {
    if config.base_interval == 0 {
        return Err(ConfigError::Validation(
            "backoff base_interval must be greater than zero".to_string(),
        ));
    }

    if config.cap == 0 {
        return Err(ConfigError::Validation(
            "backoff cap must be greater than zero".to_string(),
        ));
    }

    if config.block_statuses.is_empty() {
        return Err(ConfigError::Validation(
            "block_statuses cannot be empty".to_string(),
        ));
    }

    if let Some(status) = config
        .block_statuses
        .iter()
        .find(|s| !(100..=599).contains(*s))
    {
        return Err(ConfigError::Validation(format!(
            "block status {} is not a valid HTTP status",
            status
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool must contain at least one entry".to_string(),
        ));
    }

    if config.pool.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user-agent pool entries cannot be blank".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.batch_size == 0 {
        return Err(ConfigError::Validation(
            "batch_size must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_derby_groups(groups: &[DerbyGroupEntry]) -> Result<(), ConfigError> {
    for group in groups {
        if group.region.trim().is_empty() {
            return Err(ConfigError::Validation(
                "derby group region cannot be empty".to_string(),
            ));
        }

        if group.teams.is_empty() {
            return Err(ConfigError::Validation(format!(
                "derby group '{}' must list at least one team",
                group.region
            )));
        }
    }

    Ok(())
}

/// Team slugs as they appear in site URLs
fn is_slug(team: &str) -> bool {
    !team.is_empty()
        && !team.starts_with('-')
        && !team.ends_with('-')
        && team
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
