use crate::config::types::{ScraperConfig, SourcesFile};
use crate::models::Source;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire sources file
pub fn validate(file: &SourcesFile) -> Result<(), ConfigError> {
    validate_scraper_config(&file.scraper)?;
    validate_sources(&file.sources())?;
    Ok(())
}

/// Validates scraper settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be between 1 and 100, got {}",
            config.max_concurrent
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if !(-23..=23).contains(&config.reference_utc_offset_hours) {
        return Err(ConfigError::Validation(format!(
            "reference_utc_offset_hours must be between -23 and 23, got {}",
            config.reference_utc_offset_hours
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates source entries: identity fields and URLs
fn validate_sources(sources: &[Source]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for source in sources {
        if source.key.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Source '{}' has an empty key",
                source.name
            )));
        }

        if !seen.insert(source.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate source key '{}'",
                source.key
            )));
        }

        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Source '{}' has an empty name",
                source.key
            )));
        }

        let url = Url::parse(&source.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid URL '{}' for '{}': {}", source.url, source.key, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "URL '{}' for '{}' must use http or https",
                source.url, source.key
            )));
        }
    }

    Ok(())
}
