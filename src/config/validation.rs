use crate::config::types::{Config, CrawlLimits};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Called once before any traversal starts; a validation failure is fatal
/// and must abort the run with exit code 1.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_start_url(config)?;
    validate_limits(&config.limits)?;
    validate_upload(config)?;
    Ok(())
}

/// Validates the starting URL
fn validate_start_url(config: &Config) -> Result<(), ConfigError> {
    let scheme = config.start_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "starting URL must use http or https, got '{}'",
            scheme
        )));
    }

    if config.start_url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "starting URL '{}' has no host",
            config.start_url
        )));
    }

    Ok(())
}

/// Validates traversal limits and filters
fn validate_limits(limits: &CrawlLimits) -> Result<(), ConfigError> {
    if limits.extensions.is_empty() {
        return Err(ConfigError::Validation(
            "at least one extension must be given".to_string(),
        ));
    }

    for ext in &limits.extensions {
        if ext.is_empty() {
            return Err(ConfigError::Validation(
                "extensions cannot be empty".to_string(),
            ));
        }
        if ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "extensions must be bare (no leading dot), got '{}'",
                ext
            )));
        }
        if ext.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(ConfigError::Validation(format!(
                "invalid extension '{}'",
                ext
            )));
        }
    }

    if !limits.delay.as_secs_f64().is_finite() {
        return Err(ConfigError::Validation(
            "delay must be a finite number of seconds".to_string(),
        ));
    }

    for pattern in limits
        .exclude_crawl
        .iter()
        .chain(limits.exclude_download.iter())
    {
        if pattern.is_empty() {
            return Err(ConfigError::Validation(
                "exclusion substrings cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates remote mirroring configuration
fn validate_upload(config: &Config) -> Result<(), ConfigError> {
    if let Some(upload) = &config.upload {
        if upload.container.is_empty() {
            return Err(ConfigError::Validation(
                "container name cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}
