use crate::config::types::{Config, CrawlerConfig, FeedConfig, ReportConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_feed_config(&config.feed)?;
    validate_window(config)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_report_config(&config.report)?;
    Ok(())
}

/// Validates the feed location
fn validate_feed_config(config: &FeedConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.sort != "activity" {
        tracing::warn!(
            "Feed sort '{}' is not activity ordering; early termination and rescan assume it",
            config.sort
        );
    }

    Ok(())
}

/// Validates that the window parses and is not inverted
fn validate_window(config: &Config) -> Result<(), ConfigError> {
    let window = config.window.date_window()?;
    if let (Some(from), Some(to)) = (window.from(), window.to()) {
        if from > to {
            return Err(ConfigError::Validation(format!(
                "from-date {} is after to-date {}",
                from, to
            )));
        }
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.redo_batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "redo-batch-size must be >= 1, got {}",
            config.redo_batch_size
        )));
    }

    if config.max_rescan_iterations < 1 {
        return Err(ConfigError::Validation(format!(
            "max-rescan-iterations must be >= 1, got {}",
            config.max_rescan_iterations
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates report display parameters
fn validate_report_config(config: &ReportConfig) -> Result<(), ConfigError> {
    if config.top_n < 1 {
        return Err(ConfigError::Validation(format!(
            "top-n must be >= 1, got {}",
            config.top_n
        )));
    }

    if let Some(url) = &config.last_report_url {
        Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid last-report-url: {}", e)))?;
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
