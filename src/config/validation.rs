use crate::config::types::{Config, CrawlerConfig, HttpConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates pool sizes and the per-host cap
///
/// All of them must be positive. `per_host` larger than `downloaders` is
/// allowed; the downloader pool then becomes the effective limit.
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    require_positive("downloaders", config.downloaders)?;
    require_positive("extractors", config.extractors)?;
    require_positive("per_host", config.per_host)?;
    require_positive("host_gate_soft_cap", config.host_gate_soft_cap)?;
    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

fn require_positive(name: &str, value: usize) -> Result<(), ConfigError> {
    if value < 1 {
        return Err(ConfigError::Validation(format!(
            "{} must be >= 1, got {}",
            name, value
        )));
    }
    Ok(())
}
