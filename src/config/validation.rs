use crate::config::types::{Config, MAX_WORKERS};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Every failure here is systemic: the crawl cannot start.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seeds(&config.seeds)?;
    validate_limits(config)?;
    validate_terms(&config.terms, "terms")?;
    validate_terms(&config.stop_terms, "stop-terms")?;
    validate_cache(config)?;
    Ok(())
}

/// Validates the seed list: non-empty, parseable, HTTP(S) only
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "url must contain at least one seed URL".to_string(),
        ));
    }

    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed URL '{}' must use the http or https scheme",
                seed
            )));
        }
    }

    Ok(())
}

/// Validates numeric limits
fn validate_limits(config: &Config) -> Result<(), ConfigError> {
    if config.limit == 0 {
        return Err(ConfigError::Validation("limit must be >= 1".to_string()));
    }

    if config.match_threshold < 0 {
        return Err(ConfigError::Validation(format!(
            "match must be >= 0, got {}",
            config.match_threshold
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Rejects blank entries in a term list
fn validate_terms(terms: &[String], field: &str) -> Result<(), ConfigError> {
    if terms.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "{} cannot contain blank entries",
            field
        )));
    }
    Ok(())
}

/// Validates cache settings
fn validate_cache(config: &Config) -> Result<(), ConfigError> {
    if config.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "cache-dir cannot be empty".to_string(),
        ));
    }

    if config.cache_limit == 0 {
        return Err(ConfigError::Validation(
            "cache-limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}
