//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &SiftConfig) -> Result<(), ConfigError> {
    config.retrieval.validate()?;
    validate_source_config(&config.sources)?;
    validate_reranker_config(&config.reranker)?;

    Ok(())
}

/// Validate candidate fetching configuration.
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    if config.fetch_timeout_ms == Some(0) {
        return Err(ConfigError::ValidationError(
            "fetch_timeout_ms must be greater than 0 when set".to_string(),
        ));
    }

    if config.vector_fetch_multiplier == 0 || config.keyword_fetch_multiplier == 0 {
        return Err(ConfigError::ValidationError(
            "Fetch multipliers must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Validate relevance model configuration.
fn validate_reranker_config(config: &RerankerConfig) -> Result<(), ConfigError> {
    if config.model_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Reranker model name cannot be empty".to_string(),
        ));
    }

    if config.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model cache directory cannot be empty".to_string(),
        ));
    }

    if config.batch_size == Some(0) {
        return Err(ConfigError::ValidationError(
            "Reranker batch_size must be greater than 0 when set".to_string(),
        ));
    }

    Ok(())
}
