//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Builder for creating SiftConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: SiftConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: SiftConfig::default(),
        }
    }

    /// Replace the whole retrieval section, e.g. with a preset.
    pub fn with_retrieval_config(mut self, retrieval: RetrievalConfig) -> Self {
        self.config.retrieval = retrieval;
        self
    }

    /// Set the vector and keyword weights.
    pub fn with_weights(mut self, vector_weight: f32, keyword_weight: f32) -> Self {
        self.config.retrieval.vector_weight = vector_weight;
        self.config.retrieval.keyword_weight = keyword_weight;
        self
    }

    /// Set the default recency weight.
    pub fn with_recency_weight(mut self, weight: f32) -> Self {
        self.config.retrieval.recency_weight = weight;
        self
    }

    /// Set the per-document result cap.
    pub fn with_max_results_per_document(mut self, max: usize) -> Self {
        self.config.retrieval.max_results_per_document = max;
        self
    }

    /// Enable or disable reranking.
    pub fn with_reranking(mut self, enabled: bool) -> Self {
        self.config.retrieval.enable_reranking = enabled;
        self
    }

    /// Limit reranking to the top `count` candidates.
    pub fn with_rerank_candidate_count(mut self, count: usize) -> Self {
        self.config.retrieval.rerank_candidate_count = Some(count);
        self
    }

    /// Bound the candidate fetch phase.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.sources.fetch_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set how many candidates are requested from each source per result.
    pub fn with_fetch_multipliers(mut self, vector: usize, keyword: usize) -> Self {
        self.config.sources.vector_fetch_multiplier = vector;
        self.config.sources.keyword_fetch_multiplier = keyword;
        self
    }

    /// Set the cross-encoder model.
    pub fn with_reranker_model(mut self, model_name: impl Into<String>) -> Self {
        self.config.reranker.model_name = model_name.into();
        self
    }

    /// Set the model cache directory.
    pub fn with_model_cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.reranker.cache_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the reranker inference batch size.
    pub fn with_rerank_batch_size(mut self, batch_size: usize) -> Self {
        self.config.reranker.batch_size = Some(batch_size);
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self.config.logging.stdout = false;
        self
    }

    /// Use default logging configuration (JSON to stdout at Info level)
    pub fn with_default_logging(mut self) -> Self {
        self.config.logging.level = LogLevel::Info;
        self.config.logging.format = LogFormat::Json;
        self.config.logging.file = None;
        self.config.logging.stdout = true;
        self
    }

    /// Create a configuration for development.
    ///
    /// Pretty debug-level logging and no fetch timeout.
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Create a configuration for automated testing.
    ///
    /// Recency is disabled so scores only depend on the fixtures, and models
    /// are cached under a local test directory.
    pub fn testing() -> Self {
        Self::development()
            .with_recency_weight(0.0)
            .with_model_cache_dir(PathBuf::from("./test_cache"))
    }

    /// Create a production-ready configuration.
    ///
    /// JSON logging at Info level and a five second fetch timeout.
    pub fn production() -> Self {
        Self::new()
            .with_default_logging()
            .with_fetch_timeout(Duration::from_secs(5))
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<SiftConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
