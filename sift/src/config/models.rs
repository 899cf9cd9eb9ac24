//! Configuration model definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Main configuration structure for Sift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Default retrieval behaviour
    pub retrieval: RetrievalConfig,

    /// Candidate fetching
    pub sources: SourceConfig,

    /// Relevance model used for reranking
    pub reranker: RerankerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Scoring and ranking parameters for a retrieval call.
///
/// Weights are used exactly as given; they are not normalized to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Weight of the normalized vector score
    pub vector_weight: f32,

    /// Weight of the normalized keyword score
    pub keyword_weight: f32,

    /// Strength of the recency adjustment in `[0, 1]`; 0 disables it
    pub recency_weight: f32,

    /// Maximum passages any one document may contribute
    pub max_results_per_document: usize,

    /// Rerank candidates with the relevance model when one is available
    pub enable_reranking: bool,

    /// Number of top candidates to rerank; all of them when unset.
    /// Candidates past the count keep their prior order below the reranked head.
    pub rerank_candidate_count: Option<usize>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_weight: 0.7,
            keyword_weight: 0.3,
            recency_weight: 0.7,
            max_results_per_document: 3,
            enable_reranking: false,
            rerank_candidate_count: None,
        }
    }
}

impl RetrievalConfig {
    /// Favor semantic similarity over exact term matches
    pub fn semantic_focused() -> Self {
        Self {
            vector_weight: 0.9,
            keyword_weight: 0.1,
            ..Self::default()
        }
    }

    /// Favor exact term matches, useful for names, codes and acronyms
    pub fn keyword_focused() -> Self {
        Self {
            vector_weight: 0.3,
            keyword_weight: 0.7,
            ..Self::default()
        }
    }

    /// Apply the full recency discount
    pub fn recency_focused() -> Self {
        Self {
            recency_weight: 1.0,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// Weights may be negative but must be finite. The recency weight must
    /// lie in `[0, 1]` and every count must be at least one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.vector_weight.is_finite() {
            return Err(ConfigError::ValidationError(
                "vector_weight must be a finite number".to_string(),
            ));
        }
        if !self.keyword_weight.is_finite() {
            return Err(ConfigError::ValidationError(
                "keyword_weight must be a finite number".to_string(),
            ));
        }
        validate_recency_weight(self.recency_weight)?;
        if self.max_results_per_document < 1 {
            return Err(ConfigError::ValidationError(
                "max_results_per_document must be at least 1".to_string(),
            ));
        }
        if self.rerank_candidate_count == Some(0) {
            return Err(ConfigError::ValidationError(
                "rerank_candidate_count must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check that a recency weight lies in `[0, 1]`
pub fn validate_recency_weight(weight: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "recency_weight must be between 0 and 1, got {}",
            weight
        )))
    }
}

/// Candidate fetching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Upper bound on the concurrent fetch phase, in milliseconds
    pub fetch_timeout_ms: Option<u64>,

    /// Vector candidates requested per result (`top_k * multiplier`)
    pub vector_fetch_multiplier: usize,

    /// Keyword candidates requested per result (`top_k * multiplier`)
    pub keyword_fetch_multiplier: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: None,
            vector_fetch_multiplier: 4,
            keyword_fetch_multiplier: 2,
        }
    }
}

impl SourceConfig {
    /// Fetch timeout as a [`Duration`]
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

/// Relevance model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerConfig {
    /// Cross-encoder model name
    pub model_name: String,

    /// Directory where downloaded model files are cached
    pub cache_dir: PathBuf,

    /// Pairs scored per inference batch; model default when unset
    pub batch_size: Option<usize>,

    /// Print download progress when fetching the model
    pub show_download_progress: bool,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model_name: "BAAI/bge-reranker-base".to_string(),
            cache_dir: default_model_cache_dir(),
            batch_size: None,
            show_download_progress: false,
        }
    }
}

fn default_model_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "sift", "sift")
        .map(|dirs| dirs.cache_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from(".sift/models"))
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,

    /// Debug level
    Debug,

    /// Info level
    Info,

    /// Warn level
    Warn,

    /// Error level
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format (pretty)
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
