//! Configuration system for Sift.
//!
//! Configuration can be assembled in code with [`ConfigBuilder`] or loaded
//! from files and environment variables with [`ConfigLoader`]. Both paths
//! validate before handing back a [`SiftConfig`].

mod builder;
mod loader;
mod models;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "sift.toml",
    "sift.yaml",
    "sift.yml",
    "sift.json",
    ".sift/config.toml",
    ".sift/config.yaml",
    ".sift/config.yml",
    ".sift/config.json",
];

/// Environment variable prefix for Sift configuration.
///
/// Nested keys are separated by a double underscore, e.g.
/// `SIFT_RETRIEVAL__VECTOR_WEIGHT=0.8`.
pub const ENV_PREFIX: &str = "SIFT_";

/// Configuration error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
