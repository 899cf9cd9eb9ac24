//! Retrieval errors.

use std::time::Duration;

use crate::config::ConfigError;
use crate::sources::SourceError;

/// Error type for retrieval calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetrievalError {
    /// Both candidate sources failed
    #[error("No candidate source available (vector: {vector}; keyword: {keyword})")]
    SourceUnavailable {
        vector: SourceError,
        keyword: SourceError,
    },

    /// The fetch phase exceeded the configured timeout
    #[error("Candidate fetch timed out after {after:?}")]
    Timeout { after: Duration },

    /// The request or engine configuration is invalid
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    /// The query text is blank
    #[error("Query text is empty")]
    EmptyQuery,
}

impl RetrievalError {
    /// Check whether retrying the same request could succeed.
    ///
    /// Source failures and timeouts are transient; configuration and query
    /// errors need the caller to change the request.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::Timeout { .. })
    }
}

impl From<ConfigError> for RetrievalError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(msg) => Self::ConfigurationInvalid(msg),
            other => Self::ConfigurationInvalid(other.to_string()),
        }
    }
}
