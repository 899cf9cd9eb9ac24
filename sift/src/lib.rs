//! # Sift
//!
//! Hybrid passage retrieval for retrieval-augmented generation. Sift sits
//! between your indexes and your prompt builder: it asks a vector index and a
//! keyword index for candidates, fuses their scores, favors recent documents,
//! keeps one long document from crowding out the rest and, when a relevance
//! model is available, reranks what is left.
//!
//! ## Quick Start
//!
//! ```rust
//! use sift::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let index = InMemoryIndex::new();
//!     index
//!         .insert(
//!             Passage::new("annual-report-2024", "3", "After-school tutoring served 310 students")
//!                 .with_metadata(DocumentMetadata::new().with_year(2024))
//!                 .with_embedding(vec![0.9, 0.1, 0.0]),
//!         )
//!         .await?;
//!
//!     let engine = RetrievalEngine::builder()
//!         .vector_source(index.clone())
//!         .keyword_source(index)
//!         .build()?;
//!
//!     // Embeddings come from your own provider
//!     let request = RetrievalRequest::builder("tutoring students served")
//!         .top_k(5)
//!         .embedding(vec![0.8, 0.2, 0.0])
//!         .build();
//!
//!     let results = engine.retrieve(&request).await?;
//!     assert_eq!(results[0].doc_id, "annual-report-2024");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **search**: pure scoring stages (normalize, combine, recency, diversify)
//! - **sources**: traits for candidate indexes plus an in-memory index
//! - **rerank**: optional pairwise relevance scoring; a fastembed
//!   cross-encoder is available behind the `cross-encoder` feature
//! - **retrieval**: the engine that runs the stages in order
//! - **config** / **logging**: figment-based configuration and tracing setup

pub mod config;
pub mod logging;
pub mod models;
pub mod rerank;
pub mod retrieval;
pub mod search;
pub mod sources;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::init;

    // Config types
    pub use crate::config::{
        ConfigBuilder, ConfigLoader, LogFormat, LogLevel, RetrievalConfig, SiftConfig,
        SourceConfig,
    };

    // Request and result types
    pub use crate::models::{
        DocumentMetadata, MetadataFilters, RetrievalRequest, ScoreProvenance, SearchResult,
        YearRange,
    };

    // Engine
    pub use crate::retrieval::{
        RetrievalEngine, RetrievalEngineBuilder, RetrievalError, RetrievalOutcome,
        SourceCoverage,
    };

    // Sources and reranking
    pub use crate::rerank::{LexicalOverlapModel, ModelReranker, Reranker};
    pub use crate::sources::{
        EmbeddingProvider, InMemoryIndex, KeywordSearchSource, Passage, SourceError,
        VectorSearchSource,
    };

    pub use crate::{Result, SiftError};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Sift operations
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] logging::LogError),

    /// Candidate source error
    #[error("Source error: {0}")]
    Source(#[from] sources::SourceError),

    /// Relevance model error
    #[error("Rerank error: {0}")]
    Rerank(#[from] rerank::RerankError),

    /// Retrieval error
    #[error(transparent)]
    Retrieval(#[from] retrieval::RetrievalError),
}

/// Result type for Sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Validate `config`, install logging and return an engine builder for it.
///
/// The returned guard, when present, flushes file logging and must be kept
/// alive for as long as the application logs. Sources still have to be
/// attached to the builder.
///
/// # Examples
///
/// ```rust,no_run
/// use sift::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let config = ConfigLoader::new().load_default_files().load_env().extract()?;
/// let (builder, _guard) = init(&config)?;
///
/// let index = InMemoryIndex::new();
/// let engine = builder
///     .vector_source(index.clone())
///     .keyword_source(index)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub fn init(
    config: &config::SiftConfig,
) -> Result<(
    retrieval::RetrievalEngineBuilder,
    Option<tracing_appender::non_blocking::WorkerGuard>,
)> {
    config::validate_config(config)?;
    let guard = logging::init(&config.logging)?;
    tracing::debug!(version = VERSION, "Sift initialized");

    Ok((retrieval::RetrievalEngineBuilder::from_config(config), guard))
}
