//! Candidate sources consumed by the retrieval engine.
//!
//! Sift does not own the passage index. Anything that can answer a nearest
//! neighbour query or a sparse keyword query plugs in through the traits
//! below; [`InMemoryIndex`] is a small reference implementation of both.
//!
//! Sources return results in descending score order with the raw source
//! score in [`SearchResult::score`]. They should honor the filters they are
//! given, but the engine re-applies them to whatever comes back.

mod memory;
pub(crate) mod tokenizer;

pub use memory::{InMemoryIndex, Passage};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::models::{MetadataFilters, SearchResult};

/// Error type for source operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    /// The backing store could not be reached
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the query
    #[error("Query failed: {0}")]
    Query(String),

    /// Query embedding does not match the index dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The embedding provider failed
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Nearest-neighbour search over passage embeddings
#[async_trait]
pub trait VectorSearchSource: Send + Sync + Debug {
    /// Return up to `top_n` passages closest to `embedding`, most similar first
    async fn search(
        &self,
        embedding: &[f32],
        top_n: usize,
        filters: &MetadataFilters,
    ) -> Result<Vec<SearchResult>, SourceError>;
}

/// Sparse keyword (BM25-style) search over passage text
#[async_trait]
pub trait KeywordSearchSource: Send + Sync + Debug {
    /// Return up to `top_n` passages most relevant to `query`, best first
    async fn search(
        &self,
        query: &str,
        top_n: usize,
        filters: &MetadataFilters,
    ) -> Result<Vec<SearchResult>, SourceError>;
}

/// Turns query text into an embedding.
///
/// The engine never calls this itself. Callers embed the query up front,
/// usually through [`RetrievalRequest::embed_with`](crate::models::RetrievalRequest::embed_with).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SourceError>;
}
