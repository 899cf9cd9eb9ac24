//! Optional pairwise reranking.
//!
//! A [`Reranker`] re-scores `(query, passage)` pairs with a relevance model
//! that sees both texts together. Reranking is best effort: a reranker that
//! cannot load its model reports itself unavailable and the engine skips the
//! stage, and a reranker that fails while scoring hands back its input.
//!
//! [`ModelReranker`] adapts any blocking [`RelevanceModel`] to the async
//! trait. Two models ship with the crate:
//!
//! - [`CrossEncoderModel`], a fastembed cross-encoder behind the
//!   `cross-encoder` feature
//! - [`LexicalOverlapModel`], a dependency-free query term overlap scorer

mod cross_encoder;
mod lexical;
mod model;

pub use cross_encoder::CrossEncoderModel;
pub use lexical::LexicalOverlapModel;
pub use model::{ModelReranker, RelevanceModel};

use async_trait::async_trait;

use crate::models::SearchResult;

/// Error type for relevance model operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RerankError {
    /// The model is not loaded or could not be loaded
    #[error("Relevance model unavailable")]
    Unavailable,

    /// The model failed to score the batch
    #[error("Relevance model error: {0}")]
    Model(String),

    /// The model returned a different number of scores than passages
    #[error("Relevance model returned {actual} scores for {expected} passages")]
    ScoreCountMismatch { expected: usize, actual: usize },

    /// The blocking scoring task panicked or was cancelled
    #[error("Scoring task failed: {0}")]
    TaskFailed(String),
}

/// Re-scores candidates against the query.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Check whether the relevance model is loaded and usable
    fn is_available(&self) -> bool;

    /// Score every passage against `query`, sort descending and keep `top_n`.
    ///
    /// Returns an empty list for an empty query or empty input. On a scoring
    /// failure the input is returned unchanged.
    async fn rerank(
        &self,
        query: &str,
        results: Vec<SearchResult>,
        top_n: Option<usize>,
    ) -> Vec<SearchResult>;
}

/// Reranker that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledReranker;

#[async_trait]
impl Reranker for DisabledReranker {
    fn is_available(&self) -> bool {
        false
    }

    async fn rerank(
        &self,
        _query: &str,
        results: Vec<SearchResult>,
        _top_n: Option<usize>,
    ) -> Vec<SearchResult> {
        results
    }
}
