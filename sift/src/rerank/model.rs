//! Adapter from blocking relevance models to the async [`Reranker`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{RerankError, Reranker};
use crate::models::SearchResult;

/// A blocking pairwise relevance model.
///
/// Implementations may do heavy CPU work or lazy model loading in these
/// calls; [`ModelReranker`] runs them on tokio's blocking pool.
pub trait RelevanceModel: Send + Sync + 'static {
    /// Check whether the model is loaded and able to score
    fn is_ready(&self) -> bool;

    /// Score each passage against the query, one score per passage in input order
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RerankError>;
}

/// [`Reranker`] backed by a [`RelevanceModel`].
#[derive(Debug)]
pub struct ModelReranker<M> {
    model: Arc<M>,
}

impl<M> Clone for ModelReranker<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
        }
    }
}

impl<M: RelevanceModel> ModelReranker<M> {
    /// Wrap a relevance model
    pub fn new(model: M) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    /// The wrapped model
    pub fn model(&self) -> &M {
        &self.model
    }

    async fn score(&self, query: &str, results: &[SearchResult]) -> Result<Vec<f32>, RerankError> {
        let model = Arc::clone(&self.model);
        let query = query.to_string();
        let texts: Vec<String> = results.iter().map(|r| r.text.clone()).collect();
        let expected = texts.len();

        let scores = tokio::task::spawn_blocking(move || {
            let passages: Vec<&str> = texts.iter().map(String::as_str).collect();
            model.score_pairs(&query, &passages)
        })
        .await
        .map_err(|e| RerankError::TaskFailed(e.to_string()))??;

        if scores.len() != expected {
            return Err(RerankError::ScoreCountMismatch {
                expected,
                actual: scores.len(),
            });
        }
        Ok(scores)
    }
}

#[async_trait]
impl<M: RelevanceModel> Reranker for ModelReranker<M> {
    fn is_available(&self) -> bool {
        self.model.is_ready()
    }

    async fn rerank(
        &self,
        query: &str,
        results: Vec<SearchResult>,
        top_n: Option<usize>,
    ) -> Vec<SearchResult> {
        if query.trim().is_empty() || results.is_empty() {
            return Vec::new();
        }

        let scores = match self.score(query, &results).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, candidates = results.len(), "Reranking failed, keeping prior order");
                return results;
            }
        };

        let mut reranked: Vec<SearchResult> = results
            .into_iter()
            .zip(scores)
            .map(|(mut result, score)| {
                result.provenance.pre_rerank_score = Some(result.score);
                result.provenance.rerank_score = Some(score);
                result.score = score;
                result
            })
            .collect();

        reranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        if let Some(top_n) = top_n {
            reranked.truncate(top_n);
        }

        debug!(kept = reranked.len(), "Reranked candidates");
        reranked
    }
}
