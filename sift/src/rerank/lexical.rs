//! Query term overlap relevance model.

use std::collections::HashSet;

use super::{RelevanceModel, RerankError};
use crate::sources::tokenizer::tokenize;

/// Scores a passage by the fraction of distinct query terms it contains.
///
/// Scores fall in `[0, 1]`. Always ready; useful where no cross-encoder is
/// installed and as a deterministic model in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOverlapModel;

impl RelevanceModel for LexicalOverlapModel {
    fn is_ready(&self) -> bool {
        true
    }

    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RerankError> {
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        if query_terms.is_empty() {
            return Ok(vec![0.0; passages.len()]);
        }

        Ok(passages
            .iter()
            .map(|passage| {
                let passage_terms: HashSet<String> = tokenize(passage).into_iter().collect();
                let shared = query_terms.intersection(&passage_terms).count();
                shared as f32 / query_terms.len() as f32
            })
            .collect())
    }
}
