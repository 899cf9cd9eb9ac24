//! Cross-encoder relevance model backed by fastembed.
//!
//! Only functional with the `cross-encoder` feature. The model is loaded on
//! first use, exactly once; a failed load is remembered and the model stays
//! unavailable for the lifetime of the value.

use std::fmt;

#[cfg(feature = "cross-encoder")]
use std::sync::{Mutex, OnceLock};

use super::{RelevanceModel, RerankError};
use crate::config::RerankerConfig;

/// Cross-encoder scoring `(query, passage)` pairs.
pub struct CrossEncoderModel {
    config: RerankerConfig,
    #[cfg(feature = "cross-encoder")]
    model: OnceLock<Option<Mutex<fastembed::TextRerank>>>,
}

impl CrossEncoderModel {
    /// Create an unloaded model from configuration
    pub fn new(config: RerankerConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "cross-encoder")]
            model: OnceLock::new(),
        }
    }

    /// Configured model name
    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

impl Default for CrossEncoderModel {
    fn default() -> Self {
        Self::new(RerankerConfig::default())
    }
}

impl fmt::Debug for CrossEncoderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossEncoderModel")
            .field("model_name", &self.config.model_name)
            .field("cache_dir", &self.config.cache_dir)
            .finish()
    }
}

#[cfg(feature = "cross-encoder")]
impl CrossEncoderModel {
    fn loaded(&self) -> Option<&Mutex<fastembed::TextRerank>> {
        self.model
            .get_or_init(|| match load_model(&self.config) {
                Ok(model) => {
                    tracing::info!(model = %self.config.model_name, "Loaded cross-encoder");
                    Some(Mutex::new(model))
                }
                Err(e) => {
                    tracing::warn!(
                        model = %self.config.model_name,
                        error = %e,
                        "Cross-encoder unavailable, reranking disabled"
                    );
                    None
                }
            })
            .as_ref()
    }
}

#[cfg(feature = "cross-encoder")]
fn reranker_model(name: &str) -> Result<fastembed::RerankerModel, RerankError> {
    use fastembed::RerankerModel;

    match name {
        "BAAI/bge-reranker-base" => Ok(RerankerModel::BGERerankerBase),
        "rozgo/bge-reranker-v2-m3" => Ok(RerankerModel::BGERerankerV2M3),
        "jinaai/jina-reranker-v1-turbo-en" => Ok(RerankerModel::JINARerankerV1TurboEn),
        "jinaai/jina-reranker-v2-base-multilingual" => {
            Ok(RerankerModel::JINARerankerV2BaseMultiligual)
        }
        other => Err(RerankError::Model(format!("Unknown reranker model: {}", other))),
    }
}

#[cfg(feature = "cross-encoder")]
fn load_model(config: &RerankerConfig) -> Result<fastembed::TextRerank, RerankError> {
    let options = fastembed::RerankInitOptions::new(reranker_model(&config.model_name)?)
        .with_cache_dir(config.cache_dir.clone())
        .with_show_download_progress(config.show_download_progress);

    fastembed::TextRerank::try_new(options).map_err(|e| RerankError::Model(e.to_string()))
}

impl RelevanceModel for CrossEncoderModel {
    #[cfg(feature = "cross-encoder")]
    fn is_ready(&self) -> bool {
        self.loaded().is_some()
    }

    #[cfg(not(feature = "cross-encoder"))]
    fn is_ready(&self) -> bool {
        false
    }

    #[cfg(feature = "cross-encoder")]
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RerankError> {
        let model = self.loaded().ok_or(RerankError::Unavailable)?;
        let mut guard = model
            .lock()
            .map_err(|_| RerankError::Model("cross-encoder lock poisoned".to_string()))?;

        let documents: Vec<&str> = passages.to_vec();
        let ranked = guard
            .rerank(query, &documents, false, self.config.batch_size)
            .map_err(|e| RerankError::Model(e.to_string()))?;

        // Results come back sorted by score; put them back in passage order.
        let mut scores: Vec<Option<f32>> = vec![None; passages.len()];
        for item in ranked {
            if let Some(slot) = scores.get_mut(item.index) {
                *slot = Some(item.score);
            }
        }
        let filled: Vec<f32> = scores.iter().flatten().copied().collect();
        if filled.len() != passages.len() {
            return Err(RerankError::ScoreCountMismatch {
                expected: passages.len(),
                actual: filled.len(),
            });
        }
        Ok(filled)
    }

    #[cfg(not(feature = "cross-encoder"))]
    fn score_pairs(&self, _query: &str, _passages: &[&str]) -> Result<Vec<f32>, RerankError> {
        Err(RerankError::Unavailable)
    }
}
