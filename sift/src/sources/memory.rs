//! In-memory passage index serving both vector and keyword search.
//!
//! Intended for tests, demos and small corpora. Vector search is a brute
//! force cosine scan; keyword search is Okapi BM25 over the tokenized text.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::tokenizer::tokenize;
use super::{KeywordSearchSource, SourceError, VectorSearchSource};
use crate::models::{DocumentMetadata, MetadataFilters, SearchResult};

const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;

/// A passage stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub doc_id: String,
    pub chunk_id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl Passage {
    /// Create a passage without metadata or embedding
    pub fn new(
        doc_id: impl Into<String>,
        chunk_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            chunk_id: chunk_id.into(),
            text: text.into(),
            metadata: DocumentMetadata::default(),
            embedding: None,
        }
    }

    /// Attach document metadata
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach an embedding
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    fn to_result(&self, score: f32) -> SearchResult {
        SearchResult::new(&self.doc_id, &self.chunk_id, &self.text, score)
            .with_metadata(self.metadata.clone())
    }
}

#[derive(Debug)]
struct IndexedPassage {
    passage: Passage,
    term_frequencies: HashMap<String, u32>,
    length: usize,
}

#[derive(Debug, Default)]
struct IndexState {
    passages: Vec<IndexedPassage>,
    positions: HashMap<(String, String), usize>,
    document_frequencies: HashMap<String, usize>,
    total_length: usize,
    dimension: Option<usize>,
}

impl IndexState {
    fn forget_terms(&mut self, position: usize) {
        let old = &self.passages[position];
        self.total_length -= old.length;
        for term in old.term_frequencies.keys() {
            if let Some(count) = self.document_frequencies.get_mut(term) {
                *count -= 1;
                if *count == 0 {
                    self.document_frequencies.remove(term);
                }
            }
        }
    }

    fn average_length(&self) -> f32 {
        if self.passages.is_empty() {
            0.0
        } else {
            self.total_length as f32 / self.passages.len() as f32
        }
    }
}

/// Thread-safe in-memory index implementing both search traits.
///
/// Cloning is cheap and clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    state: Arc<RwLock<IndexState>>,
}

impl InMemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a passage, replacing any passage with the same `(doc_id, chunk_id)`.
    ///
    /// All embeddings in one index must share a dimension.
    pub async fn insert(&self, passage: Passage) -> Result<(), SourceError> {
        let mut state = self.state.write().await;

        if let Some(embedding) = &passage.embedding {
            let dimension = state.dimension;
            match dimension {
                Some(expected) if expected != embedding.len() => {
                    return Err(SourceError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    });
                }
                Some(_) => {}
                None => state.dimension = Some(embedding.len()),
            }
        }

        let tokens = tokenize(&passage.text);
        let mut term_frequencies: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *term_frequencies.entry(token.clone()).or_insert(0) += 1;
        }
        for term in term_frequencies.keys() {
            *state.document_frequencies.entry(term.clone()).or_insert(0) += 1;
        }
        state.total_length += tokens.len();

        let key = (passage.doc_id.clone(), passage.chunk_id.clone());
        let indexed = IndexedPassage {
            passage,
            term_frequencies,
            length: tokens.len(),
        };

        match state.positions.get(&key).copied() {
            Some(position) => {
                state.forget_terms(position);
                state.passages[position] = indexed;
            }
            None => {
                let position = state.passages.len();
                state.passages.push(indexed);
                state.positions.insert(key, position);
            }
        }

        Ok(())
    }

    /// Insert several passages, stopping at the first failure
    pub async fn insert_many<I>(&self, passages: I) -> Result<(), SourceError>
    where
        I: IntoIterator<Item = Passage>,
    {
        for passage in passages {
            self.insert(passage).await?;
        }
        Ok(())
    }

    /// Number of stored passages
    pub async fn len(&self) -> usize {
        self.state.read().await.passages.len()
    }

    /// Check if the index holds no passages
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.passages.is_empty()
    }

    /// Remove every passage
    pub async fn clear(&self) {
        *self.state.write().await = IndexState::default();
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn take_top(mut scored: Vec<SearchResult>, top_n: usize) -> Vec<SearchResult> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);
    scored
}

#[async_trait]
impl VectorSearchSource for InMemoryIndex {
    async fn search(
        &self,
        embedding: &[f32],
        top_n: usize,
        filters: &MetadataFilters,
    ) -> Result<Vec<SearchResult>, SourceError> {
        let state = self.state.read().await;

        let Some(dimension) = state.dimension else {
            return Ok(Vec::new());
        };
        if embedding.len() != dimension {
            return Err(SourceError::DimensionMismatch {
                expected: dimension,
                actual: embedding.len(),
            });
        }

        let scored = state
            .passages
            .iter()
            .filter(|indexed| filters.matches(&indexed.passage.metadata))
            .filter_map(|indexed| {
                let stored = indexed.passage.embedding.as_deref()?;
                Some(indexed.passage.to_result(cosine_similarity(embedding, stored)))
            })
            .collect();

        Ok(take_top(scored, top_n))
    }
}

#[async_trait]
impl KeywordSearchSource for InMemoryIndex {
    async fn search(
        &self,
        query: &str,
        top_n: usize,
        filters: &MetadataFilters,
    ) -> Result<Vec<SearchResult>, SourceError> {
        let query_terms = tokenize(query);
        let state = self.state.read().await;
        if query_terms.is_empty() || state.passages.is_empty() {
            return Ok(Vec::new());
        }

        let n = state.passages.len() as f32;
        let avgdl = state.average_length().max(1.0);
        let idf: Vec<(&str, f32)> = query_terms
            .iter()
            .filter_map(|term| {
                let df = *state.document_frequencies.get(term)? as f32;
                Some((term.as_str(), ((n - df + 0.5) / (df + 0.5) + 1.0).ln()))
            })
            .collect();

        let scored = state
            .passages
            .iter()
            .filter(|indexed| filters.matches(&indexed.passage.metadata))
            .filter_map(|indexed| {
                let dl = indexed.length as f32;
                let score: f32 = idf
                    .iter()
                    .filter_map(|(term, idf)| {
                        let tf = *indexed.term_frequencies.get(*term)? as f32;
                        let tf_norm = (tf * (BM25_K1 + 1.0))
                            / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * dl / avgdl));
                        Some(idf * tf_norm)
                    })
                    .sum();
                (score > 0.0).then(|| indexed.passage.to_result(score))
            })
            .collect();

        Ok(take_top(scored, top_n))
    }
}
