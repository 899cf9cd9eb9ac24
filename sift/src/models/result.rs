//! Candidate passages and their score provenance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Structured facts about the document a passage belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    /// Document type (e.g. "annual_report", "grant_proposal")
    pub document_type: Option<String>,

    /// Publication year, if known
    pub publication_year: Option<i32>,

    /// Program tags attached to the document
    pub programs: BTreeSet<String>,

    /// Any additional key/value metadata
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DocumentMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document type
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Set the publication year
    pub fn with_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    /// Add a program tag
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.programs.insert(program.into());
        self
    }

    /// Attach an extra metadata value
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Intermediate scores recorded as a result moves through the pipeline.
///
/// Each stage writes only its own fields, so a finished result shows exactly
/// what every stage contributed. A field left as `None` means the stage that
/// owns it did not run (or did not apply) for this result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreProvenance {
    /// Similarity reported by the vector source
    pub raw_vector_score: Option<f32>,

    /// Relevance reported by the keyword source
    pub raw_keyword_score: Option<f32>,

    /// Vector score after min-max normalization (0.0 when only keyword search found it)
    pub normalized_vector_score: Option<f32>,

    /// Keyword score after min-max normalization (0.0 when only vector search found it)
    pub normalized_keyword_score: Option<f32>,

    /// Weighted combination of the normalized scores
    pub hybrid_score: Option<f32>,

    /// Multiplier taken from the recency table
    pub age_multiplier: Option<f32>,

    /// Score before the recency adjustment
    pub pre_recency_score: Option<f32>,

    /// Score before reranking
    pub pre_rerank_score: Option<f32>,

    /// Score assigned by the relevance model
    pub rerank_score: Option<f32>,
}

/// One candidate passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Passage identifier, unique within its document
    pub chunk_id: String,

    /// Owning document identifier
    pub doc_id: String,

    /// Literal passage text
    pub text: String,

    /// Document metadata
    #[serde(default)]
    pub metadata: DocumentMetadata,

    /// Current authoritative relevance score
    pub score: f32,

    /// Per-stage score record
    #[serde(default)]
    pub provenance: ScoreProvenance,
}

impl SearchResult {
    /// Create a result with empty metadata and provenance
    pub fn new(
        doc_id: impl Into<String>,
        chunk_id: impl Into<String>,
        text: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            doc_id: doc_id.into(),
            text: text.into(),
            metadata: DocumentMetadata::default(),
            score,
            provenance: ScoreProvenance::default(),
        }
    }

    /// Replace the metadata
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Key identifying the same passage across both candidate sets
    pub(crate) fn identity(&self) -> (&str, &str) {
        (&self.doc_id, &self.chunk_id)
    }

    /// Get a human-readable summary of the result
    pub fn summary(&self) -> String {
        let preview: String = self.text.chars().take(100).collect();
        format!("{}#{}: {}", self.doc_id, self.chunk_id, preview)
    }

    /// One-line trail of the scores each stage produced
    pub fn explain(&self) -> String {
        let p = &self.provenance;
        let mut out = String::new();
        let fields = [
            ("vector", p.raw_vector_score),
            ("keyword", p.raw_keyword_score),
            ("vector_norm", p.normalized_vector_score),
            ("keyword_norm", p.normalized_keyword_score),
            ("hybrid", p.hybrid_score),
            ("age_multiplier", p.age_multiplier),
            ("pre_recency", p.pre_recency_score),
            ("pre_rerank", p.pre_rerank_score),
            ("rerank", p.rerank_score),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                let _ = write!(out, "{}={:.4} ", name, value);
            }
        }
        let _ = write!(out, "final={:.4}", self.score);
        out
    }
}
