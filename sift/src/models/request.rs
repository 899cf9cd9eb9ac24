//! Retrieval requests and metadata filters.

use serde::{Deserialize, Serialize};

use super::result::DocumentMetadata;
use crate::sources::{EmbeddingProvider, SourceError};

/// Inclusive publication year range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearRange {
    /// Range covering `start..=end`
    pub fn between(start: i32, end: i32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Range covering `start` and later
    pub fn since(start: i32) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Check whether a year falls inside the range
    pub fn contains(&self, year: i32) -> bool {
        self.start.is_none_or(|start| year >= start) && self.end.is_none_or(|end| year <= end)
    }
}

/// Optional metadata restrictions applied to candidate passages.
///
/// An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataFilters {
    /// Allowed document types
    pub document_types: Option<Vec<String>>,

    /// Program tag the document must carry
    pub program: Option<String>,

    /// Publication year range; documents with an unknown year never match
    pub year_range: Option<YearRange>,
}

impl MetadataFilters {
    /// Check if no restriction is set
    pub fn is_empty(&self) -> bool {
        self.document_types.is_none() && self.program.is_none() && self.year_range.is_none()
    }

    /// Check whether a document's metadata passes every restriction
    pub fn matches(&self, metadata: &DocumentMetadata) -> bool {
        if let Some(types) = &self.document_types {
            match &metadata.document_type {
                Some(doc_type) if types.iter().any(|t| t == doc_type) => {}
                _ => return false,
            }
        }

        if let Some(program) = &self.program
            && !metadata.programs.contains(program)
        {
            return false;
        }

        if let Some(range) = &self.year_range {
            match metadata.publication_year {
                Some(year) if range.contains(year) => {}
                _ => return false,
            }
        }

        true
    }
}

/// One query invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Natural-language query text
    pub query: String,

    /// Maximum number of results to return
    pub top_k: usize,

    /// Query embedding supplied by the caller's embedding provider
    #[serde(default)]
    pub query_embedding: Option<Vec<f32>>,

    /// Metadata restrictions
    #[serde(default)]
    pub filters: MetadataFilters,

    /// Per-call override of the configured recency weight
    #[serde(default)]
    pub recency_weight: Option<f32>,

    /// Drop final results scoring below this floor
    #[serde(default)]
    pub min_score: Option<f32>,
}

impl RetrievalRequest {
    /// Create a request with no embedding, filters or overrides
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            query_embedding: None,
            filters: MetadataFilters::default(),
            recency_weight: None,
            min_score: None,
        }
    }

    /// Start a builder for a request
    pub fn builder(query: impl Into<String>) -> RetrievalRequestBuilder {
        RetrievalRequestBuilder::new(query)
    }

    /// Fill in the query embedding by asking an embedding provider
    pub async fn embed_with<P>(mut self, provider: &P) -> Result<Self, SourceError>
    where
        P: EmbeddingProvider + ?Sized,
    {
        let embedding = provider.embed(&self.query).await?;
        self.query_embedding = Some(embedding);
        Ok(self)
    }
}

/// Builder for [`RetrievalRequest`]
#[derive(Debug, Clone)]
pub struct RetrievalRequestBuilder {
    request: RetrievalRequest,
}

impl RetrievalRequestBuilder {
    /// Create a builder with `top_k = 10`
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            request: RetrievalRequest::new(query, 10),
        }
    }

    /// Set the number of results
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.request.top_k = top_k;
        self
    }

    /// Provide the query embedding
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.request.query_embedding = Some(embedding);
        self
    }

    /// Restrict to the given document types
    pub fn document_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.filters.document_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to documents tagged with a program
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.request.filters.program = Some(program.into());
        self
    }

    /// Restrict to a publication year range
    pub fn years(mut self, range: YearRange) -> Self {
        self.request.filters.year_range = Some(range);
        self
    }

    /// Override the recency weight for this call
    pub fn recency_weight(mut self, weight: f32) -> Self {
        self.request.recency_weight = Some(weight);
        self
    }

    /// Drop results below a score floor
    pub fn min_score(mut self, min_score: f32) -> Self {
        self.request.min_score = Some(min_score);
        self
    }

    /// Finish the request
    pub fn build(self) -> RetrievalRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(doc_type: &str, year: Option<i32>, programs: &[&str]) -> DocumentMetadata {
        let mut metadata = DocumentMetadata::new().with_document_type(doc_type);
        metadata.publication_year = year;
        for program in programs {
            metadata = metadata.with_program(*program);
        }
        metadata
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filters = MetadataFilters::default();
        assert!(filters.is_empty());
        assert!(filters.matches(&DocumentMetadata::default()));
    }

    #[test]
    fn test_document_type_filter() {
        let filters = MetadataFilters {
            document_types: Some(vec!["report".to_string(), "proposal".to_string()]),
            ..Default::default()
        };
        assert!(filters.matches(&metadata("report", Some(2024), &[])));
        assert!(!filters.matches(&metadata("newsletter", Some(2024), &[])));
        assert!(!filters.matches(&DocumentMetadata::default()));
    }

    #[test]
    fn test_program_filter() {
        let filters = MetadataFilters {
            program: Some("housing".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&metadata("report", None, &["housing", "health"])));
        assert!(!filters.matches(&metadata("report", None, &["health"])));
    }

    #[test]
    fn test_year_range_excludes_unknown_years() {
        let filters = MetadataFilters {
            year_range: Some(YearRange::between(2020, 2023)),
            ..Default::default()
        };
        assert!(filters.matches(&metadata("report", Some(2020), &[])));
        assert!(filters.matches(&metadata("report", Some(2023), &[])));
        assert!(!filters.matches(&metadata("report", Some(2024), &[])));
        assert!(!filters.matches(&metadata("report", None, &[])));
    }

    #[test]
    fn test_open_ended_year_range() {
        let range = YearRange::since(2022);
        assert!(range.contains(2022));
        assert!(range.contains(2090));
        assert!(!range.contains(2021));
    }

    #[test]
    fn test_builder_sets_every_field() {
        let request = RetrievalRequest::builder("food security outcomes")
            .top_k(5)
            .embedding(vec![0.1, 0.2])
            .document_types(["report"])
            .program("nutrition")
            .years(YearRange::since(2021))
            .recency_weight(0.2)
            .min_score(0.1)
            .build();

        assert_eq!(request.top_k, 5);
        assert_eq!(request.query_embedding, Some(vec![0.1, 0.2]));
        assert_eq!(request.filters.program.as_deref(), Some("nutrition"));
        assert_eq!(request.recency_weight, Some(0.2));
        assert_eq!(request.min_score, Some(0.1));
    }
}
