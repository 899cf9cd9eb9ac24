//! The retrieval orchestrator.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::{Instrument, debug, info, info_span, warn};

use super::{RetrievalError, RetrievalOutcome, RetrievalStage, SourceCoverage};
use crate::config::{
    RetrievalConfig, SiftConfig, SourceConfig, validate_recency_weight,
};
use crate::models::{RetrievalRequest, SearchResult};
use crate::rerank::{CrossEncoderModel, DisabledReranker, ModelReranker, Reranker};
use crate::search::{RecencyTable, apply_recency_with, combine, diversify};
use crate::sources::{KeywordSearchSource, SourceError, VectorSearchSource};

/// Hybrid retrieval engine.
///
/// Fans out to the vector and keyword sources concurrently, then runs the
/// candidates through normalization and combination, recency weighting,
/// per-document diversification and optional reranking before cutting the
/// list to `top_k`.
///
/// The engine is cheap to clone and safe to share; concurrent calls do not
/// interact.
///
/// # Example
///
/// ```no_run
/// use sift::prelude::*;
///
/// # async fn run() -> sift::Result<()> {
/// let index = InMemoryIndex::new();
/// index
///     .insert(Passage::new("report-2024", "0", "Tutoring reached 300 students").with_embedding(vec![0.2, 0.9]))
///     .await?;
///
/// let engine = RetrievalEngine::builder()
///     .vector_source(index.clone())
///     .keyword_source(index)
///     .build()?;
///
/// let request = RetrievalRequest::builder("tutoring reach")
///     .top_k(5)
///     .embedding(vec![0.25, 0.85])
///     .build();
/// let results = engine.retrieve(&request).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RetrievalEngine {
    vector_source: Arc<dyn VectorSearchSource>,
    keyword_source: Arc<dyn KeywordSearchSource>,
    reranker: Arc<dyn Reranker>,
    config: RetrievalConfig,
    sources: SourceConfig,
    recency_table: RecencyTable,
    current_year: Option<i32>,
}

impl fmt::Debug for RetrievalEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalEngine")
            .field("vector_source", &self.vector_source)
            .field("keyword_source", &self.keyword_source)
            .field("config", &self.config)
            .field("sources", &self.sources)
            .finish()
    }
}

impl RetrievalEngine {
    /// Start building an engine with default configuration
    pub fn builder() -> RetrievalEngineBuilder {
        RetrievalEngineBuilder::new()
    }

    /// Engine defaults used when a request carries no override
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve the top passages for a request.
    pub async fn retrieve(
        &self,
        request: &RetrievalRequest,
    ) -> Result<Vec<SearchResult>, RetrievalError> {
        self.retrieve_detailed(request).await.map(|outcome| outcome.results)
    }

    /// Retrieve the top passages along with source coverage and the stages run.
    pub async fn retrieve_detailed(
        &self,
        request: &RetrievalRequest,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        let span = info_span!(
            "retrieve",
            top_k = request.top_k,
            has_embedding = request.query_embedding.is_some(),
            filtered = !request.filters.is_empty()
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &RetrievalRequest) -> Result<RetrievalOutcome, RetrievalError> {
        let mut stages = vec![RetrievalStage::QueryReceived];
        let config = self.validate_request(request)?;
        debug!(stage = %RetrievalStage::QueryReceived, "Request accepted");

        let (vector_results, keyword_results, coverage) = self.gather(request).await?;
        stages.push(RetrievalStage::CandidatesGathered);
        debug!(
            stage = %RetrievalStage::CandidatesGathered,
            vector = vector_results.len(),
            keyword = keyword_results.len(),
            ?coverage,
            "Candidates gathered"
        );

        let combined = combine(
            &vector_results,
            &keyword_results,
            config.vector_weight,
            config.keyword_weight,
        );
        stages.push(RetrievalStage::ScoresCombined);
        debug!(stage = %RetrievalStage::ScoresCombined, candidates = combined.len(), "Scores combined");

        let adjusted = apply_recency_with(
            &self.recency_table,
            combined,
            config.recency_weight,
            self.current_year(),
        );
        stages.push(RetrievalStage::RecencyAdjusted);
        debug!(stage = %RetrievalStage::RecencyAdjusted, weight = config.recency_weight, "Recency applied");

        let mut results = diversify(adjusted, config.max_results_per_document);
        stages.push(RetrievalStage::Diversified);
        debug!(stage = %RetrievalStage::Diversified, candidates = results.len(), "Diversified");

        let mut reranked = false;
        if config.enable_reranking && self.reranker.is_available() {
            let tail = match config.rerank_candidate_count {
                Some(count) if count < results.len() => results.split_off(count),
                _ => Vec::new(),
            };
            let head = self
                .reranker
                .rerank(&request.query, results, Some(request.top_k))
                .await;
            reranked = head.iter().any(|r| r.provenance.rerank_score.is_some());
            if reranked {
                stages.push(RetrievalStage::Reranked);
                debug!(stage = %RetrievalStage::Reranked, candidates = head.len(), "Reranked");
            }
            // Candidates outside the rerank window rank below the head
            results = head;
            results.extend(tail);
        } else if config.enable_reranking {
            debug!("Reranker unavailable, skipping rerank stage");
        }

        if let Some(floor) = request.min_score {
            results.retain(|r| r.score >= floor);
        }
        results.truncate(request.top_k);
        stages.push(RetrievalStage::TopKSelected);
        debug!(stage = %RetrievalStage::TopKSelected, returned = results.len(), "Retrieval complete");

        Ok(RetrievalOutcome {
            results,
            coverage,
            reranked,
            stages,
        })
    }

    /// Reject bad requests before touching any source and resolve per-call overrides
    fn validate_request(&self, request: &RetrievalRequest) -> Result<RetrievalConfig, RetrievalError> {
        if request.query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        if request.top_k == 0 {
            return Err(RetrievalError::ConfigurationInvalid(
                "top_k must be at least 1".to_string(),
            ));
        }
        if request.min_score.is_some_and(|floor| !floor.is_finite()) {
            return Err(RetrievalError::ConfigurationInvalid(
                "min_score must be a finite number".to_string(),
            ));
        }

        let mut config = self.config.clone();
        if let Some(weight) = request.recency_weight {
            validate_recency_weight(weight)?;
            config.recency_weight = weight;
        }
        Ok(config)
    }

    /// Fetch both candidate sets concurrently and re-apply the request filters.
    async fn gather(
        &self,
        request: &RetrievalRequest,
    ) -> Result<(Vec<SearchResult>, Vec<SearchResult>, SourceCoverage), RetrievalError> {
        let vector_n = request.top_k.saturating_mul(self.sources.vector_fetch_multiplier);
        let keyword_n = request.top_k.saturating_mul(self.sources.keyword_fetch_multiplier);
        let filters = &request.filters;

        let vector_fetch = async {
            match request.query_embedding.as_deref() {
                Some(embedding) => self.vector_source.search(embedding, vector_n, filters).await,
                None => Err(SourceError::Unavailable(
                    "no query embedding supplied".to_string(),
                )),
            }
        };
        let keyword_fetch = self.keyword_source.search(&request.query, keyword_n, filters);
        let both = futures::future::join(vector_fetch, keyword_fetch);

        let (vector, keyword) = match self.sources.fetch_timeout() {
            Some(limit) => tokio::time::timeout(limit, both).await.map_err(|_| {
                warn!(timeout_ms = limit.as_millis() as u64, "Candidate fetch timed out");
                RetrievalError::Timeout { after: limit }
            })?,
            None => both.await,
        };

        let (mut vector_results, mut keyword_results, coverage) = match (vector, keyword) {
            (Ok(vector), Ok(keyword)) => (vector, keyword, SourceCoverage::Both),
            (Ok(vector), Err(e)) => {
                warn!(error = %e, "Keyword search failed, continuing with vector results only");
                (vector, Vec::new(), SourceCoverage::VectorOnly)
            }
            (Err(e), Ok(keyword)) => {
                if request.query_embedding.is_some() {
                    warn!(error = %e, "Vector search failed, continuing with keyword results only");
                } else {
                    debug!("No query embedding, using keyword results only");
                }
                (Vec::new(), keyword, SourceCoverage::KeywordOnly)
            }
            (Err(vector), Err(keyword)) => {
                warn!(vector_error = %vector, keyword_error = %keyword, "Both candidate sources failed");
                return Err(RetrievalError::SourceUnavailable { vector, keyword });
            }
        };

        if !filters.is_empty() {
            vector_results.retain(|r| filters.matches(&r.metadata));
            keyword_results.retain(|r| filters.matches(&r.metadata));
        }

        Ok((vector_results, keyword_results, coverage))
    }

    fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Utc::now().year())
    }
}

/// Builder for [`RetrievalEngine`].
pub struct RetrievalEngineBuilder {
    vector_source: Option<Arc<dyn VectorSearchSource>>,
    keyword_source: Option<Arc<dyn KeywordSearchSource>>,
    reranker: Arc<dyn Reranker>,
    config: RetrievalConfig,
    sources: SourceConfig,
    recency_table: RecencyTable,
    current_year: Option<i32>,
}

impl RetrievalEngineBuilder {
    /// Create a builder with default configuration and reranking disabled
    pub fn new() -> Self {
        Self {
            vector_source: None,
            keyword_source: None,
            reranker: Arc::new(DisabledReranker),
            config: RetrievalConfig::default(),
            sources: SourceConfig::default(),
            recency_table: RecencyTable::DEFAULT,
            current_year: None,
        }
    }

    /// Create a builder from a full configuration.
    ///
    /// When reranking is enabled the configured cross-encoder is used; it is
    /// only functional with the `cross-encoder` feature.
    pub fn from_config(config: &SiftConfig) -> Self {
        let builder = Self::new()
            .config(config.retrieval.clone())
            .source_config(config.sources.clone());
        if config.retrieval.enable_reranking {
            builder.reranker(ModelReranker::new(CrossEncoderModel::new(
                config.reranker.clone(),
            )))
        } else {
            builder
        }
    }

    /// Set the vector search source
    pub fn vector_source(mut self, source: impl VectorSearchSource + 'static) -> Self {
        self.vector_source = Some(Arc::new(source));
        self
    }

    /// Set a shared vector search source
    pub fn shared_vector_source(mut self, source: Arc<dyn VectorSearchSource>) -> Self {
        self.vector_source = Some(source);
        self
    }

    /// Set the keyword search source
    pub fn keyword_source(mut self, source: impl KeywordSearchSource + 'static) -> Self {
        self.keyword_source = Some(Arc::new(source));
        self
    }

    /// Set a shared keyword search source
    pub fn shared_keyword_source(mut self, source: Arc<dyn KeywordSearchSource>) -> Self {
        self.keyword_source = Some(source);
        self
    }

    /// Set the reranker
    pub fn reranker(mut self, reranker: impl Reranker + 'static) -> Self {
        self.reranker = Arc::new(reranker);
        self
    }

    /// Set a shared reranker
    pub fn shared_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = reranker;
        self
    }

    /// Set the default retrieval configuration
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the candidate fetching configuration
    pub fn source_config(mut self, sources: SourceConfig) -> Self {
        self.sources = sources;
        self
    }

    /// Replace the recency step table
    pub fn recency_table(mut self, table: RecencyTable) -> Self {
        self.recency_table = table;
        self
    }

    /// Pin the year used for recency instead of reading the clock
    pub fn current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    /// Validate the configuration and build the engine.
    ///
    /// With reranking enabled this also warms the reranker up, which may load
    /// a model and block for a while.
    pub fn build(self) -> Result<RetrievalEngine, RetrievalError> {
        let vector_source = self.vector_source.ok_or_else(|| {
            RetrievalError::ConfigurationInvalid("a vector search source is required".to_string())
        })?;
        let keyword_source = self.keyword_source.ok_or_else(|| {
            RetrievalError::ConfigurationInvalid("a keyword search source is required".to_string())
        })?;

        self.config.validate()?;
        if self.sources.vector_fetch_multiplier == 0 || self.sources.keyword_fetch_multiplier == 0 {
            return Err(RetrievalError::ConfigurationInvalid(
                "fetch multipliers must be at least 1".to_string(),
            ));
        }

        if self.config.enable_reranking {
            if self.reranker.is_available() {
                info!("Reranker ready");
            } else {
                warn!("Reranking enabled but no relevance model is available; results will not be reranked");
            }
        }

        Ok(RetrievalEngine {
            vector_source,
            keyword_source,
            reranker: self.reranker,
            config: self.config,
            sources: self.sources,
            recency_table: self.recency_table,
            current_year: self.current_year,
        })
    }
}

impl Default for RetrievalEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
