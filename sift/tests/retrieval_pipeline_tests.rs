//! End-to-end tests for the retrieval pipeline
//!
//! Covers score fusion, recency weighting, per-document caps, metadata
//! filters, score floors and reranking through the public engine API.

use async_trait::async_trait;
use sift::prelude::*;
use sift::retrieval::RetrievalStage;

/// Source that returns fixed results regardless of the query or filters
#[derive(Debug, Default)]
struct FixedSource {
    results: Vec<SearchResult>,
}

#[async_trait]
impl VectorSearchSource for FixedSource {
    async fn search(
        &self,
        _embedding: &[f32],
        top_n: usize,
        _filters: &MetadataFilters,
    ) -> std::result::Result<Vec<SearchResult>, SourceError> {
        Ok(self.results.iter().take(top_n).cloned().collect())
    }
}

#[async_trait]
impl KeywordSearchSource for FixedSource {
    async fn search(
        &self,
        _query: &str,
        top_n: usize,
        _filters: &MetadataFilters,
    ) -> std::result::Result<Vec<SearchResult>, SourceError> {
        Ok(self.results.iter().take(top_n).cloned().collect())
    }
}

fn dated(doc: &str, chunk: &str, score: f32, year: i32) -> SearchResult {
    SearchResult::new(doc, chunk, format!("{} chunk {}", doc, chunk), score)
        .with_metadata(DocumentMetadata::new().with_year(year))
}

/// Index of grant-writing passages shared by several tests
async fn seeded_index() -> Result<InMemoryIndex> {
    let index = InMemoryIndex::new();
    index
        .insert_many(vec![
            Passage::new(
                "annual-report-2025",
                "0",
                "Youth mentoring outcomes improved across all program sites",
            )
            .with_metadata(
                DocumentMetadata::new()
                    .with_document_type("report")
                    .with_year(2025)
                    .with_program("mentoring"),
            )
            .with_embedding(vec![0.6, 0.8]),
            Passage::new(
                "annual-report-2025",
                "1",
                "Emergency housing placements rose sharply this year",
            )
            .with_metadata(
                DocumentMetadata::new()
                    .with_document_type("report")
                    .with_year(2025)
                    .with_program("housing"),
            )
            .with_embedding(vec![1.0, 0.0]),
            Passage::new(
                "newsletter-2021",
                "0",
                "Volunteers joined the mentoring program for youth",
            )
            .with_metadata(
                DocumentMetadata::new()
                    .with_document_type("newsletter")
                    .with_year(2021)
                    .with_program("mentoring"),
            )
            .with_embedding(vec![0.7, 0.7]),
            Passage::new(
                "proposal-2023",
                "0",
                "We request funding to expand youth mentoring outcomes tracking",
            )
            .with_metadata(
                DocumentMetadata::new()
                    .with_document_type("proposal")
                    .with_year(2023)
                    .with_program("mentoring"),
            )
            .with_embedding(vec![0.5, 0.85]),
        ])
        .await?;
    Ok(index)
}

#[tokio::test]
async fn test_recent_document_overtakes_older_higher_scorer() -> Result<()> {
    // Anchors at 1.0 and 0.0 keep the normalized scores equal to the raw ones.
    let vector = FixedSource {
        results: vec![
            dated("anchor-high", "0", 1.0, 2025),
            dated("a", "0", 0.92, 2020),
            dated("b", "0", 0.85, 2025),
            dated("anchor-low", "0", 0.0, 2025),
        ],
    };

    let engine = RetrievalEngine::builder()
        .vector_source(vector)
        .keyword_source(FixedSource::default())
        .config(RetrievalConfig {
            vector_weight: 1.0,
            keyword_weight: 0.0,
            recency_weight: 0.7,
            ..Default::default()
        })
        .current_year(2025)
        .build()?;

    let request = RetrievalRequest::builder("program outcomes")
        .top_k(4)
        .embedding(vec![0.1])
        .build();
    let results = engine.retrieve(&request).await?;

    let order: Vec<&str> = results.iter().map(|r| r.doc_id.as_str()).collect();
    assert_eq!(order, vec!["anchor-high", "b", "a", "anchor-low"]);
    assert!((results[1].score - 0.85).abs() < 1e-5);
    assert!((results[2].score - 0.8234).abs() < 1e-4);

    let provenance = &results[2].provenance;
    assert_eq!(provenance.raw_vector_score, Some(0.92));
    assert_eq!(provenance.age_multiplier, Some(0.85));
    assert!(provenance.rerank_score.is_none());

    Ok(())
}

#[tokio::test]
async fn test_hybrid_search_over_in_memory_index() -> Result<()> {
    let index = seeded_index().await?;
    let engine = RetrievalEngine::builder()
        .vector_source(index.clone())
        .keyword_source(index)
        .current_year(2025)
        .build()?;

    let request = RetrievalRequest::builder("youth mentoring outcomes")
        .top_k(3)
        .embedding(vec![0.6, 0.8])
        .build();
    let outcome = engine.retrieve_detailed(&request).await?;

    assert_eq!(outcome.coverage, SourceCoverage::Both);
    assert!(!outcome.reranked);
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.results[0].doc_id, "annual-report-2025");
    assert_eq!(outcome.results[0].chunk_id, "0");

    // Found by both searches, so both raw scores are recorded
    let top = &outcome.results[0].provenance;
    assert!(top.raw_vector_score.is_some());
    assert!(top.raw_keyword_score.is_some());

    for pair in outcome.results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    Ok(())
}

#[tokio::test]
async fn test_filters_reapplied_to_source_results() -> Result<()> {
    // FixedSource ignores filters; the engine must still enforce them.
    let candidates = vec![
        dated("old-report", "0", 0.9, 2019),
        dated("new-report", "0", 0.8, 2024),
        dated("new-report", "1", 0.7, 2024),
    ];
    let engine = RetrievalEngine::builder()
        .vector_source(FixedSource {
            results: candidates.clone(),
        })
        .keyword_source(FixedSource {
            results: candidates,
        })
        .current_year(2025)
        .build()?;

    let request = RetrievalRequest::builder("outcomes")
        .top_k(5)
        .embedding(vec![0.1])
        .years(YearRange::since(2023))
        .build();
    let results = engine.retrieve(&request).await?;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.doc_id == "new-report"));

    Ok(())
}

#[tokio::test]
async fn test_document_type_and_program_filters() -> Result<()> {
    let index = seeded_index().await?;
    let engine = RetrievalEngine::builder()
        .vector_source(index.clone())
        .keyword_source(index)
        .current_year(2025)
        .build()?;

    let request = RetrievalRequest::builder("youth mentoring")
        .top_k(10)
        .embedding(vec![0.6, 0.8])
        .document_types(["report", "proposal"])
        .program("mentoring")
        .build();
    let results = engine.retrieve(&request).await?;

    let mut docs: Vec<&str> = results.iter().map(|r| r.doc_id.as_str()).collect();
    docs.sort();
    assert_eq!(docs, vec!["annual-report-2025", "proposal-2023"]);

    Ok(())
}

#[tokio::test]
async fn test_per_document_cap() -> Result<()> {
    let mut candidates: Vec<SearchResult> = [0.9, 0.8, 0.7, 0.6, 0.5]
        .iter()
        .enumerate()
        .map(|(i, &score)| dated("x", &i.to_string(), score, 2025))
        .collect();
    candidates.push(dated("y", "0", 0.75, 2025));
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let engine = RetrievalEngine::builder()
        .vector_source(FixedSource {
            results: candidates,
        })
        .keyword_source(FixedSource::default())
        .config(RetrievalConfig {
            max_results_per_document: 1,
            ..Default::default()
        })
        .current_year(2025)
        .build()?;

    let request = RetrievalRequest::builder("query")
        .top_k(10)
        .embedding(vec![0.1])
        .build();
    let results = engine.retrieve(&request).await?;

    let ids: Vec<(&str, &str)> = results
        .iter()
        .map(|r| (r.doc_id.as_str(), r.chunk_id.as_str()))
        .collect();
    assert_eq!(ids, vec![("x", "0"), ("y", "0")]);

    Ok(())
}

#[tokio::test]
async fn test_min_score_and_top_k() -> Result<()> {
    let candidates: Vec<SearchResult> = (0..6)
        .map(|i| dated(&format!("doc-{}", i), "0", 1.0 - i as f32 * 0.2, 2025))
        .collect();
    let engine = RetrievalEngine::builder()
        .vector_source(FixedSource {
            results: candidates,
        })
        .keyword_source(FixedSource::default())
        .config(RetrievalConfig {
            vector_weight: 1.0,
            keyword_weight: 0.0,
            ..Default::default()
        })
        .current_year(2025)
        .build()?;

    let floor = RetrievalRequest::builder("query")
        .top_k(10)
        .embedding(vec![0.1])
        .min_score(0.5)
        .build();
    let results = engine.retrieve(&floor).await?;
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.score >= 0.5));

    let capped = RetrievalRequest::builder("query")
        .top_k(2)
        .embedding(vec![0.1])
        .build();
    assert_eq!(engine.retrieve(&capped).await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_recency_override_per_request() -> Result<()> {
    let engine = RetrievalEngine::builder()
        .vector_source(FixedSource {
            results: vec![
                dated("old", "0", 1.0, 2015),
                dated("new", "0", 0.9, 2025),
                dated("floor", "0", 0.0, 2025),
            ],
        })
        .keyword_source(FixedSource::default())
        .config(RetrievalConfig {
            vector_weight: 1.0,
            keyword_weight: 0.0,
            recency_weight: 1.0,
            ..Default::default()
        })
        .current_year(2025)
        .build()?;

    let default = RetrievalRequest::builder("query")
        .top_k(1)
        .embedding(vec![0.1])
        .build();
    assert_eq!(engine.retrieve(&default).await?[0].doc_id, "new");

    let no_recency = RetrievalRequest::builder("query")
        .top_k(1)
        .embedding(vec![0.1])
        .recency_weight(0.0)
        .build();
    assert_eq!(engine.retrieve(&no_recency).await?[0].doc_id, "old");

    Ok(())
}

#[tokio::test]
async fn test_reranking_with_lexical_model() -> Result<()> {
    let index = InMemoryIndex::new();
    index
        .insert_many(vec![
            Passage::new("housing", "0", "Emergency housing placements rose sharply")
                .with_metadata(DocumentMetadata::new().with_year(2025))
                .with_embedding(vec![1.0, 0.0]),
            Passage::new("youth", "0", "Youth mentoring outcomes improved at every site")
                .with_metadata(DocumentMetadata::new().with_year(2025))
                .with_embedding(vec![0.2, 0.98]),
        ])
        .await?;

    let engine = RetrievalEngine::builder()
        .vector_source(index.clone())
        .keyword_source(index)
        .reranker(ModelReranker::new(LexicalOverlapModel))
        .config(RetrievalConfig {
            vector_weight: 1.0,
            keyword_weight: 0.0,
            enable_reranking: true,
            ..Default::default()
        })
        .current_year(2025)
        .build()?;

    // The embedding favors the housing passage; the reranker should not.
    let request = RetrievalRequest::builder("youth mentoring outcomes")
        .top_k(2)
        .embedding(vec![1.0, 0.0])
        .build();
    let outcome = engine.retrieve_detailed(&request).await?;

    assert!(outcome.reranked);
    assert!(outcome.stages.contains(&RetrievalStage::Reranked));
    assert_eq!(outcome.results[0].doc_id, "youth");
    assert_eq!(outcome.results[0].score, 1.0);
    assert_eq!(outcome.results[0].provenance.rerank_score, Some(1.0));
    assert!(outcome.results[0].provenance.pre_rerank_score.is_some());

    Ok(())
}

#[tokio::test]
async fn test_stages_recorded_in_order() -> Result<()> {
    let index = seeded_index().await?;
    let engine = RetrievalEngine::builder()
        .vector_source(index.clone())
        .keyword_source(index)
        .build()?;

    let request = RetrievalRequest::builder("housing placements")
        .top_k(2)
        .embedding(vec![1.0, 0.0])
        .build();
    let outcome = engine.retrieve_detailed(&request).await?;

    assert_eq!(
        outcome.stages,
        vec![
            RetrievalStage::QueryReceived,
            RetrievalStage::CandidatesGathered,
            RetrievalStage::ScoresCombined,
            RetrievalStage::RecencyAdjusted,
            RetrievalStage::Diversified,
            RetrievalStage::TopKSelected,
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_embedding_provider_fills_request() -> Result<()> {
    #[derive(Debug)]
    struct AxisEmbedder;

    #[async_trait]
    impl EmbeddingProvider for AxisEmbedder {
        async fn embed(&self, _text: &str) -> std::result::Result<Vec<f32>, SourceError> {
            Ok(vec![1.0, 0.0])
        }
    }

    let index = seeded_index().await?;
    let engine = RetrievalEngine::builder()
        .vector_source(index.clone())
        .keyword_source(index)
        .build()?;

    let request = RetrievalRequest::new("placements", 1)
        .embed_with(&AxisEmbedder)
        .await?;
    let outcome = engine.retrieve_detailed(&request).await?;

    assert_eq!(outcome.coverage, SourceCoverage::Both);
    assert_eq!(outcome.results[0].doc_id, "annual-report-2025");
    assert_eq!(outcome.results[0].chunk_id, "1");

    Ok(())
}
