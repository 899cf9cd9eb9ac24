//! Configuration loading feeding a working engine

use std::fs;
use std::time::Duration;

use sift::config::{ConfigBuilder, ConfigError, ConfigLoader};
use sift::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_engine_from_toml_file() -> Result<()> {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("sift.toml");
    fs::write(
        &path,
        r#"
[retrieval]
vector_weight = 0.2
keyword_weight = 0.8
recency_weight = 0.0
max_results_per_document = 1

[sources]
fetch_timeout_ms = 2000
keyword_fetch_multiplier = 3

[logging]
level = "warn"
"#,
    )
    .expect("Failed to write config");

    let config = ConfigLoader::new().load_file(&path)?.extract()?;
    assert_eq!(config.retrieval.keyword_weight, 0.8);
    assert_eq!(config.sources.fetch_timeout(), Some(Duration::from_secs(2)));
    assert_eq!(config.sources.keyword_fetch_multiplier, 3);
    assert_eq!(config.sources.vector_fetch_multiplier, 4);
    assert_eq!(config.logging.level, LogLevel::Warn);

    let index = InMemoryIndex::new();
    index
        .insert_many(vec![
            Passage::new("grant", "0", "Literacy tutoring grant narrative").with_embedding(vec![1.0, 0.0]),
            Passage::new("grant", "1", "Literacy outcomes for tutoring cohorts").with_embedding(vec![0.9, 0.1]),
            Passage::new("budget", "0", "Budget justification for literacy staff").with_embedding(vec![0.0, 1.0]),
        ])
        .await?;

    let engine = RetrievalEngineBuilder::from_config(&config)
        .vector_source(index.clone())
        .keyword_source(index)
        .build()?;
    assert_eq!(engine.config(), &config.retrieval);

    let request = RetrievalRequest::builder("literacy tutoring")
        .top_k(5)
        .embedding(vec![1.0, 0.0])
        .build();
    let results = engine.retrieve(&request).await?;

    // One passage per document
    assert_eq!(results.len(), 2);
    assert_ne!(results[0].doc_id, results[1].doc_id);

    Ok(())
}

#[test]
fn test_invalid_file_is_rejected_on_extract() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("sift.json");
    fs::write(&path, r#"{ "retrieval": { "recency_weight": 3.0 } }"#).expect("Failed to write config");

    let mut loader = ConfigLoader::new();
    loader.load_file(&path).expect("File should load");

    assert!(matches!(loader.extract(), Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_built_config_drives_engine_builder() {
    let config = ConfigBuilder::new()
        .with_weights(0.5, 0.5)
        .with_recency_weight(0.3)
        .with_fetch_multipliers(2, 2)
        .build()
        .expect("Valid configuration");

    let engine = RetrievalEngineBuilder::from_config(&config)
        .vector_source(InMemoryIndex::new())
        .keyword_source(InMemoryIndex::new())
        .build()
        .expect("Engine should build");

    assert_eq!(engine.config().recency_weight, 0.3);
    assert_eq!(engine.config().vector_weight, 0.5);
}

#[cfg(not(feature = "cross-encoder"))]
#[test]
fn test_reranking_without_model_still_builds() {
    // Without the cross-encoder feature the model is never ready; the engine
    // builds and simply skips reranking.
    let config = ConfigBuilder::new()
        .with_reranking(true)
        .with_model_cache_dir(std::env::temp_dir().join("sift-test-models"))
        .build()
        .expect("Valid configuration");

    let engine = RetrievalEngineBuilder::from_config(&config)
        .vector_source(InMemoryIndex::new())
        .keyword_source(InMemoryIndex::new())
        .build();

    assert!(engine.is_ok());
}
