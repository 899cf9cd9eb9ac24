//! Performance benchmarks for the scoring stages and the full engine
//!
//! Run with: cargo bench --bench pipeline_benchmarks

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sift::models::{DocumentMetadata, RetrievalRequest, SearchResult};
use sift::retrieval::RetrievalEngine;
use sift::search::{apply_recency, combine, diversify, min_max};
use sift::sources::{InMemoryIndex, Passage};

/// Create candidates spread over `docs` documents with descending scores
fn create_candidates(count: usize, docs: usize, scale: f32) -> Vec<SearchResult> {
    (0..count)
        .map(|i| {
            SearchResult::new(
                format!("doc-{}", i % docs),
                format!("{}", i),
                "Benchmark passage text for scoring",
                scale * (count - i) as f32 / count as f32,
            )
            .with_metadata(DocumentMetadata::new().with_year(2018 + (i % 8) as i32))
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for size in [10, 100, 1000] {
        let scores: Vec<f32> = (0..size).map(|i| i as f32 * 0.37).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &scores, |b, scores| {
            b.iter(|| min_max(black_box(scores)));
        });
    }

    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");

    for size in [20, 200, 2000] {
        let vector = create_candidates(size, size / 4, 1.0);
        // Half the keyword candidates overlap the vector set
        let keyword = create_candidates(size / 2, size / 4, 18.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| combine(black_box(&vector), black_box(&keyword), 0.7, 0.3));
        });
    }

    group.finish();
}

fn bench_recency_and_diversify(c: &mut Criterion) {
    let mut group = c.benchmark_group("post_combine");
    let candidates = create_candidates(1000, 50, 1.0);

    group.bench_function("apply_recency_1000", |b| {
        b.iter(|| apply_recency(black_box(candidates.clone()), 0.7, 2025));
    });

    group.bench_function("diversify_1000_cap_3", |b| {
        b.iter(|| diversify(black_box(candidates.clone()), 3));
    });

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let rt = tokio::runtime::Runtime::new().unwrap();

    let index = InMemoryIndex::new();
    rt.block_on(async {
        let passages = (0..500).map(|i| {
            let angle = i as f32 * 0.01;
            Passage::new(
                format!("doc-{}", i / 5),
                format!("{}", i % 5),
                format!("Program report section {} covering tutoring and mentoring outcomes", i),
            )
            .with_metadata(DocumentMetadata::new().with_year(2018 + (i % 8) as i32))
            .with_embedding(vec![angle.cos(), angle.sin()])
        });
        index.insert_many(passages).await.unwrap();
    });

    let engine = RetrievalEngine::builder()
        .vector_source(index.clone())
        .keyword_source(index)
        .current_year(2025)
        .build()
        .unwrap();
    let request = RetrievalRequest::builder("mentoring outcomes")
        .top_k(10)
        .embedding(vec![0.8, 0.6])
        .build();

    group.bench_function("retrieve_500_passages", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(engine.retrieve(&request).await.unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_combine,
    bench_recency_and_diversify,
    bench_engine,
);
criterion_main!(benches);
