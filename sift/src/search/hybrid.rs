//! Hybrid combination of vector and keyword candidates
//!
//! Both candidate sets are normalized independently, merged on passage
//! identity so that a passage found by both searches appears once, and scored
//! with a weighted sum of the two normalized components.

use std::collections::HashMap;

use super::normalize::normalize;
use super::sort_by_score_desc;
use crate::models::SearchResult;

/// Working entry while the two candidate sets are merged
struct MergeEntry {
    result: SearchResult,
    vector_score: f32,
    keyword_score: f32,
    seen_by_keyword: bool,
}

/// Merge vector and keyword candidates into one list sorted by hybrid score.
///
/// `hybrid = vector_weight * vector_score + keyword_weight * keyword_score`,
/// where each component is the min-max normalized score from its own source
/// (0.0 when that source did not return the passage). Weights are used as
/// given; negative or unbalanced weights produce well-defined scores.
///
/// Passages are matched on `(doc_id, chunk_id)`. Ties keep merge order:
/// vector candidates first in their source order, then keyword-only
/// candidates in theirs.
pub fn combine(
    vector_results: &[SearchResult],
    keyword_results: &[SearchResult],
    vector_weight: f32,
    keyword_weight: f32,
) -> Vec<SearchResult> {
    if vector_results.is_empty() && keyword_results.is_empty() {
        return Vec::new();
    }

    let normalized_vector = normalize(vector_results, |r| {
        r.provenance.raw_vector_score.unwrap_or(r.score)
    });
    let normalized_keyword = normalize(keyword_results, |r| {
        r.provenance.raw_keyword_score.unwrap_or(r.score)
    });

    let mut entries: Vec<MergeEntry> =
        Vec::with_capacity(normalized_vector.len() + normalized_keyword.len());
    let mut index: HashMap<(String, String), usize> = HashMap::with_capacity(entries.capacity());

    for (raw, normalized) in vector_results.iter().zip(normalized_vector) {
        let (doc_id, chunk_id) = normalized.identity();
        let key = (doc_id.to_owned(), chunk_id.to_owned());
        if index.contains_key(&key) {
            // Sources return descending order, so the first copy is the best one.
            continue;
        }
        let vector_score = normalized.score;
        let mut result = normalized;
        result.provenance.raw_vector_score =
            Some(raw.provenance.raw_vector_score.unwrap_or(raw.score));
        index.insert(key, entries.len());
        entries.push(MergeEntry {
            result,
            vector_score,
            keyword_score: 0.0,
            seen_by_keyword: false,
        });
    }

    for (raw, normalized) in keyword_results.iter().zip(normalized_keyword) {
        let raw_keyword = raw.provenance.raw_keyword_score.unwrap_or(raw.score);
        let (doc_id, chunk_id) = normalized.identity();
        let key = (doc_id.to_owned(), chunk_id.to_owned());
        match index.get(&key).copied() {
            Some(position) => {
                let entry = &mut entries[position];
                if entry.seen_by_keyword {
                    continue;
                }
                entry.keyword_score = normalized.score;
                entry.seen_by_keyword = true;
                entry.result.provenance.raw_keyword_score = Some(raw_keyword);
            }
            None => {
                let keyword_score = normalized.score;
                let mut result = normalized;
                result.provenance.raw_keyword_score = Some(raw_keyword);
                index.insert(key, entries.len());
                entries.push(MergeEntry {
                    result,
                    vector_score: 0.0,
                    keyword_score,
                    seen_by_keyword: true,
                });
            }
        }
    }

    let mut combined: Vec<SearchResult> = entries
        .into_iter()
        .map(|entry| {
            let hybrid =
                vector_weight * entry.vector_score + entry.keyword_score * keyword_weight;
            let mut result = entry.result;
            result.provenance.normalized_vector_score = Some(entry.vector_score);
            result.provenance.normalized_keyword_score = Some(entry.keyword_score);
            result.provenance.hybrid_score = Some(hybrid);
            result.score = hybrid;
            result
        })
        .collect();

    sort_by_score_desc(&mut combined);
    combined
}
