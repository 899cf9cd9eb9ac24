//! Min-max score normalization
//!
//! Vector similarities and BM25 scores live on unrelated scales, so each
//! candidate set is rescaled into `[0, 1]` against its own minimum and
//! maximum before the sets are combined.

use crate::models::SearchResult;

/// Rescale a slice of scores into `[0, 1]`.
///
/// When every score is identical the whole set maps to `1.0`, so a uniform
/// result set keeps its full weight instead of collapsing to zero.
/// Non-finite scores map to `0.0` and are ignored when finding the bounds.
///
/// Bounds and the division are computed in `f64`; the span between two
/// finite `f32` values can overflow `f32`.
pub fn min_max(scores: &[f32]) -> Vec<f32> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &score in scores.iter().filter(|s| s.is_finite()) {
        min = min.min(f64::from(score));
        max = max.max(f64::from(score));
    }

    let range = max - min;
    scores
        .iter()
        .map(|&score| {
            if !score.is_finite() {
                0.0
            } else if range == 0.0 {
                1.0
            } else {
                ((f64::from(score) - min) / range).clamp(0.0, 1.0) as f32
            }
        })
        .collect()
}

/// Return copies of `results` whose `score` holds the min-max normalized
/// value of whatever `score_accessor` reads from each result.
///
/// The input is left untouched.
pub fn normalize<F>(results: &[SearchResult], score_accessor: F) -> Vec<SearchResult>
where
    F: Fn(&SearchResult) -> f32,
{
    if results.is_empty() {
        return Vec::new();
    }

    let raw: Vec<f32> = results.iter().map(&score_accessor).collect();
    results
        .iter()
        .zip(min_max(&raw))
        .map(|(result, normalized)| {
            let mut copy = result.clone();
            copy.score = normalized;
            copy
        })
        .collect()
}
