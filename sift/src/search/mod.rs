//! Scoring stages of the retrieval pipeline
//!
//! These are the pure, in-memory transformations the orchestrator runs after
//! both candidate sets are in hand:
//!
//! 1. [`normalize`] rescales each source's scores into `[0, 1]`
//! 2. [`combine`] merges vector and keyword candidates into one weighted set
//! 3. [`apply_recency`] adjusts scores by document age
//! 4. [`diversify`] caps how many passages one document may contribute
//!
//! # Example
//!
//! ```
//! use sift::models::SearchResult;
//! use sift::search::{apply_recency, combine, diversify};
//!
//! let vector = vec![SearchResult::new("doc-a", "1", "passage", 0.91)];
//! let keyword = vec![SearchResult::new("doc-a", "1", "passage", 12.4)];
//!
//! let combined = combine(&vector, &keyword, 0.7, 0.3);
//! let adjusted = apply_recency(combined, 0.7, 2025);
//! let final_results = diversify(adjusted, 3);
//! assert_eq!(final_results.len(), 1);
//! ```

pub mod diversify;
pub mod hybrid;
pub mod normalize;
pub mod recency;

pub use diversify::diversify;
pub use hybrid::combine;
pub use normalize::{min_max, normalize};
pub use recency::{RecencyTable, age_multiplier, apply_recency, apply_recency_with};

use crate::models::SearchResult;

/// Stable descending sort by current score
pub(crate) fn sort_by_score_desc(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}
