//! Per-document diversity cap

use std::collections::HashMap;

use crate::models::SearchResult;

/// Keep at most `max_per_doc` passages from any one document.
///
/// Single greedy pass over an already ranked list: a passage is kept while
/// its document's running count is below the cap. Relative order of the kept
/// passages is unchanged.
pub fn diversify(results: Vec<SearchResult>, max_per_doc: usize) -> Vec<SearchResult> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(results.len());

    for result in results {
        let count = counts.entry(result.doc_id.clone()).or_insert(0);
        if *count < max_per_doc {
            *count += 1;
            kept.push(result);
        }
    }

    kept
}
