//! Recency weighting
//!
//! Older documents are discounted through a small step table keyed by age in
//! whole years. The discount is blended in with a weight, so `0.0` leaves the
//! scores alone and `1.0` applies the full table multiplier.

use super::sort_by_score_desc;
use crate::models::SearchResult;

/// Age-to-multiplier step table.
///
/// `tiers[n]` is the multiplier for a document `n` years old. Anything older
/// than the last tier, or with an unknown publication year, gets `stale`.
/// Future-dated documents are treated as current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecencyTable {
    /// Multipliers for ages `0..tiers.len()`
    pub tiers: &'static [f32],

    /// Multiplier for older or undated documents
    pub stale: f32,
}

impl RecencyTable {
    /// Current year 1.00, one year 0.95, two years 0.90, older or unknown 0.85
    pub const DEFAULT: RecencyTable = RecencyTable::new(&[1.0, 0.95, 0.90], 0.85);

    /// Create a table from static tier data
    pub const fn new(tiers: &'static [f32], stale: f32) -> Self {
        Self { tiers, stale }
    }

    /// Multiplier for a document `age` years old (`None` when the year is unknown)
    pub fn multiplier(&self, age: Option<i32>) -> f32 {
        match age {
            None => self.stale,
            Some(age) if age < 0 => 1.0,
            Some(age) => self.tiers.get(age as usize).copied().unwrap_or(self.stale),
        }
    }
}

impl Default for RecencyTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Multiplier from the default table for a publication year
pub fn age_multiplier(publication_year: Option<i32>, current_year: i32) -> f32 {
    RecencyTable::DEFAULT.multiplier(age_in_years(publication_year, current_year))
}

/// Whole years since publication; `None` when unknown or not representable
fn age_in_years(publication_year: Option<i32>, current_year: i32) -> Option<i32> {
    publication_year.and_then(|year| current_year.checked_sub(year))
}

/// Adjust scores by document age using [`RecencyTable::DEFAULT`].
///
/// See [`apply_recency_with`].
pub fn apply_recency(
    results: Vec<SearchResult>,
    weight: f32,
    current_year: i32,
) -> Vec<SearchResult> {
    apply_recency_with(&RecencyTable::DEFAULT, results, weight, current_year)
}

/// Adjust scores by document age.
///
/// `adjusted = score * (1 + weight * (multiplier - 1))`, then the list is
/// re-sorted descending with ties kept in input order. A weight of exactly
/// `0.0` returns `results` as given, provenance included.
pub fn apply_recency_with(
    table: &RecencyTable,
    mut results: Vec<SearchResult>,
    weight: f32,
    current_year: i32,
) -> Vec<SearchResult> {
    if weight == 0.0 {
        return results;
    }

    for result in &mut results {
        let age = age_in_years(result.metadata.publication_year, current_year);
        let multiplier = table.multiplier(age);
        let before = result.score;

        result.provenance.age_multiplier = Some(multiplier);
        result.provenance.pre_recency_score = Some(before);
        result.score = before * (1.0 + weight * (multiplier - 1.0));
    }

    sort_by_score_desc(&mut results);
    results
}
