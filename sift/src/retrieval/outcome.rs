//! What a retrieval call produced and how it got there.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::SearchResult;

/// Pipeline stages in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStage {
    QueryReceived,
    CandidatesGathered,
    ScoresCombined,
    RecencyAdjusted,
    Diversified,
    Reranked,
    TopKSelected,
}

impl fmt::Display for RetrievalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QueryReceived => "query_received",
            Self::CandidatesGathered => "candidates_gathered",
            Self::ScoresCombined => "scores_combined",
            Self::RecencyAdjusted => "recency_adjusted",
            Self::Diversified => "diversified",
            Self::Reranked => "reranked",
            Self::TopKSelected => "top_k_selected",
        };
        f.write_str(name)
    }
}

/// Which candidate sources contributed to a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCoverage {
    Both,
    VectorOnly,
    KeywordOnly,
}

impl SourceCoverage {
    /// Check if one source failed and results come from the other alone
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Both)
    }
}

/// Results of one retrieval call plus how they were produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    /// Final ranked passages, at most `top_k`
    pub results: Vec<SearchResult>,

    /// Sources that contributed candidates
    pub coverage: SourceCoverage,

    /// Whether the relevance model rescored the results
    pub reranked: bool,

    /// Stages visited, in order
    pub stages: Vec<RetrievalStage>,
}

impl RetrievalOutcome {
    /// Check whether no passage was relevant
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
