//! Retrieval orchestration.
//!
//! [`RetrievalEngine`] runs one query end to end:
//!
//! 1. validate the request
//! 2. fetch vector and keyword candidates concurrently
//! 3. normalize and combine the two candidate sets
//! 4. adjust scores by document age
//! 5. cap passages per document
//! 6. rerank the head of the list when a relevance model is available
//! 7. apply the score floor and cut to `top_k`
//!
//! A failing source degrades the call to the other source; only when both
//! fail does the call return [`RetrievalError::SourceUnavailable`].

mod engine;
mod error;
mod outcome;

pub use engine::{RetrievalEngine, RetrievalEngineBuilder};
pub use error::RetrievalError;
pub use outcome::{RetrievalOutcome, RetrievalStage, SourceCoverage};
