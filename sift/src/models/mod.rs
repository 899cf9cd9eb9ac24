//! Data types shared across the retrieval pipeline.

pub mod request;
pub mod result;

pub use request::{MetadataFilters, RetrievalRequest, RetrievalRequestBuilder, YearRange};
pub use result::{DocumentMetadata, ScoreProvenance, SearchResult};
