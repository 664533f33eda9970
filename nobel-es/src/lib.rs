//! Typed Elasticsearch contract for the Nobel prize search service
//!
//! This crate owns everything that crosses the wire to the search engine and
//! nothing that knows about prizes:
//!
//! - [`query`] - the Query DSL subset the service emits (`bool`/`should`,
//!   `multi_match`, `nested`) plus sort clauses
//! - [`response`] - search, index, bulk and root-info response bodies
//! - [`mapping`] - index mapping definitions used when bootstrapping an index
//! - [`bulk`] - NDJSON `_bulk` request body builder
//! - [`client`] - `reqwest`-based HTTP client with bounded connect retry

pub mod bulk;
pub mod client;
pub mod error;
pub mod mapping;
pub mod query;
pub mod response;

pub use client::{ClientOptions, EsClient};
pub use error::EsError;
pub use query::{
    BoolQuery, Fuzziness, MatchType, MultiMatchQuery, NestedQuery, Operator, Query, ScoreMode,
    SearchRequest, SortClause, SortOrder,
};
pub use response::{Hit, SearchResponse};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EsError>;
