//! Elasticsearch Query DSL subset

mod types;

pub use types::*;
