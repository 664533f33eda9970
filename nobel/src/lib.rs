//! Nobel prize search service
//!
//! An HTTP façade over an Elasticsearch index of Nobel prizes. Requests are
//! validated into [`model`] types, compiled into engine queries by
//! [`query::QueryCompiler`], executed through a [`gateway::SearchGateway`]
//! and mapped back into the domain model by [`normalize`].

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod query;

pub use config::Config;
pub use error::{Error, Result};
