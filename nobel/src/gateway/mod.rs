//! Search engine gateway
//!
//! Handlers only see the [`SearchGateway`] trait. The production
//! implementation is [`EsGateway`]; tests substitute an in-memory one.

mod elasticsearch;

pub use elasticsearch::EsGateway;

use crate::model::Prize;
use async_trait::async_trait;
use nobel_es::{EsError, SearchRequest, SearchResponse};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Search engine unreachable: {0}")]
    Connection(String),

    #[error("Index not found: {0}")]
    IndexMissing(String),

    #[error("Search engine returned {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Could not decode engine response: {0}")]
    Decode(String),
}

impl From<EsError> for GatewayError {
    fn from(err: EsError) -> Self {
        match err {
            EsError::IndexNotFound(index) => Self::IndexMissing(index),
            EsError::Status { status, reason } => Self::Status { status, reason },
            EsError::Json(e) => Self::Decode(e.to_string()),
            EsError::Connection(e) if e.is_decode() => Self::Decode(e.to_string()),
            other => Self::Connection(other.to_string()),
        }
    }
}

/// Engine name and version, reported by the health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineInfo {
    pub cluster_name: String,
    pub version: String,
}

/// Acknowledgement of a single-document write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAck {
    pub id: String,
    /// `false` when an existing document was replaced
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkItemOutcome {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkItemOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-document results of a bulk write, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub items: Vec<BulkItemOutcome>,
}

impl BulkOutcome {
    pub fn indexed(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.indexed()
    }

    pub fn failures(&self) -> impl Iterator<Item = &BulkItemOutcome> {
        self.items.iter().filter(|i| !i.is_success())
    }
}

#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Check that the engine answers
    async fn ping(&self) -> Result<EngineInfo, GatewayError>;

    /// Run a compiled search against the prize index
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, GatewayError>;

    /// Store `prize` under `id`, replacing any existing document
    async fn upsert(&self, id: &str, prize: &Prize) -> Result<IndexAck, GatewayError>;

    async fn exists(&self, id: &str) -> Result<bool, GatewayError>;

    /// Store every prize under its composite id in one round trip
    async fn bulk_upsert(&self, prizes: &[Prize]) -> Result<BulkOutcome, GatewayError>;
}
