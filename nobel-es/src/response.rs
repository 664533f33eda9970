//! Elasticsearch response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ES search response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    pub hits: HitsResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitsResponse {
    pub total: TotalHits,
    #[serde(default)]
    pub max_score: Option<f32>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Total hit count.
///
/// ES 7+ reports `{"value": n, "relation": "eq"}`; older clusters report a
/// bare number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Object { value: u64, relation: String },
    Count(u64),
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            Self::Object { value, .. } => *value,
            Self::Count(n) => *n,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f32>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// Response to a single-document index request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
    /// `created` or `updated`
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsErrorCause {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub reason: String,
}

/// ES bulk response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    pub errors: bool,
    pub items: Vec<BulkItemResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<BulkItemResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<BulkItemResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<BulkItemResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<BulkItemResult>,
}

impl BulkItemResponse {
    /// The result of whichever action this item reports on
    pub fn result(&self) -> Option<&BulkItemResult> {
        self.index
            .as_ref()
            .or(self.create.as_ref())
            .or(self.update.as_ref())
            .or(self.delete.as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemResult {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EsErrorCause>,
}

impl BulkItemResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// ES root info response (`GET /`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cluster_name: String,
    pub version: EsVersion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsVersion {
    pub number: String,
}
