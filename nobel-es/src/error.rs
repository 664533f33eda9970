//! Error types for the engine client

use serde::Deserialize;

/// Errors raised while talking to Elasticsearch
#[derive(Debug, thiserror::Error)]
pub enum EsError {
    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Engine returned {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Gave up connecting to {url} after {attempts} attempts: {last}")]
    Unreachable {
        url: String,
        attempts: u32,
        last: String,
    },
}

impl EsError {
    /// Whether the failure means the engine could not be reached at all
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Unreachable { .. })
    }

    /// Build an error from a non-success HTTP response body.
    ///
    /// Elasticsearch reports a missing index as `index_not_found_exception`
    /// regardless of the endpoint, so that case gets its own variant.
    pub(crate) fn from_status(status: u16, body: &str, index: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) if envelope.error.error_type == "index_not_found_exception" => {
                Self::IndexNotFound(index.to_string())
            }
            Ok(envelope) => Self::Status {
                status,
                reason: envelope
                    .error
                    .reason
                    .unwrap_or(envelope.error.error_type),
            },
            Err(_) => Self::Status {
                status,
                reason: body.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorCause,
}

#[derive(Debug, Deserialize)]
struct ErrorCause {
    #[serde(rename = "type")]
    error_type: String,
    #[serde(default)]
    reason: Option<String>,
}
