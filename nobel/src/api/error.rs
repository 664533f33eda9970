//! Error responses for the HTTP API

use crate::error::Error;
use crate::model::{FieldError, ValidationError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Per-field problems when the request failed validation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldErrorBody {
    pub field: String,
    pub kind: String,
    pub message: String,
}

impl From<&FieldError> for FieldErrorBody {
    fn from(e: &FieldError) -> Self {
        Self {
            field: e.field.clone(),
            kind: serde_json::to_value(e.kind)
                .ok()
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_default(),
            message: e.message.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                detail: None,
                errors: Vec::new(),
            },
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.body.detail = Some(detail.into());
        self
    }

    pub fn bad_request(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error).with_detail(detail)
    }

    /// Error on a read route: status follows [`Error::status_code`]
    pub fn read(error: impl Into<String>, err: Error) -> Self {
        Self::from_error(err.status_code(), error, err)
    }

    /// Error on a write route: anything but a missing record is the client's 400
    pub fn write(error: impl Into<String>, err: Error) -> Self {
        let status = match &err {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::from_error(status, error, err)
    }

    fn from_error(status: StatusCode, error: impl Into<String>, err: Error) -> Self {
        let mut api = Self::new(status, error);
        match err {
            Error::Validation(v) => api.set_validation(&v),
            Error::NotFound(detail) => api.body.detail = Some(detail),
            other => api.body.detail = Some(other.to_string()),
        }
        api
    }

    fn set_validation(&mut self, err: &ValidationError) {
        self.body.detail = Some(err.to_string());
        self.body.errors = err.errors.iter().map(FieldErrorBody::from).collect();
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.body.error, detail = ?self.body.detail, "Request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.body.error, detail = ?self.body.detail, "Request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}
