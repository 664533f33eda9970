//! Structured validation errors
//!
//! Every check on a request runs before anything is sent to the engine and
//! all failures are collected, so a client sees every offending field at once.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// Required value absent or blank
    Missing,
    /// Value present but malformed (e.g. a year that is not four digits)
    InvalidFormat,
    /// Field name outside the searchable set
    InvalidField,
    /// Number outside its allowed range
    InvalidRange,
    /// Token not among the recognized choices
    InvalidEnum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: ValidationKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &str, kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.to_string(),
                kind,
                message: message.into(),
            }],
        }
    }

    /// Names of the offending fields, in the order they were checked
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn has(&self, field: &str, kind: ValidationKind) -> bool {
        self.errors.iter().any(|e| e.field == field && e.kind == kind)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates field errors across a whole request
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub(crate) fn push(&mut self, field: impl Into<String>, kind: ValidationKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}
