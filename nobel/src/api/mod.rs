//! HTTP API

mod error;
mod routes;
mod server;

pub use error::{ApiError, ErrorResponse, FieldErrorBody};
pub use routes::{BulkErrorBody, BulkResponse, WriteResponse};
pub use server::{ApiServer, AppState};
