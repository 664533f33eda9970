use super::error::ApiError;
use super::server::AppState;
use crate::error::Error;
use crate::metrics;
use crate::model::{prize_id, validate_batch, Prize, RawSearchParams, SearchParams, SearchResult};
use crate::normalize::normalize_hits;
use crate::query::QueryCompiler;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub indexed: usize,
    pub failed: usize,
    pub errors: Vec<BulkErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct BulkErrorBody {
    pub id: String,
    pub reason: String,
}

pub async fn root() -> Json<Value> {
    Json(json!({"message": "Welcome to Nobel Prize Search API!"}))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let engine = state
        .gateway
        .ping()
        .await
        .map_err(|e| ApiError::read("Service unhealthy", e.into()))?;
    Ok(Json(json!({"status": "ok", "engine": engine})))
}

/// POST /prize - store a prize under its `{year}_{category}` id
pub async fn create_prize(
    State(state): State<AppState>,
    payload: Result<Json<Prize>, JsonRejection>,
) -> Result<(StatusCode, Json<WriteResponse>), ApiError> {
    const FAILED: &str = "Failed to add prize";

    let Json(prize) = payload.map_err(|e| ApiError::bad_request(FAILED, e.body_text()))?;
    prize
        .validate()
        .map_err(|e| ApiError::write(FAILED, e.into()))?;

    let ack = state
        .gateway
        .upsert(&prize.id(), &prize)
        .await
        .map_err(|e| {
            metrics::record_prize_writes("create", "error", 1);
            ApiError::write(FAILED, e.into())
        })?;

    metrics::record_prize_writes("create", "ok", 1);
    tracing::info!(id = %ack.id, created = ack.created, "Prize added");
    Ok((
        StatusCode::CREATED,
        Json(WriteResponse {
            message: "Prize added successfully".to_string(),
            id: ack.id,
        }),
    ))
}

/// PUT /prize/:year/:category - replace an existing prize
///
/// The body is stored as sent; the path only names the document to replace.
pub async fn update_prize(
    State(state): State<AppState>,
    Path((year, category)): Path<(String, String)>,
    payload: Result<Json<Prize>, JsonRejection>,
) -> Result<Json<WriteResponse>, ApiError> {
    const FAILED: &str = "Failed to update prize";

    let Json(prize) = payload.map_err(|e| ApiError::bad_request(FAILED, e.body_text()))?;
    prize
        .validate()
        .map_err(|e| ApiError::write(FAILED, e.into()))?;

    let id = prize_id(&year, &category);
    let exists = state
        .gateway
        .exists(&id)
        .await
        .map_err(|e| ApiError::write(FAILED, e.into()))?;
    if !exists {
        return Err(ApiError::write(
            "Prize not found",
            Error::NotFound(format!("No prize with id {id}")),
        ));
    }

    let ack = state.gateway.upsert(&id, &prize).await.map_err(|e| {
        metrics::record_prize_writes("update", "error", 1);
        ApiError::write(FAILED, e.into())
    })?;

    metrics::record_prize_writes("update", "ok", 1);
    tracing::info!(id = %ack.id, "Prize updated");
    Ok(Json(WriteResponse {
        message: "Prize updated successfully".to_string(),
        id: ack.id,
    }))
}

/// POST /prize/bulk - store many prizes; the batch is all-or-nothing on validation
pub async fn bulk_prizes(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Prize>>, JsonRejection>,
) -> Result<(StatusCode, Json<BulkResponse>), ApiError> {
    const FAILED: &str = "Failed to index prizes";

    let Json(prizes) = payload.map_err(|e| ApiError::bad_request(FAILED, e.body_text()))?;
    validate_batch(&prizes).map_err(|e| ApiError::write(FAILED, e.into()))?;

    let outcome = state
        .gateway
        .bulk_upsert(&prizes)
        .await
        .map_err(|e| {
            metrics::record_prize_writes("bulk", "error", prizes.len() as u64);
            ApiError::write(FAILED, e.into())
        })?;

    let indexed = outcome.indexed();
    let failed = outcome.failed();
    metrics::record_prize_writes("bulk", "ok", indexed as u64);
    metrics::record_prize_writes("bulk", "error", failed as u64);
    tracing::info!(indexed, failed, "Bulk prize write");

    let status = if failed == 0 {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    let errors = outcome
        .failures()
        .map(|item| BulkErrorBody {
            id: item.id.clone(),
            reason: item.error.clone().unwrap_or_default(),
        })
        .collect();

    Ok((
        status,
        Json(BulkResponse {
            indexed,
            failed,
            errors,
        }),
    ))
}

/// GET /search - fuzzy full-text search over prizes
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<SearchResult>, ApiError> {
    const INVALID: &str = "Invalid search parameters";

    let Query(pairs) = query.map_err(|e| ApiError::bad_request(INVALID, e.body_text()))?;
    let raw = RawSearchParams::from_pairs(pairs);
    let params = SearchParams::from_raw(&raw).map_err(|e| ApiError::read(INVALID, e.into()))?;

    let request = QueryCompiler::compile(&params);
    let start = Instant::now();
    let response = match state.gateway.search(&request).await {
        Ok(response) => response,
        Err(e) => {
            metrics::record_search("error", start.elapsed());
            return Err(ApiError::read("Internal server error", e.into()));
        }
    };
    metrics::record_search("ok", start.elapsed());

    let result = normalize_hits(response, params.page(), params.size());
    tracing::debug!(
        q = params.q(),
        total = result.total,
        returned = result.results.len(),
        "Search served"
    );
    Ok(Json(result))
}
