//! Mapping engine hits back into the domain model

use crate::metrics;
use crate::model::{Prize, ScoredPrize, SearchResult};
use nobel_es::SearchResponse;

/// Turn an engine response into a page of results.
///
/// Hits whose source does not deserialize into a [`Prize`] are dropped and
/// logged. `total` stays the engine's count, so it can exceed the number of
/// results returned.
pub fn normalize_hits(response: SearchResponse, page: u32, size: u32) -> SearchResult {
    let total = response.hits.total.value();
    let mut skipped = 0u64;

    let results = response
        .hits
        .hits
        .into_iter()
        .filter_map(|hit| match serde_json::from_value::<Prize>(hit.source) {
            Ok(prize) => Some(ScoredPrize {
                prize,
                score: hit.score.unwrap_or(0.0),
            }),
            Err(e) => {
                tracing::warn!(id = %hit.id, error = %e, "Skipping malformed prize document");
                skipped += 1;
                None
            }
        })
        .collect();

    metrics::record_skipped_hits(skipped);

    SearchResult {
        total,
        page,
        size,
        results,
    }
}
