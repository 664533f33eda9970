//! Service metrics
//!
//! Thin wrappers over the `metrics` facade. Nothing is exported unless the
//! binary installs a recorder.

use std::time::Duration;

/// Record a finished search request
pub fn record_search(outcome: &str, duration: Duration) {
    metrics::counter!(
        "nobel_search_requests_total",
        "outcome" => outcome.to_string(),
    )
    .increment(1);

    metrics::histogram!("nobel_search_duration_seconds").record(duration.as_secs_f64());
}

/// Record engine hits dropped because their source was not a valid prize
pub fn record_skipped_hits(count: u64) {
    if count > 0 {
        metrics::counter!("nobel_search_skipped_hits_total").increment(count);
    }
}

/// Record prize writes by route and outcome
pub fn record_prize_writes(operation: &str, outcome: &str, count: u64) {
    metrics::counter!(
        "nobel_prize_writes_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(count);
}
