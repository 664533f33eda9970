//! One-shot index bootstrap
//!
//! Run before the server starts accepting requests: optionally drop and
//! recreate the prize index, then optionally pull the public prize feed and
//! bulk-load it. Steps run in order and are not safe to run concurrently.

use crate::config::BootstrapConfig;
use crate::error::Result;
use crate::gateway::{EsGateway, SearchGateway};
use crate::model::Prize;
use nobel_es::mapping::{FieldMapping, IndexDefinition};
use nobel_es::EsClient;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const FEED_TIMEOUT: Duration = Duration::from_secs(60);
const TEXT_ANALYZER: &str = "standard";

/// Mapping for the prize index: laureates are nested so a query can match
/// several fields of the same laureate.
pub fn prize_index_definition() -> IndexDefinition {
    IndexDefinition::new([
        ("year", FieldMapping::keyword()),
        (
            "category",
            FieldMapping::text(TEXT_ANALYZER).with_keyword("keyword"),
        ),
        (
            "laureates",
            FieldMapping::nested([
                ("id", FieldMapping::keyword()),
                ("firstname", FieldMapping::text(TEXT_ANALYZER)),
                ("surname", FieldMapping::text(TEXT_ANALYZER)),
                ("motivation", FieldMapping::text(TEXT_ANALYZER)),
            ]),
        ),
    ])
}

/// Drop `index` if present and create it again with the prize mapping
pub async fn recreate_index(client: &EsClient, index: &str) -> Result<()> {
    if client.index_exists(index).await? {
        client.delete_index(index).await?;
        tracing::info!(index, "Dropped existing index");
    }
    client.create_index(index, &prize_index_definition()).await?;
    tracing::info!(index, "Created index");
    Ok(())
}

/// Prizes read from the feed, after dropping unusable entries
#[derive(Debug, Default)]
pub struct PrizeFeed {
    pub prizes: Vec<Prize>,
    pub skipped: usize,
}

#[derive(Deserialize)]
struct FeedEnvelope {
    prizes: Vec<Value>,
}

/// Parse a `{"prizes": [...]}` document.
///
/// Entries without a `laureates` key (years the prize was not awarded) are
/// kept with an empty list. Entries that still fail to parse or validate are
/// skipped with a warning.
pub fn parse_feed(body: Value) -> Result<PrizeFeed> {
    let envelope: FeedEnvelope = serde_json::from_value(body)?;
    let mut feed = PrizeFeed::default();

    for (position, mut entry) in envelope.prizes.into_iter().enumerate() {
        if let Value::Object(map) = &mut entry {
            map.entry("laureates")
                .or_insert_with(|| Value::Array(Vec::new()));
        }
        let parsed = serde_json::from_value::<Prize>(entry)
            .map_err(|e| e.to_string())
            .and_then(|prize| prize.validate().map(|_| prize).map_err(|e| e.to_string()));
        match parsed {
            Ok(prize) => feed.prizes.push(prize),
            Err(reason) => {
                tracing::warn!(position, %reason, "Skipping prize from feed");
                feed.skipped += 1;
            }
        }
    }

    Ok(feed)
}

pub async fn fetch_prize_feed(http: &reqwest::Client, url: &str) -> Result<PrizeFeed> {
    tracing::info!(url, "Fetching prize feed");
    let body: Value = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let feed = parse_feed(body)?;
    tracing::info!(
        prizes = feed.prizes.len(),
        skipped = feed.skipped,
        "Prize feed parsed"
    );
    Ok(feed)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub indexed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Bulk-write `prizes` in chunks of `chunk_size`.
///
/// A failed chunk is logged and counted; loading carries on with the next.
pub async fn load_into(
    gateway: &dyn SearchGateway,
    prizes: &[Prize],
    chunk_size: usize,
) -> LoadReport {
    let mut report = LoadReport::default();

    for (n, chunk) in prizes.chunks(chunk_size.max(1)).enumerate() {
        match gateway.bulk_upsert(chunk).await {
            Ok(outcome) => {
                for failure in outcome.failures() {
                    tracing::warn!(
                        id = %failure.id,
                        reason = failure.error.as_deref().unwrap_or_default(),
                        "Prize not indexed"
                    );
                }
                report.indexed += outcome.indexed();
                report.failed += outcome.failed();
                tracing::info!(chunk = n, documents = chunk.len(), "Bulk indexed chunk");
            }
            Err(e) => {
                tracing::error!(chunk = n, documents = chunk.len(), error = %e, "Bulk chunk failed");
                report.failed += chunk.len();
            }
        }
    }

    report
}

/// Run the configured bootstrap steps against `gateway`'s index
pub async fn run(gateway: &EsGateway, config: &BootstrapConfig) -> Result<Option<LoadReport>> {
    if config.recreate_index {
        recreate_index(gateway.client(), gateway.index()).await?;
    }
    if !config.load_data {
        return Ok(None);
    }

    let http = reqwest::Client::builder().timeout(FEED_TIMEOUT).build()?;
    let feed = fetch_prize_feed(&http, &config.source_url).await?;
    let mut report = load_into(gateway, &feed.prizes, config.chunk_size).await;
    report.skipped = feed.skipped;

    gateway.client().refresh(gateway.index()).await?;
    tracing::info!(
        indexed = report.indexed,
        failed = report.failed,
        skipped = report.skipped,
        "Data loading completed"
    );
    Ok(Some(report))
}
