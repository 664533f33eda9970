//! HTTP client for the Elasticsearch REST API

use crate::bulk::BulkBody;
use crate::error::EsError;
use crate::mapping::IndexDefinition;
use crate::query::SearchRequest;
use crate::response::{BulkResponse, IndexResponse, RootInfo, SearchResponse};
use crate::Result;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Connection and timeout settings
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Attempts made by [`EsClient::connect`] before giving up
    pub connect_retries: u32,
    /// Fixed pause between connect attempts
    pub retry_delay: Duration,
    /// Upper bound on every outbound request
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_retries: 5,
            retry_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Elasticsearch REST client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct EsClient {
    client: Client,
    base_url: Url,
    options: ClientOptions,
}

impl EsClient {
    /// Create a client without contacting the engine
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(EsError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let client = Client::builder()
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            options,
        })
    }

    /// Create a client and wait until the engine answers.
    ///
    /// Makes at most `connect_retries` attempts with `retry_delay` between
    /// them. Only startup goes through here; per-request calls never retry.
    pub async fn connect(base_url: &str, options: ClientOptions) -> Result<Self> {
        let client = Self::new(base_url, options)?;
        let attempts = client.options.connect_retries.max(1);

        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match client.info().await {
                Ok(info) => {
                    tracing::info!(
                        "Connected to Elasticsearch {} at {}",
                        info.version.number,
                        client.base_url
                    );
                    return Ok(client);
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < attempts {
                        tracing::warn!(
                            "Failed to connect to Elasticsearch (attempt {}/{}): {}",
                            attempt,
                            attempts,
                            e
                        );
                        tokio::time::sleep(client.options.retry_delay).await;
                    }
                }
            }
        }

        tracing::error!(
            "Could not connect to Elasticsearch after {} attempts",
            attempts
        );
        Err(EsError::Unreachable {
            url: client.base_url.to_string(),
            attempts,
            last: last_error,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn check(response: Response, index: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EsError::from_status(status.as_u16(), &body, index))
    }

    /// GET / - cluster name and version
    pub async fn info(&self) -> Result<RootInfo> {
        let response = self.client.get(self.endpoint(&[])).send().await?;
        let response = Self::check(response, "").await?;
        Ok(response.json().await?)
    }

    /// POST /{index}/_search
    pub async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        tracing::debug!(index, from = request.from, size = request.size, "search");
        let response = self
            .client
            .post(self.endpoint(&[index, "_search"]))
            .json(request)
            .send()
            .await?;
        let response = Self::check(response, index).await?;
        Ok(response.json().await?)
    }

    /// PUT /{index}/_doc/{id}
    pub async fn index_document<T: Serialize + ?Sized>(
        &self,
        index: &str,
        id: &str,
        doc: &T,
    ) -> Result<IndexResponse> {
        let response = self
            .client
            .put(self.endpoint(&[index, "_doc", id]))
            .json(doc)
            .send()
            .await?;
        let response = Self::check(response, index).await?;
        Ok(response.json().await?)
    }

    /// HEAD /{index}/_doc/{id}
    pub async fn document_exists(&self, index: &str, id: &str) -> Result<bool> {
        let response = self
            .client
            .head(self.endpoint(&[index, "_doc", id]))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Self::check(response, index).await.map(|_| true),
        }
    }

    /// POST /_bulk
    pub async fn bulk(&self, body: BulkBody, refresh: bool) -> Result<BulkResponse> {
        let operations = body.len();
        let response = self
            .client
            .post(self.endpoint(&["_bulk"]))
            .query(&[("refresh", if refresh { "true" } else { "false" })])
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body.into_bytes())
            .send()
            .await?;
        let response = Self::check(response, "").await?;
        let parsed: BulkResponse = response.json().await?;
        tracing::debug!(operations, errors = parsed.errors, "bulk");
        Ok(parsed)
    }

    /// HEAD /{index}
    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.client.head(self.endpoint(&[index])).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Self::check(response, index).await.map(|_| true),
        }
    }

    /// PUT /{index}
    pub async fn create_index(&self, index: &str, definition: &IndexDefinition) -> Result<()> {
        let response = self
            .client
            .put(self.endpoint(&[index]))
            .json(definition)
            .send()
            .await?;
        Self::check(response, index).await?;
        Ok(())
    }

    /// DELETE /{index}
    pub async fn delete_index(&self, index: &str) -> Result<()> {
        let response = self.client.delete(self.endpoint(&[index])).send().await?;
        Self::check(response, index).await?;
        Ok(())
    }

    /// POST /{index}/_refresh
    pub async fn refresh(&self, index: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(&[index, "_refresh"]))
            .send()
            .await?;
        Self::check(response, index).await?;
        Ok(())
    }
}
