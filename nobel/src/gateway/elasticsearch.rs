use super::{BulkItemOutcome, BulkOutcome, EngineInfo, GatewayError, IndexAck, SearchGateway};
use crate::model::Prize;
use async_trait::async_trait;
use nobel_es::bulk::BulkBody;
use nobel_es::{EsClient, SearchRequest, SearchResponse};

/// Gateway bound to a single prize index
#[derive(Clone)]
pub struct EsGateway {
    client: EsClient,
    index: String,
}

impl EsGateway {
    pub fn new(client: EsClient, index: impl Into<String>) -> Self {
        Self {
            client,
            index: index.into(),
        }
    }

    pub fn client(&self) -> &EsClient {
        &self.client
    }

    pub fn index(&self) -> &str {
        &self.index
    }
}

#[async_trait]
impl SearchGateway for EsGateway {
    async fn ping(&self) -> Result<EngineInfo, GatewayError> {
        let info = self.client.info().await?;
        Ok(EngineInfo {
            cluster_name: info.cluster_name,
            version: info.version.number,
        })
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, GatewayError> {
        Ok(self.client.search(&self.index, request).await?)
    }

    async fn upsert(&self, id: &str, prize: &Prize) -> Result<IndexAck, GatewayError> {
        let response = self
            .client
            .index_document(&self.index, id, prize)
            .await?;
        Ok(IndexAck {
            id: response.id,
            created: response.result == "created",
        })
    }

    async fn exists(&self, id: &str) -> Result<bool, GatewayError> {
        Ok(self.client.document_exists(&self.index, id).await?)
    }

    async fn bulk_upsert(&self, prizes: &[Prize]) -> Result<BulkOutcome, GatewayError> {
        if prizes.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let mut body = BulkBody::new();
        let mut ids = Vec::with_capacity(prizes.len());
        for prize in prizes {
            let id = prize.id();
            body.index(&self.index, &id, prize)
                .map_err(GatewayError::from)?;
            ids.push(id);
        }

        let response = self.client.bulk(body, false).await?;

        // Items come back in request order; fall back to our own ids when
        // the engine omits `_id` on a failed item.
        let items = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let result = response.items.get(i).and_then(|item| item.result());
                let error = match result {
                    Some(r) if r.is_success() => None,
                    Some(r) => Some(
                        r.error
                            .as_ref()
                            .map(|e| format!("{}: {}", e.error_type, e.reason))
                            .unwrap_or_else(|| format!("status {}", r.status)),
                    ),
                    None => Some("missing from bulk response".to_string()),
                };
                let id = match result {
                    Some(r) if !r.id.is_empty() => r.id.clone(),
                    _ => id,
                };
                BulkItemOutcome { id, error }
            })
            .collect();

        Ok(BulkOutcome { items })
    }
}
