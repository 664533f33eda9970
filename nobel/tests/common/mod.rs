//! In-memory gateway shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use nobel::gateway::{
    BulkItemOutcome, BulkOutcome, EngineInfo, GatewayError, IndexAck, SearchGateway,
};
use nobel::model::{Laureate, Prize};
use nobel_es::{SearchRequest, SearchResponse};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A call the gateway received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Ping,
    Search(Value),
    Upsert(String),
    Exists(String),
    BulkUpsert(Vec<String>),
}

/// Stores prizes in a map and records every call.
///
/// Searches return every stored prize with a descending score, or a canned
/// response when one is set.
#[derive(Default)]
pub struct RecordingGateway {
    pub docs: Mutex<BTreeMap<String, Prize>>,
    pub calls: Mutex<Vec<Call>>,
    pub search_response: Mutex<Option<Value>>,
    pub fail_with: Mutex<Option<String>>,
    pub reject_ids: Mutex<Vec<String>>,
}

impl RecordingGateway {
    pub fn with_prizes(prizes: impl IntoIterator<Item = Prize>) -> Self {
        let gateway = Self::default();
        {
            let mut docs = gateway.docs.lock().unwrap();
            for prize in prizes {
                docs.insert(prize.id(), prize);
            }
        }
        gateway
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any write reached the gateway
    pub fn wrote(&self) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, Call::Upsert(_) | Call::BulkUpsert(_)))
    }

    pub fn fail_all(&self, reason: &str) {
        *self.fail_with.lock().unwrap() = Some(reason.to_string());
    }

    pub fn set_search_response(&self, response: Value) {
        *self.search_response.lock().unwrap() = Some(response);
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with.lock().unwrap().as_ref() {
            Some(reason) => Err(GatewayError::Connection(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SearchGateway for RecordingGateway {
    async fn ping(&self) -> Result<EngineInfo, GatewayError> {
        self.record(Call::Ping)?;
        Ok(EngineInfo {
            cluster_name: "test-cluster".to_string(),
            version: "8.11.0".to_string(),
        })
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, GatewayError> {
        self.record(Call::Search(serde_json::to_value(request).unwrap()))?;

        let body = match self.search_response.lock().unwrap().clone() {
            Some(body) => body,
            None => {
                let docs = self.docs.lock().unwrap();
                let hits: Vec<Value> = docs
                    .iter()
                    .enumerate()
                    .map(|(i, (id, prize))| {
                        json!({
                            "_index": "nobel_prizes",
                            "_id": id,
                            "_score": 10.0 - i as f64,
                            "_source": prize
                        })
                    })
                    .collect();
                json!({
                    "took": 1,
                    "timed_out": false,
                    "hits": {
                        "total": {"value": hits.len(), "relation": "eq"},
                        "max_score": 10.0,
                        "hits": hits
                    }
                })
            }
        };
        serde_json::from_value(body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn upsert(&self, id: &str, prize: &Prize) -> Result<IndexAck, GatewayError> {
        self.record(Call::Upsert(id.to_string()))?;
        let previous = self
            .docs
            .lock()
            .unwrap()
            .insert(id.to_string(), prize.clone());
        Ok(IndexAck {
            id: id.to_string(),
            created: previous.is_none(),
        })
    }

    async fn exists(&self, id: &str) -> Result<bool, GatewayError> {
        self.record(Call::Exists(id.to_string()))?;
        Ok(self.docs.lock().unwrap().contains_key(id))
    }

    async fn bulk_upsert(&self, prizes: &[Prize]) -> Result<BulkOutcome, GatewayError> {
        self.record(Call::BulkUpsert(prizes.iter().map(Prize::id).collect()))?;
        let rejected = self.reject_ids.lock().unwrap().clone();
        let mut docs = self.docs.lock().unwrap();
        let items = prizes
            .iter()
            .map(|prize| {
                let id = prize.id();
                if rejected.contains(&id) {
                    BulkItemOutcome {
                        id,
                        error: Some("mapper_parsing_exception: failed to parse".to_string()),
                    }
                } else {
                    docs.insert(id.clone(), prize.clone());
                    BulkItemOutcome { id, error: None }
                }
            })
            .collect();
        Ok(BulkOutcome { items })
    }
}

pub fn einstein() -> Prize {
    Prize {
        year: "1921".to_string(),
        category: "physics".to_string(),
        laureates: vec![Laureate {
            id: "26".to_string(),
            firstname: "Albert".to_string(),
            surname: Some("Einstein".to_string()),
            motivation: Some(
                "\"for his services to Theoretical Physics, and especially for his discovery of the law of the photoelectric effect\"".to_string(),
            ),
            share: Some("1".to_string()),
        }],
    }
}

pub fn curie() -> Prize {
    Prize {
        year: "1911".to_string(),
        category: "chemistry".to_string(),
        laureates: vec![Laureate {
            id: "6".to_string(),
            firstname: "Marie".to_string(),
            surname: Some("Curie".to_string()),
            motivation: Some(
                "\"in recognition of her services to the advancement of chemistry\"".to_string(),
            ),
            share: Some("1".to_string()),
        }],
    }
}
