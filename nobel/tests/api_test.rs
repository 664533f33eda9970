//! HTTP API tests against an in-memory gateway

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{curie, einstein, Call, RecordingGateway};
use http_body_util::BodyExt;
use nobel::api::ApiServer;
use nobel::config::{CorsConfig, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(gateway: Arc<RecordingGateway>) -> Router {
    ApiServer::new(gateway).router()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_welcome() {
    let gateway = Arc::new(RecordingGateway::default());
    let (status, body) = send(app(gateway), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Welcome to Nobel Prize Search API!"}));
}

fn with_origin(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("origin", origin)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cors_off_by_default() {
    let gateway = Arc::new(RecordingGateway::default());
    let response = app(gateway)
        .oneshot(with_origin("/", "http://localhost:3000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let gateway = Arc::new(RecordingGateway::default());
    let config = ServerConfig {
        cors: CorsConfig {
            enabled: true,
            origins: vec!["https://nobel.example.org".to_string()],
        },
        ..ServerConfig::default()
    };
    let router = ApiServer::with_config(gateway, config).router();
    let response = router
        .oneshot(with_origin("/", "https://nobel.example.org"))
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://nobel.example.org"
    );
}

#[tokio::test]
async fn test_health_ok() {
    let gateway = Arc::new(RecordingGateway::default());
    let (status, body) = send(app(gateway), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["engine"]["version"], "8.11.0");
}

#[tokio::test]
async fn test_health_engine_down() {
    let gateway = Arc::new(RecordingGateway::default());
    gateway.fail_all("connection refused");
    let (status, body) = send(app(gateway), get("/health")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Service unhealthy");
    assert!(body["detail"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_create_prize_uses_composite_id() {
    let gateway = Arc::new(RecordingGateway::default());
    let prize = serde_json::to_value(einstein()).unwrap();
    let (status, body) = send(app(gateway.clone()), json_request("POST", "/prize", &prize)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({"message": "Prize added successfully", "id": "1921_physics"})
    );
    assert_eq!(gateway.calls(), vec![Call::Upsert("1921_physics".into())]);
    assert!(gateway.docs.lock().unwrap().contains_key("1921_physics"));
}

#[tokio::test]
async fn test_create_prize_rejects_bad_year() {
    let gateway = Arc::new(RecordingGateway::default());
    let body = json!({"year": "21", "category": "physics", "laureates": []});
    let (status, body) = send(app(gateway.clone()), json_request("POST", "/prize", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to add prize");
    assert_eq!(body["errors"][0]["field"], "year");
    assert_eq!(body["errors"][0]["kind"], "invalid_format");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_prize_missing_laureate_fields() {
    let gateway = Arc::new(RecordingGateway::default());
    let body = json!({
        "year": "1921",
        "category": "physics",
        "laureates": [{"id": "", "firstname": "Albert"}, {"id": "27", "firstname": " "}]
    });
    let (status, body) = send(app(gateway.clone()), json_request("POST", "/prize", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["laureates[0].id", "laureates[1].firstname"]);
    assert!(!gateway.wrote());
}

#[tokio::test]
async fn test_create_prize_malformed_json() {
    let gateway = Arc::new(RecordingGateway::default());
    let request = Request::builder()
        .method("POST")
        .uri("/prize")
        .header("content-type", "application/json")
        .body(Body::from("{\"year\": "))
        .unwrap();
    let (status, body) = send(app(gateway.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to add prize");
    assert!(body["detail"].is_string());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_prize_engine_failure_is_bad_request() {
    let gateway = Arc::new(RecordingGateway::default());
    gateway.fail_all("connection refused");
    let prize = serde_json::to_value(einstein()).unwrap();
    let (status, body) = send(app(gateway), json_request("POST", "/prize", &prize)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Failed to add prize");
}

#[tokio::test]
async fn test_update_existing_prize() {
    let gateway = Arc::new(RecordingGateway::with_prizes([einstein()]));
    let mut updated = einstein();
    updated.laureates[0].share = Some("2".to_string());
    let body = serde_json::to_value(&updated).unwrap();

    let (status, response) = send(
        app(gateway.clone()),
        json_request("PUT", "/prize/1921/physics", &body),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"message": "Prize updated successfully", "id": "1921_physics"})
    );
    assert_eq!(
        gateway.calls(),
        vec![
            Call::Exists("1921_physics".into()),
            Call::Upsert("1921_physics".into())
        ]
    );
    assert_eq!(
        gateway.docs.lock().unwrap()["1921_physics"].laureates[0].share.as_deref(),
        Some("2")
    );
}

#[tokio::test]
async fn test_update_missing_prize_is_not_found_without_write() {
    let gateway = Arc::new(RecordingGateway::with_prizes([einstein()]));
    let body = json!({"year": "1800", "category": "physics", "laureates": []});

    let (status, response) = send(
        app(gateway.clone()),
        json_request("PUT", "/prize/1800/physics", &body),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "Prize not found");
    assert_eq!(response["detail"], "No prize with id 1800_physics");
    assert_eq!(gateway.calls(), vec![Call::Exists("1800_physics".into())]);
    assert!(!gateway.wrote());
}

#[tokio::test]
async fn test_update_validates_before_lookup() {
    let gateway = Arc::new(RecordingGateway::with_prizes([einstein()]));
    let body = json!({"year": "abcd", "category": "physics", "laureates": []});
    let (status, _) = send(
        app(gateway.clone()),
        json_request("PUT", "/prize/1921/physics", &body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_bulk_all_indexed() {
    let gateway = Arc::new(RecordingGateway::default());
    let body = serde_json::to_value(vec![einstein(), curie()]).unwrap();
    let (status, response) = send(
        app(gateway.clone()),
        json_request("POST", "/prize/bulk", &body),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response, json!({"indexed": 2, "failed": 0, "errors": []}));
    assert_eq!(gateway.docs.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bulk_partial_failure() {
    let gateway = Arc::new(RecordingGateway::default());
    gateway
        .reject_ids
        .lock()
        .unwrap()
        .push("1911_chemistry".to_string());
    let body = serde_json::to_value(vec![einstein(), curie()]).unwrap();
    let (status, response) = send(
        app(gateway.clone()),
        json_request("POST", "/prize/bulk", &body),
    )
    .await;

    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(response["indexed"], 1);
    assert_eq!(response["failed"], 1);
    assert_eq!(response["errors"][0]["id"], "1911_chemistry");
}

#[tokio::test]
async fn test_bulk_invalid_item_writes_nothing() {
    let gateway = Arc::new(RecordingGateway::default());
    let mut bad = curie();
    bad.year = "1911a".to_string();
    let body = serde_json::to_value(vec![einstein(), bad]).unwrap();
    let (status, response) = send(
        app(gateway.clone()),
        json_request("POST", "/prize/bulk", &body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["errors"][0]["field"], "[1].year");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_search_default_shape() {
    let gateway = Arc::new(RecordingGateway::with_prizes([einstein(), curie()]));
    let (status, body) = send(app(gateway.clone()), get("/search?q=Einstein")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["size"], 10);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0]["score"].is_number());
    assert!(results[0]["laureates"].is_array());

    let calls = gateway.calls();
    let Call::Search(request) = &calls[0] else {
        panic!("expected a search call, got {calls:?}");
    };
    assert_eq!(request["from"], 0);
    assert_eq!(request["size"], 10);
    assert_eq!(request["sort"], json!([{"_score": {"order": "desc"}}]));
    assert_eq!(request["query"]["bool"]["should"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_include_list_and_sort() {
    let gateway = Arc::new(RecordingGateway::with_prizes([einstein()]));
    let uri = "/search?q=physics&include=category,year&page=2&size=5&sort_by=year&sort_order=asc";
    let (status, body) = send(app(gateway.clone()), get(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
    assert_eq!(body["size"], 5);

    let calls = gateway.calls();
    let Call::Search(request) = &calls[0] else {
        panic!("expected a search call");
    };
    assert_eq!(request["from"], 5);
    let should = request["query"]["bool"]["should"].as_array().unwrap();
    assert_eq!(should.len(), 1);
    assert_eq!(
        should[0]["multi_match"]["fields"],
        json!(["category^1", "year^1"])
    );
    assert_eq!(
        request["sort"],
        json!([{"year": {"order": "asc"}}, {"_score": {"order": "desc"}}])
    );
}

#[tokio::test]
async fn test_search_repeated_exclude_keys() {
    let gateway = Arc::new(RecordingGateway::with_prizes([einstein()]));
    let uri = "/search?q=x&exclude=laureates.motivation&exclude=year";
    let (status, _) = send(app(gateway.clone()), get(uri)).await;
    assert_eq!(status, StatusCode::OK);

    let calls = gateway.calls();
    let Call::Search(request) = &calls[0] else {
        panic!("expected a search call");
    };
    assert_eq!(
        request["query"]["bool"]["should"][0]["multi_match"]["fields"],
        json!(["laureates.firstname^3", "laureates.surname^3", "category^1"])
    );
}

#[tokio::test]
async fn test_search_page_zero_rejected_before_engine() {
    let gateway = Arc::new(RecordingGateway::with_prizes([einstein()]));
    let (status, body) = send(app(gateway.clone()), get("/search?q=Einstein&page=0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid search parameters");
    assert_eq!(body["errors"][0]["field"], "page");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_search_page_past_u32_rejected() {
    let gateway = Arc::new(RecordingGateway::with_prizes([einstein()]));
    let (status, body) = send(app(gateway.clone()), get("/search?q=Einstein&page=4294967296")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "page");
    assert_eq!(body["errors"][0]["kind"], "invalid_range");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_search_reports_every_invalid_parameter() {
    let gateway = Arc::new(RecordingGateway::default());
    let uri = "/search?include=laureates.middlename&size=500&sort_by=date";
    let (status, body) = send(app(gateway.clone()), get(uri)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let kinds: Vec<(String, String)> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["field"].as_str().unwrap().to_string(),
                e["kind"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert!(kinds.contains(&("q".into(), "missing".into())));
    assert!(kinds.contains(&("include".into(), "invalid_field".into())));
    assert!(kinds.contains(&("size".into(), "invalid_range".into())));
    assert!(kinds.contains(&("sort_by".into(), "invalid_enum".into())));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_search_engine_failure_is_internal_error() {
    let gateway = Arc::new(RecordingGateway::default());
    gateway.fail_all("connection refused");
    let (status, body) = send(app(gateway), get("/search?q=Einstein")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_search_skips_malformed_hits() {
    let gateway = Arc::new(RecordingGateway::default());
    gateway.set_search_response(json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": {"value": 7, "relation": "eq"},
            "max_score": 2.0,
            "hits": [
                {"_index": "nobel_prizes", "_id": "broken", "_score": 2.0,
                 "_source": {"year": 1921, "category": "physics", "laureates": []}},
                {"_index": "nobel_prizes", "_id": "1921_physics", "_score": 1.0,
                 "_source": serde_json::to_value(einstein()).unwrap()}
            ]
        }
    }));
    let (status, body) = send(app(gateway), get("/search?q=Einstein")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 7);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["year"], "1921");
    assert_eq!(body["results"][0]["score"], 1.0);
}

#[tokio::test]
async fn test_extra_routes_are_merged() {
    let gateway = Arc::new(RecordingGateway::default());
    let router = ApiServer::new(gateway)
        .with_routes(Router::new().route("/metrics", axum::routing::get(|| async { "# metrics" })))
        .router();
    let response = router.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
