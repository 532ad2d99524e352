//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles against a router over two tenants
//! sharing a 900 byte budget with a 10 second default TTL.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tenant_cache::{api::create_router, AppState, CacheMetrics, TenantCaches};
use tower::ServiceExt;

// == Helper Functions ==

const DEFAULT_TTL: Duration = Duration::from_secs(10);

fn app_for(tenants: TenantCaches) -> Router {
    let metrics = CacheMetrics::new().unwrap();
    create_router(AppState::new(Arc::new(tenants), Arc::new(metrics)))
}

fn create_test_app() -> Router {
    let ids = vec!["tenant1".to_string(), "tenant2".to_string()];
    app_for(TenantCaches::new(true, &ids, 900, DEFAULT_TTL))
}

fn cache_uri(path: &str, tenant: &str) -> String {
    format!("{path}?system=inmemory&tenantID={tenant}")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post(app: &Router, tenant: &str, body: &str) -> StatusCode {
    send(app, "POST", &cache_uri("/cache", tenant), Some(body)).await.0
}

async fn get(app: &Router, key: &str, tenant: &str) -> (StatusCode, Value) {
    send(app, "GET", &cache_uri(&format!("/cache/{key}"), tenant), None).await
}

// == SET / GET ==

#[tokio::test]
async fn test_set_then_get_json_object() {
    let app = create_test_app();

    let status = post(
        &app,
        "tenant1",
        r#"{"key":"1","value":{"id":"12345","name":"Abcd"},"ttl":300}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get(&app, "1", "tenant1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "1");
    assert!(json["value"].to_string().contains(r#"{"id":"12345","name":"Abcd"}"#));
}

#[tokio::test(start_paused = true)]
async fn test_default_ttl_expiry() {
    let app = create_test_app();

    let status = post(&app, "tenant2", r#"{"key":"10","value":"sessions"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get(&app, "10", "tenant2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], "sessions");

    tokio::time::advance(DEFAULT_TTL).await;

    let (status, _) = get(&app, "10", "tenant2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_ttl_outlives_default() {
    let app = create_test_app();

    post(&app, "tenant1", r#"{"key":"long","value":1,"ttl":60}"#).await;
    tokio::time::advance(Duration::from_secs(30)).await;

    let (status, _) = get(&app, "long", "tenant1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_overwrite_replaces_value() {
    let app = create_test_app();

    post(&app, "tenant1", r#"{"key":"k","value":"old"}"#).await;
    post(&app, "tenant1", r#"{"key":"k","value":["new"]}"#).await;

    let (_, json) = get(&app, "k", "tenant1").await;
    assert_eq!(json["value"], serde_json::json!(["new"]));
}

#[tokio::test]
async fn test_get_missing_key() {
    let app = create_test_app();
    let (status, json) = get(&app, "nonexistent_key", "tenant1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());
}

// == DELETE / CLEAR ==

#[tokio::test]
async fn test_delete_is_tenant_scoped() {
    let app = create_test_app();

    post(&app, "tenant1", r#"{"key":"3","value":"one"}"#).await;
    post(&app, "tenant2", r#"{"key":"3","value":"two"}"#).await;

    let (status, _) = send(&app, "DELETE", &cache_uri("/cache/3", "tenant1"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, "3", "tenant1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get(&app, "3", "tenant2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], "two");
}

#[tokio::test]
async fn test_delete_missing_key() {
    let app = create_test_app();
    let (status, _) = send(&app, "DELETE", &cache_uri("/cache/none", "tenant1"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_is_tenant_scoped() {
    let app = create_test_app();

    post(&app, "tenant1", r#"{"key":"a","value":1}"#).await;
    post(&app, "tenant2", r#"{"key":"b","value":2}"#).await;

    let (status, _) = send(&app, "PUT", &cache_uri("/cache/clear", "tenant1"), None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(get(&app, "a", "tenant1").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "b", "tenant2").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_key_named_clear_round_trip() {
    let app = create_test_app();
    let uri = cache_uri("/cache/clear", "tenant1");

    assert_eq!(
        post(&app, "tenant1", r#"{"key":"clear","value":"v"}"#).await,
        StatusCode::OK
    );
    post(&app, "tenant1", r#"{"key":"other","value":1}"#).await;

    let (status, json) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "clear");
    assert_eq!(json["value"], "v");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(send(&app, "GET", &uri, None).await.0, StatusCode::NOT_FOUND);

    // Only the key went away, not the whole tenant store
    assert_eq!(get(&app, "other", "tenant1").await.0, StatusCode::OK);
}

// == Eviction ==

#[tokio::test]
async fn test_full_tenant_evicts_least_recent() {
    let app = create_test_app();

    post(&app, "tenant2", r#"{"key":"keep","value":0}"#).await;
    for i in 0..20 {
        let status = post(&app, "tenant1", &format!(r#"{{"key":"fill{i}","value":{i}}}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, entries) = send(&app, "GET", &cache_uri("/cache", "tenant1"), None).await;
    let count = entries.as_array().unwrap().len();
    assert!(count > 0 && count < 20, "450 bytes held {count} entries");
    assert_eq!(entries[0]["key"], "fill19");

    assert_eq!(get(&app, "fill0", "tenant1").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "fill19", "tenant1").await.0, StatusCode::OK);
    assert_eq!(get(&app, "keep", "tenant2").await.0, StatusCode::OK);
}

// == Validation ==

#[tokio::test]
async fn test_unknown_tenant_rejected() {
    let app = create_test_app();

    assert_eq!(
        post(&app, "tenant9", r#"{"key":"k","value":1}"#).await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(get(&app, "k", "tenant9").await.0, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PUT", &cache_uri("/cache/clear", "tenant9"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_tenant_rejected() {
    let app = create_test_app();
    let (status, _) = send(&app, "GET", "/cache/k?system=inmemory", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_system_rejected() {
    let app = create_test_app();

    let (status, _) = send(&app, "GET", "/cache/k?system=dynamo&tenantID=tenant1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/cache/k?tenantID=tenant1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Remote systems are only reachable when a URL was configured.
    for system in ["redis", "memcache"] {
        let (status, _) = send(&app, "GET", &format!("/cache/k?system={system}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{system}");
    }
}

#[tokio::test]
async fn test_malformed_bodies_rejected() {
    let app = create_test_app();

    for body in [
        r#"{"key":"k","value":"#,
        r#"{"key":1,"value":"v"}"#,
        r#"{"value":"v"}"#,
        r#"{"key":"k"}"#,
        r#"{"key":"","value":"v"}"#,
    ] {
        assert_eq!(post(&app, "tenant1", body).await, StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn test_tenancy_disabled_uses_default_store() {
    let app = app_for(TenantCaches::new(false, &[], 900, DEFAULT_TTL));

    let status = send(&app, "POST", "/cache?system=inmemory", Some(r#"{"key":"k","value":1}"#))
        .await
        .0;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/cache/k?system=inmemory&tenantID=other", None).await;
    assert_eq!(status, StatusCode::OK);
}

// == GET /cache, /stats, /health ==

#[tokio::test]
async fn test_get_all_snapshot() {
    let app = create_test_app();

    post(&app, "tenant1", r#"{"key":"a","value":1}"#).await;
    post(&app, "tenant1", r#"{"key":"b","value":2,"ttl":60}"#).await;

    let (status, json) = send(&app, "GET", &cache_uri("/cache", "tenant1"), None).await;
    assert_eq!(status, StatusCode::OK);

    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["key"], "b");
    assert_eq!(entries[0]["ttl"], 60);
    assert_eq!(entries[1]["key"], "a");
    assert_eq!(entries[1]["ttl"], 10);
    assert!(entries[0].get("expires_at").is_some());
}

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    post(&app, "tenant1", r#"{"key":"k","value":1}"#).await;
    get(&app, "k", "tenant1").await;
    get(&app, "missing", "tenant1").await;

    let (status, json) = send(&app, "GET", "/stats?tenantID=tenant1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["capacity_bytes"], 450);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let app = create_test_app();

    post(&app, "tenant1", r#"{"key":"k","value":1}"#).await;
    get(&app, "k", "tenant1").await;
    get(&app, "missing", "tenant1").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains(
        r#"http_requests_total{method="GET",path="/cache/:key",status="200"} 1"#
    ));
    assert!(text.contains(
        r#"http_requests_total{method="GET",path="/cache/:key",status="404"} 1"#
    ));
    assert!(text.contains(
        r#"cache_operations_total{operation="set",outcome="ok",system="inmemory"} 1"#
    ));
    assert!(text.contains(
        r#"cache_operations_total{operation="get",outcome="not_found",system="inmemory"} 1"#
    ));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
