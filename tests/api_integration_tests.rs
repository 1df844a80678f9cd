//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use slot_cache::{api::create_router, AppState, MemoryStore, SlotCache};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app(capacity: usize) -> Router {
    let cache = SlotCache::new(Arc::new(MemoryStore::new(capacity)));
    create_router(AppState::new(cache))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// JSON string literal that serializes to exactly `units` bytes.
fn payload(units: usize) -> String {
    format!("\"{}\"", "x".repeat(units - 2))
}

// == PUT /slots/:key ==

#[tokio::test]
async fn test_put_slot_success() {
    let app = create_test_app(1024);

    let response = app
        .oneshot(put("/slots/classes", r#"{"value":[{"id":"c1","name":"Form 1"}]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "classes");
    assert_eq!(json["category"], "primary");
    assert!(json["message"].as_str().unwrap().contains("classes"));
    assert_eq!(json["evicted"], serde_json::json!([]));
}

#[tokio::test]
async fn test_put_slot_infers_category_from_key() {
    let app = create_test_app(1024);

    let response = app
        .oneshot(put("/slots/notifications", r#"{"value":[]}"#))
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["category"], "ephemeral");
}

#[tokio::test]
async fn test_put_slot_invalid_body() {
    let app = create_test_app(1024);

    let response = app
        .oneshot(put("/slots/classes", r#"{"value":1,"category":"precious"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_put_slot_key_too_long() {
    let app = create_test_app(1024);
    let uri = format!("/slots/{}", "k".repeat(300));

    let response = app.oneshot(put(&uri, r#"{"value":1}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == GET /slots/:key ==

#[tokio::test]
async fn test_get_slot_roundtrip() {
    let app = create_test_app(1024);

    let put_response = app
        .clone()
        .oneshot(put("/slots/lessons-c1", r#"{"value":{"title":"Fractions"}}"#))
        .await
        .unwrap();
    assert_eq!(put_response.status(), StatusCode::OK);

    let response = app.oneshot(get("/slots/lessons-c1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "lessons-c1");
    assert_eq!(json["value"]["title"], "Fractions");
}

#[tokio::test]
async fn test_get_slot_not_found() {
    let app = create_test_app(1024);

    let response = app.oneshot(get("/slots/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

// == DELETE /slots/:key ==

#[tokio::test]
async fn test_delete_slot() {
    let app = create_test_app(1024);

    app.clone()
        .oneshot(put("/slots/enquiries", r#"{"value":[]}"#))
        .await
        .unwrap();

    let response = app.clone().oneshot(delete("/slots/enquiries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/slots/enquiries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(delete("/slots/enquiries")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Eviction over HTTP ==

#[tokio::test]
async fn test_full_store_evicts_notifications() {
    let app = create_test_app(100);

    let body = format!(r#"{{"value":{}}}"#, payload(40));
    app.clone().oneshot(put("/slots/notifications", &body)).await.unwrap();
    let body = format!(r#"{{"value":{}}}"#, payload(50));
    app.clone().oneshot(put("/slots/students", &body)).await.unwrap();

    let body = format!(r#"{{"value":{}}}"#, payload(90));
    let response = app.clone().oneshot(put("/slots/students", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["evicted"], serde_json::json!(["notifications"]));

    let response = app.oneshot(get("/slots/notifications")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_store_reports_storage_full() {
    let app = create_test_app(50);

    let body = format!(r#"{{"value":{}}}"#, payload(50));
    app.clone().oneshot(put("/slots/students", &body)).await.unwrap();

    let body = format!(r#"{{"value":{}}}"#, payload(60));
    let response = app.clone().oneshot(put("/slots/students", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INSUFFICIENT_STORAGE);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("Storage is full"));

    // Previous copy is intact
    let response = app.oneshot(get("/slots/students")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["value"].as_str().unwrap().len(), 48);
}

// == GET /slots, /stats, /health ==

#[tokio::test]
async fn test_list_slots() {
    let app = create_test_app(1024);

    app.clone()
        .oneshot(put("/slots/enquiries", r#"{"value":[]}"#))
        .await
        .unwrap();
    app.clone()
        .oneshot(put("/slots/classes", r#"{"value":[]}"#))
        .await
        .unwrap();

    let response = app.oneshot(get("/slots")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let slots = json["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["key"], "classes");
    assert_eq!(slots[1]["category"], "conversational");
    assert_eq!(slots[1]["present"], true);
}

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app(1024);

    app.clone()
        .oneshot(put("/slots/classes", r#"{"value":[1,2]}"#))
        .await
        .unwrap();
    app.clone().oneshot(get("/slots/classes")).await.unwrap();
    app.clone().oneshot(get("/slots/missing")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["writes"], 1);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_slots"], 1);
    assert_eq!(json["bytes_used"], 5);
    assert_eq!(json["capacity"], 1024);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(1024);

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
