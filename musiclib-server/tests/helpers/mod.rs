//! Shared helpers for musiclib-server integration tests

#![allow(dead_code)]

pub mod log_capture;
pub mod memory_store;

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use serde_json::Value;

pub use log_capture::LogCapture;
pub use memory_store::MemoryStore;
use musiclib_server::{build_router, AppState};

/// Router over a fresh in-memory store; the store handle is returned for inspection
pub fn memory_app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    (build_router(AppState::new(store.clone())), store)
}

/// Request without a body
pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Request carrying a JSON body
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request with a raw body string
pub fn raw_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Extract text body from response
pub async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}
