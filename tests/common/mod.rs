//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use campus_events_server::config::Config;
use campus_events_server::models::{Event, EventFilter, NewEvent};
use campus_events_server::routes::create_routes;
use campus_events_server::state::AppState;
use campus_events_server::store::{EventStore, MemoryEventStore, StoreError};

/// A store whose every call fails as if the backend were down.
pub struct FailingEventStore;

#[async_trait]
impl EventStore for FailingEventStore {
    async fn insert(&self, _candidate: NewEvent) -> Result<Event, StoreError> {
        Err(StoreError::Unavailable("event store is offline".to_string()))
    }

    async fn find(&self, _filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        Err(StoreError::Unavailable("event store is offline".to_string()))
    }
}

pub fn build_app(store: Arc<dyn EventStore>) -> Router {
    build_app_with_config(store, &Config::default())
}

pub fn build_app_with_config(store: Arc<dyn EventStore>, config: &Config) -> Router {
    create_routes(AppState::new(store), config)
}

pub fn memory_app() -> (Router, Arc<MemoryEventStore>) {
    let store = Arc::new(MemoryEventStore::new());
    (build_app(store.clone()), store)
}

pub fn hack_night() -> Value {
    json!({
        "eventName": "Hack Night",
        "clubName": "CS Club",
        "category": "Tech",
        "dateOfEvent": "2024-05-01",
        "timeOfEvent": "18:00",
        "venue": "Lab 3",
        "description": "...",
        "image": "<data>",
        "organizerName": "Ana",
        "organizerPhone": "555-0100"
    })
}

/// A valid submission with the given category, club and date.
pub fn submission(name: &str, category: &str, club: &str, date: &str) -> Value {
    let mut body = hack_night();
    body["eventName"] = json!(name);
    body["category"] = json!(category);
    body["clubName"] = json!(club);
    body["dateOfEvent"] = json!(date);
    body
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, headers, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let (status, _, json) = send(app, request).await;
    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let (status, _, json) = send(app, request).await;
    (status, json)
}
