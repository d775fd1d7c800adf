//! Common test helpers for integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{create_test_app_state, seed_task};
//! ```
//!
//! # Note
//!
//! Rust compiles each integration test file as a separate crate, so helpers
//! used by only some files would otherwise warn as dead code.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tasknet::api::{AppState, DEFAULT_BASE_PATH, router};
use tasknet::domain::{DueDate, Task, TaskId, TaskStatus};

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` with an empty in-memory repository.
pub fn create_test_app_state() -> AppState {
    AppState::in_memory()
}

/// Creates the full router over `state`, mounted at the default base path.
pub fn create_test_router(state: &AppState) -> Router {
    router(state.clone(), DEFAULT_BASE_PATH)
}

/// Serves the full router on an ephemeral local port.
///
/// The server task runs until the test's runtime shuts down.
pub async fn spawn_server(state: &AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let application = create_test_router(state);
    tokio::spawn(async move {
        axum::serve(listener, application).await.unwrap();
    });
    address
}

// =============================================================================
// Task Fixtures
// =============================================================================

/// Builds a task with the given id, status and optional due date.
pub fn task(id: i64, status: TaskStatus, due: Option<&str>) -> Task {
    Task::new(TaskId::new(id), format!("Task {id}"))
        .with_status(status)
        .with_due_date(due.map(|text| DueDate::parse(text).unwrap()))
}

/// Inserts a task directly into the repository.
pub async fn seed_task(state: &AppState, task: Task) {
    state.task_repository.insert(task).await.unwrap();
}

/// Inserts several tasks directly into the repository.
pub async fn seed_tasks(state: &AppState, tasks: Vec<Task>) {
    for task in tasks {
        seed_task(state, task).await;
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Sends one request through the router and returns status and JSON body.
///
/// A non-JSON body is returned as a JSON string.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, json)
}

/// Sends a raw body with a JSON content type.
pub async fn send_raw(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Extracts the ids of a list response body, in order.
pub fn listed_ids(body: &Value) -> Vec<i64> {
    body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_i64().unwrap())
        .collect()
}
