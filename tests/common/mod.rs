#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use todo_backend::api::router;
use todo_backend::db::{MemoryTodoStore, SqliteTodoStore, StoreError, TodoStore};
use todo_backend::ids::{IdGenerator, SequentialIds};
use todo_backend::models::Todo;
use todo_backend::state::AppState;

pub const AUTHORITY: &str = "127.0.0.1:8082";

pub fn memory_store() -> Arc<MemoryTodoStore> {
    Arc::new(MemoryTodoStore::new(Arc::new(SequentialIds::new())))
}

pub fn memory_app() -> Router {
    router(AppState::new(memory_store(), AUTHORITY))
}

pub async fn sqlite_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");
    let store = SqliteTodoStore::new(pool, Arc::new(SequentialIds::new()))
        .await
        .expect("Failed to create schema");
    router(AppState::new(Arc::new(store), AUTHORITY))
}

pub fn unavailable_app() -> Router {
    router(AppState::new(Arc::new(UnavailableStore::default()), AUTHORITY))
}

/// A backend whose connection is always down.
#[derive(Default)]
pub struct UnavailableStore {
    ids: SequentialIds,
}

fn down() -> StoreError {
    StoreError::Database(sqlx::Error::PoolClosed)
}

#[async_trait]
impl TodoStore for UnavailableStore {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    fn ids(&self) -> &dyn IdGenerator {
        &self.ids
    }

    async fn init_data(&self) -> Result<(), StoreError> {
        Err(down())
    }

    async fn insert(&self, _todo: Todo) -> Result<Todo, StoreError> {
        Err(down())
    }

    async fn get_all(&self) -> Result<Vec<Todo>, StoreError> {
        Err(down())
    }

    async fn get_certain(&self, _id: i64) -> Result<Option<Todo>, StoreError> {
        Err(down())
    }

    async fn delete(&self, _id: i64) -> Result<(), StoreError> {
        Err(down())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

/// Sends one request and returns the status with the JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "localhost:8082")
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, value)
}
