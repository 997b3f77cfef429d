use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::NaiveDate;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use habitual::config::DB_FILE_NAME;
use habitual::engine::FixedClock;
use habitual::server::{AppState, create_router};
use habitual::store::{SqliteStore, Store};

/// The router backed by a temp-dir database and a clock pinned to noon UTC.
pub struct TestApp {
    pub temp_dir: TempDir,
    router: Router,
}

impl TestApp {
    pub fn on(date: &str) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join(DB_FILE_NAME)).expect("open store");
        store.initialize().expect("initialize store");

        let today = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date");
        let state = Arc::new(AppState::new(
            Arc::new(store),
            Arc::new(FixedClock::on(today)),
        ));

        Self {
            temp_dir,
            router: create_router(state),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("send request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates a habit and returns its id.
    pub async fn create_habit(&self, body: Value) -> String {
        let (status, resp) = self.post("/api/v1/habits", body).await;
        assert_eq!(status, StatusCode::CREATED, "create habit: {resp}");
        resp["data"]["id"].as_str().expect("habit id").to_string()
    }
}
