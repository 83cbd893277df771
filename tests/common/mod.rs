#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use shortlink_analytics::application::services::{CodeGenerator, ReportSettings};
use shortlink_analytics::domain::repositories::PersistenceStore;
use shortlink_analytics::infrastructure::persistence::MemoryStore;
use shortlink_analytics::routes::router;
use shortlink_analytics::state::AppState;
use std::sync::Arc;

pub const BASE_URL: &str = "http://sho.rt";

/// Opened in-memory store behind the trait object the services use.
pub async fn open_memory_store() -> Arc<dyn PersistenceStore> {
    let store: Arc<dyn PersistenceStore> = Arc::new(MemoryStore::new());
    store.open().await.unwrap();
    store
}

pub fn create_test_state(store: Arc<dyn PersistenceStore>) -> AppState {
    let generator = CodeGenerator::with_seed(store.clone(), 7);
    AppState::new(store, generator, ReportSettings::default(), BASE_URL)
}

pub async fn create_test_server() -> (TestServer, AppState) {
    let state = create_test_state(open_memory_store().await);
    let server = TestServer::new(router(state.clone())).unwrap();
    (server, state)
}

/// Creates a link through the API and returns the response body.
pub async fn create_link(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/links").json(&body).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

pub async fn create_custom_link(server: &TestServer, code: &str, url: &str) -> Value {
    create_link(server, json!({ "url": url, "custom_code": code })).await
}
