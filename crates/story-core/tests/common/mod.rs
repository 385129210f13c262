//! Shared harness for integration tests against a mock Story API.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use story_core::api::ApiClient;
use story_core::auth::SessionStore;
use story_core::signals::SignalBus;
use story_core::storage::{MemoryStorage, Storage};
use wiremock::{MockServer, ResponseTemplate};

pub const TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.test-token";

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub struct Harness {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub signals: SignalBus,
    pub client: Arc<ApiClient>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with_timeout(Duration::from_secs(5)).await
    }

    pub async fn start_with_timeout(timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let storage = Arc::new(MemoryStorage::new());
        let signals = SignalBus::new();
        let session = SessionStore::new(Arc::clone(&storage) as Arc<dyn Storage>);
        let base_url = format!("{}/v1", server.uri());
        let client = Arc::new(
            ApiClient::new(&base_url, timeout, session, signals.clone()).expect("build client"),
        );
        Self {
            server,
            storage,
            signals,
            client,
        }
    }

    /// Persists a session as if the user had logged in earlier.
    pub fn log_in(&self) {
        self.storage.set("accessToken", TOKEN).unwrap();
        self.storage
            .set("userData", r#"{"userId":"user-1","name":"Ayu"}"#)
            .unwrap();
    }
}

pub fn story_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Dimas",
        "description": "Lorem Ipsum",
        "photoUrl": "https://story-api.dicoding.dev/images/stories/photos-1641623658595_dummy-pic.png",
        "createdAt": "2022-01-08T06:34:18.598Z",
        "lat": -10.212,
        "lon": -16.002
    })
}

pub fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn failure(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "error": true, "message": message }))
}
