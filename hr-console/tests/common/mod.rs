#![allow(dead_code)]

use base64::{Engine as _, engine::general_purpose};
use console_core::error::StorageError;
use console_core::storage::{KeyValueStore, MemoryStore};
use hr_console::Console;
use hr_console::config::ApiSettings;
use hr_console::services::RecordingNavigator;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::MockServer;

pub const NAMESPACE: &str = "auth-storage";

pub struct TestConsole {
    pub server: MockServer,
    pub console: Console,
    pub storage: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn api_settings(server: &MockServer) -> ApiSettings {
    ApiSettings {
        base_url: format!("{}/api", server.uri()),
        timeout_secs: 5,
        login_route: "/login".to_string(),
    }
}

/// Console over a fresh mock server and empty in-memory storage.
pub async fn spawn_console() -> TestConsole {
    spawn_console_with(Arc::new(MemoryStore::new())).await
}

/// Console over a fresh mock server and the given (possibly pre-seeded) storage.
pub async fn spawn_console_with(storage: Arc<MemoryStore>) -> TestConsole {
    let server = MockServer::start().await;
    let navigator = Arc::new(RecordingNavigator::new());
    let console = Console::new(
        api_settings(&server),
        NAMESPACE,
        storage.clone(),
        navigator.clone(),
    )
    .expect("Failed to build console");

    TestConsole {
        server,
        console,
        storage,
        navigator,
    }
}

/// Unsigned token whose payload carries the given identity.
pub fn token_for(user_id: i64, username: &str, role: &str) -> String {
    let payload = json!({
        "user_id": user_id,
        "username": username,
        "role": role,
        "exp": 4102444800i64,
        "iat": 1700000000i64
    });
    format!(
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.signature",
        general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

pub fn login_body(token: &str) -> Value {
    json!({
        "access_token": token,
        "refresh_token": "refresh-token",
        "user": {
            "id": 7,
            "username": "alice",
            "role": "admin",
            "email": "alice@example.com"
        }
    })
}

/// Storage whose reads and writes always fail.
#[derive(Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Poisoned("unavailable".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Poisoned("unavailable".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Poisoned("unavailable".to_string()))
    }
}
