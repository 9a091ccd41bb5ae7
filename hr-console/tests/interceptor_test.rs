mod common;

use common::{FailingStore, NAMESPACE, api_settings, login_body, spawn_console, spawn_console_with, token_for};
use console_core::storage::{KeyValueStore, MemoryStore};
use hr_console::error::ApiError;
use hr_console::services::session_store::ACCESS_TOKEN_KEY;
use hr_console::services::{ApiClient, ApiRequest, RecordingNavigator, SessionStore};
use reqwest::StatusCode;
use secrecy::Secret;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn logged_in() -> common::TestConsole {
    let app = spawn_console().await;
    let token = token_for(7, "alice", "admin");

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&token)))
        .mount(&app.server)
        .await;

    app.console
        .auth
        .login("alice", &Secret::new("pw".to_string()))
        .await
        .unwrap();
    app
}

#[tokio::test]
async fn test_unauthorized_response_forces_logout_and_redirect() {
    let app = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/payrolls"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .mount(&app.server)
        .await;

    let err = app
        .console
        .api
        .get_json::<Value>("/payrolls")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(err.server_message(), Some("Token expired"));

    let session = app.console.auth.session();
    assert!(!session.is_authenticated);
    assert!(session.access_token.is_none());
    assert!(app.storage.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    assert!(app.storage.get(NAMESPACE).unwrap().is_none());
    assert!(app.console.session.default_token().is_none());
    assert_eq!(app.navigator.routes(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_unauthorized_from_login_endpoint_is_not_intercepted() {
    let app = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "bad"})))
        .with_priority(1)
        .mount(&app.server)
        .await;

    let err = app
        .console
        .api
        .send(ApiRequest::post("/auth/login"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    // The earlier session is untouched and nobody was redirected.
    assert!(app.console.auth.session().is_authenticated);
    assert!(app.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_other_error_statuses_pass_through() {
    let app = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/bonus-policies"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "admins only"})))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/departments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&app.server)
        .await;

    let err = app
        .console
        .api
        .get_json::<Value>("/bonus-policies")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.server_message(), Some("admins only"));

    let err = app
        .console
        .api
        .get_json::<Value>("/departments")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.server_message().is_none());

    assert!(app.console.auth.session().is_authenticated);
    assert!(app.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_token_from_storage_key_is_attached() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(ACCESS_TOKEN_KEY, "raw-key-token").unwrap();
    let app = spawn_console_with(storage).await;

    Mock::given(method("GET"))
        .and(path("/api/my-attendance"))
        .and(header("Authorization", "Bearer raw-key-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(1)
        .mount(&app.server)
        .await;

    // Nothing was restored into memory; the interceptor reads storage directly.
    assert!(!app.console.auth.session().is_authenticated);
    let body: Value = app.console.api.get_json("/my-attendance").await.unwrap();
    assert_eq!(body, json!({"records": []}));
}

#[tokio::test]
async fn test_token_from_snapshot_is_attached() {
    let storage = Arc::new(MemoryStore::new());
    storage
        .set(
            NAMESPACE,
            &json!({"state": {"accessToken": "snapshot-token"}, "version": 0}).to_string(),
        )
        .unwrap();
    let app = spawn_console_with(storage).await;

    Mock::given(method("GET"))
        .and(path("/api/my-payroll"))
        .and(header("Authorization", "Bearer snapshot-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.server)
        .await;

    let body: Value = app.console.api.get_json("/my-payroll").await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_storage_failures_fall_back_to_default_token() {
    let server = MockServer::start().await;
    let session = Arc::new(SessionStore::new(Arc::new(FailingStore), NAMESPACE));
    session.set_default_token(Some("default-token".to_string()));
    let api = ApiClient::new(
        api_settings(&server),
        session,
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/departments"))
        .and(header("Authorization", "Bearer default-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
        .expect(1)
        .mount(&server)
        .await;

    let body: Value = api.get_json("/departments").await.unwrap();
    assert_eq!(body, json!([{"id": 3}]));
}

#[tokio::test]
async fn test_request_without_token_is_sent_bare() {
    let server = MockServer::start().await;
    let session = Arc::new(SessionStore::new(Arc::new(FailingStore), NAMESPACE));
    let navigator = Arc::new(RecordingNavigator::new());
    let api = ApiClient::new(api_settings(&server), session, navigator.clone()).unwrap();

    // Only reachable with an Authorization header.
    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token required"})))
        .mount(&server)
        .await;

    let err = api.get_json::<Value>("/employees").await.unwrap_err();
    assert_eq!(err.server_message(), Some("Token required"));
    assert_eq!(navigator.routes(), vec!["/login".to_string()]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
