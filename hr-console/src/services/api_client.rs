//! Authenticated HTTP client for the HR API.
//!
//! `send` runs every request through the same pipeline:
//!
//! 1. resolve the current bearer token from the session store and attach it,
//! 2. dispatch with trace context and a fresh `x-request-id`,
//! 3. on 401 from anything but the login endpoint, clear the session and
//!    navigate to the login route before handing the error back.

use crate::config::ApiSettings;
use crate::error::ApiError;
use crate::services::navigator::Navigator;
use crate::services::session_store::SessionStore;
use crate::utils::token_prefix;
use console_core::observability::{TracedClientExt, TracedRequest};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A request relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Whether a 401 from `path` is a credential failure rather than an
/// expired session.
pub fn is_login_endpoint(path: &str) -> bool {
    path.contains("/login")
}

pub struct ApiClient {
    client: Client,
    settings: ApiSettings,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        settings: ApiSettings,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            settings,
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Send a request through the auth interceptors.
    ///
    /// Non-2xx responses are turned into [`ApiError`]s carrying the server's
    /// `error` message.
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ApiError> {
        let url = self.url(&request.path);
        let request_id = Uuid::new_v4().to_string();

        let mut builder = self
            .client
            .traced_request(request.method.clone(), &url)
            .header(
                REQUEST_ID_HEADER,
                HeaderValue::from_str(&request_id)
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?,
            );
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder = self.authorize(builder);

        let response = builder.send().await.map_err(|e| {
            tracing::error!(
                request_id = %request_id,
                method = %request.method,
                url = %url,
                "Failed to send request: {}",
                e
            );
            ApiError::Transport(e)
        })?;

        tracing::debug!(
            request_id = %request_id,
            method = %request.method,
            url = %url,
            status = %response.status(),
            "API response"
        );

        self.inspect(&request, response).await
    }

    /// Send and decode a JSON response body.
    pub async fn request_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(ApiRequest::put(path).json(body)?).await
    }

    /// Request interceptor: attach `Authorization: Bearer <token>` when a
    /// token can be found. Never fails.
    fn authorize(&self, builder: TracedRequest) -> TracedRequest {
        let Some(token) = self.session.resolve_token() else {
            tracing::warn!("No token found for request");
            return builder;
        };

        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                tracing::debug!(token = %token_prefix(&token), "Token added to request");
                builder.header(AUTHORIZATION.as_str(), value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored token is not a valid header value");
                builder
            }
        }
    }

    /// Response interceptor: centralizes session invalidation on 401.
    async fn inspect(&self, request: &ApiRequest, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;

        if status == StatusCode::UNAUTHORIZED {
            if !is_login_endpoint(&request.path) {
                tracing::warn!(path = %request.path, "Authentication failed, logging out");
                self.session.clear();
                self.navigator.navigate(&self.settings.login_route);
            }
            return Err(ApiError::Unauthorized { message });
        }

        Err(ApiError::Status { status, message })
    }
}

async fn error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    serde_json::from_str::<Value>(&body)
        .ok()?
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
}
