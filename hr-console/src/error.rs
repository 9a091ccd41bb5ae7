use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`ApiClient`](crate::services::api_client::ApiClient).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Unauthorized { message: Option<String> },

    #[error("Request failed with status {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// The `error` text the backend put in its JSON body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// Failure returned by session operations.
///
/// Carries the user-facing message only; the underlying cause has already
/// been logged where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Prefer the backend's message, falling back to `fallback`.
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        Self::new(err.server_message().unwrap_or(fallback))
    }
}

/// Errors raised while wiring the console together.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("API client error: {0}")]
    Api(#[from] ApiError),
}
