pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use config::{ApiSettings, Settings};
use console_core::storage::{FileStore, KeyValueStore};
use error::{ApiError, ConsoleError};
use services::{ApiClient, AuthService, HrApi, Navigator, SessionStore};
use std::sync::Arc;

/// The wired-up console: one session shared by the auth service, the
/// authenticated client and the HR endpoints.
#[derive(Clone)]
pub struct Console {
    pub session: Arc<SessionStore>,
    pub api: Arc<ApiClient>,
    pub auth: Arc<AuthService>,
    pub hr: HrApi,
}

impl Console {
    /// Build the console over `storage` and rehydrate any persisted session.
    pub fn new(
        settings: ApiSettings,
        namespace: &str,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let session = Arc::new(SessionStore::new(storage, namespace));
        session.rehydrate();

        let api = Arc::new(ApiClient::new(settings, session.clone(), navigator)?);
        let auth = Arc::new(AuthService::new(api.clone()));
        let hr = HrApi::new(api.clone());

        Ok(Self {
            session,
            api,
            auth,
            hr,
        })
    }

    /// Build the console with file-backed storage as configured.
    pub fn from_settings(
        settings: &Settings,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConsoleError> {
        let storage = Arc::new(FileStore::new(&settings.storage.path));
        tracing::debug!(path = %storage.path().display(), "Using file session storage");

        Ok(Self::new(
            settings.api.clone(),
            &settings.storage.namespace,
            storage,
            navigator,
        )?)
    }
}
