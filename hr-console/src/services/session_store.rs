//! Single source of truth for session state.
//!
//! Every mutation holds the state write lock until the new state is stored,
//! the namespaced snapshot is written and subscribers are notified. Raw
//! tokens are additionally kept under their own storage keys so the request
//! interceptor can find them without parsing the snapshot.

use crate::models::{PersistedSession, Session, User};
use console_core::storage::KeyValueStore;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    namespace: String,
    state: RwLock<Session>,
    /// Token the client sends by default, mirroring a shared client header.
    default_token: RwLock<Option<String>>,
    changes: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        let (changes, _) = watch::channel(Session::default());
        Self {
            storage,
            namespace: namespace.into(),
            state: RwLock::new(Session::default()),
            default_token: RwLock::new(None),
            changes,
        }
    }

    pub fn snapshot(&self) -> Session {
        self.read_state().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.changes.subscribe()
    }

    /// Load the persisted snapshot into memory, without network I/O.
    ///
    /// A missing or unreadable snapshot leaves the session anonymous.
    pub fn rehydrate(&self) {
        let Some(snapshot) = self.read_snapshot() else {
            return;
        };
        let session = snapshot.into_session();
        let mut state = self.write_state();
        if session.is_authenticated {
            self.set_default_token(session.access_token.clone());
        }
        tracing::debug!(
            is_authenticated = session.is_authenticated,
            "Rehydrated session snapshot"
        );
        *state = session;
        self.changes.send_replace(state.clone());
    }

    /// Tokens found in durable storage: the raw keys first, then the snapshot.
    pub fn persisted_tokens(&self) -> (Option<String>, Option<String>) {
        let access = self.read_key(ACCESS_TOKEN_KEY);
        let refresh = self.read_key(REFRESH_TOKEN_KEY);

        if access.is_some() {
            return (access, refresh);
        }

        match self.read_snapshot() {
            Some(snapshot) => (
                snapshot.state.access_token,
                refresh.or(snapshot.state.refresh_token),
            ),
            None => (None, refresh),
        }
    }

    /// Apply `mutate` to the session, persist it and notify subscribers.
    ///
    /// `mutate` runs with the state locked and must not call back into the
    /// store.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Session),
    {
        let mut state = self.write_state();
        mutate(&mut *state);
        self.commit(&state);
    }

    /// Enter the authenticated state with the given credentials.
    pub fn establish(&self, access_token: String, refresh_token: Option<String>, user: User) {
        let mut state = self.write_state();
        self.write_key(ACCESS_TOKEN_KEY, Some(&access_token));
        self.write_key(REFRESH_TOKEN_KEY, refresh_token.as_deref());
        self.set_default_token(Some(access_token.clone()));

        *state = Session {
            user: Some(user),
            access_token: Some(access_token),
            refresh_token,
            is_authenticated: true,
            is_loading: false,
            error: None,
        };
        self.commit(&state);
    }

    /// Drop every trace of the session: memory, durable storage and the
    /// default token. Safe to call repeatedly.
    pub fn clear(&self) {
        self.reset(None);
    }

    /// Like [`clear`](Self::clear), but the anonymous state carries `message`
    /// in the same commit.
    pub fn clear_with_error(&self, message: impl Into<String>) {
        self.reset(Some(message.into()));
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.update(|session| {
            session.is_loading = is_loading;
            if is_loading {
                session.error = None;
            }
        });
    }

    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|session| {
            session.is_loading = false;
            session.error = Some(message);
        });
    }

    pub fn clear_error(&self) {
        self.update(|session| session.error = None);
    }

    pub fn default_token(&self) -> Option<String> {
        self.default_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_default_token(&self, token: Option<String>) {
        *self
            .default_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Find the bearer token for an outgoing request.
    ///
    /// Looks at the raw storage key, then the persisted snapshot, then the
    /// default token. Storage failures count as "no token here".
    pub fn resolve_token(&self) -> Option<String> {
        self.read_key(ACCESS_TOKEN_KEY)
            .or_else(|| self.read_snapshot().and_then(|s| s.state.access_token))
            .filter(|token| !token.is_empty())
            .or_else(|| self.default_token())
    }

    fn reset(&self, error: Option<String>) {
        let mut state = self.write_state();
        self.write_key(ACCESS_TOKEN_KEY, None);
        self.write_key(REFRESH_TOKEN_KEY, None);
        if let Err(e) = self.storage.remove(&self.namespace) {
            tracing::warn!(error = %e, "Failed to remove session snapshot");
        }
        self.set_default_token(None);

        *state = Session {
            error,
            ..Session::default()
        };
        self.changes.send_replace(state.clone());
    }

    /// Persist and publish `session`. Called with the state write lock held.
    ///
    /// An anonymous session has no snapshot; transient flags alone are never
    /// written.
    fn commit(&self, session: &Session) {
        if session.is_authenticated || session.access_token.is_some() {
            self.write_snapshot(session);
        }
        self.changes.send_replace(session.clone());
    }

    fn write_snapshot(&self, session: &Session) {
        match serde_json::to_string(&session.persisted()) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(&self.namespace, &raw) {
                    tracing::warn!(error = %e, namespace = %self.namespace, "Failed to persist session snapshot");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize session snapshot"),
        }
    }

    fn read_snapshot(&self) -> Option<PersistedSession> {
        let raw = self.read_key(&self.namespace)?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, namespace = %self.namespace, "Auth data parsing error");
                None
            }
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, key, "Failed to read from session storage");
                None
            }
        }
    }

    fn write_key(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.storage.set(key, value),
            None => self.storage.remove(key),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, key, "Failed to write session storage");
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
