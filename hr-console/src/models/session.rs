use super::user::User;
use serde::{Deserialize, Serialize};
use std::fmt;

/// In-memory session state shared by every consumer of the console.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// Stored snapshot: identity and tokens, never transient UI flags.
    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            state: PersistedState {
                user: self.user.clone(),
                access_token: self.access_token.clone(),
                refresh_token: self.refresh_token.clone(),
                is_authenticated: self.is_authenticated,
            },
            version: PersistedSession::VERSION,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("is_authenticated", &self.is_authenticated)
            .field("is_loading", &self.is_loading)
            .field("error", &self.error)
            .finish()
    }
}

/// Namespaced snapshot written to durable storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub state: PersistedState,
    #[serde(default)]
    pub version: u32,
}

impl PersistedSession {
    pub const VERSION: u32 = 0;

    /// Rebuild the in-memory session from the snapshot.
    ///
    /// A snapshot that claims authentication without a token or user is
    /// downgraded to anonymous.
    pub fn into_session(self) -> Session {
        let state = self.state;
        let is_authenticated =
            state.is_authenticated && state.access_token.is_some() && state.user.is_some();

        Session {
            user: state.user,
            access_token: state.access_token,
            refresh_token: state.refresh_token,
            is_authenticated,
            is_loading: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
}
