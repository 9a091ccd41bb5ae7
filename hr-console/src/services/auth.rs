use crate::error::AuthError;
use crate::models::{CurrentUser, LoginResponse, ProfileUpdate, ProfileUpdateOutcome, Session, User};
use crate::services::api_client::{ApiClient, ApiRequest};
use crate::services::session_store::SessionStore;
use crate::utils::jwt::decode_jwt_claims;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const LOGIN_FAILED: &str = "An error occurred while logging in.";
const CURRENT_USER_FAILED: &str = "Failed to fetch user information.";
const CHANGE_PASSWORD_FAILED: &str = "Failed to change password.";
const PROFILE_FAILED: &str = "Failed to load profile.";
const PROFILE_UPDATE_FAILED: &str = "Failed to update profile.";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Deserialize)]
struct ProfileResponse {
    profile: Value,
}

/// Session service: login, logout, bootstrap and identity refresh.
///
/// Network and HTTP failures stop here and come back as [`AuthError`]
/// messages; the same message is recorded on the session for observers.
pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let session = Arc::clone(api.session());
        Self { api, session }
    }

    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub async fn login(&self, username: &str, password: &Secret<String>) -> Result<(), AuthError> {
        self.session.set_loading(true);

        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        match self
            .api
            .post_json::<_, LoginResponse>("/auth/login", &body)
            .await
        {
            Ok(tokens) => {
                tracing::info!(
                    user_id = tokens.user.id,
                    username = %tokens.user.username,
                    role = tokens.user.role.as_str(),
                    "User logged in successfully"
                );
                self.session
                    .establish(tokens.access_token, tokens.refresh_token, tokens.user);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "Login failed");
                let err = AuthError::from_api(&e, LOGIN_FAILED);
                self.session.clear_with_error(err.message.clone());
                Err(err)
            }
        }
    }

    /// Best-effort server notification, then an unconditional local reset.
    pub async fn logout(&self) {
        if self.session.snapshot().access_token.is_some() {
            match self.api.send(ApiRequest::post("/auth/logout")).await {
                Ok(_) => tracing::info!("Token revoked successfully"),
                Err(e) => tracing::error!("Logout request failed: {}", e),
            }
        }

        self.session.clear();
    }

    /// Fetch the authoritative identity and merge it into the session.
    pub async fn get_current_user(&self) -> Result<CurrentUser, AuthError> {
        match self.api.get_json::<CurrentUser>("/auth/me").await {
            Ok(current) => {
                let mut user = current.user.clone();
                user.employee = current.employee.clone();

                self.session.update(|session| {
                    // A logout that raced this request wins.
                    if session.is_authenticated {
                        session.user = Some(user);
                    }
                    session.error = None;
                });
                Ok(current)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh current user");
                let err = AuthError::from_api(&e, CURRENT_USER_FAILED);
                self.session.record_error(err.message.clone());
                Err(err)
            }
        }
    }

    /// Restore the session from durable storage without waiting on the
    /// network.
    ///
    /// The identity embedded in the access token is applied immediately; the
    /// returned task reconciles it with `/auth/me`. Returns `None` when no
    /// usable token was found and the session is anonymous.
    pub fn initialize_auth(self: &Arc<Self>) -> Option<JoinHandle<Result<CurrentUser, AuthError>>> {
        let (access_token, refresh_token) = self.session.persisted_tokens();

        let Some(access_token) = access_token else {
            self.session.clear();
            return None;
        };

        match decode_jwt_claims(&access_token) {
            Ok(claims) => {
                let user = User::from(&claims);
                tracing::debug!(
                    user_id = user.id,
                    username = %user.username,
                    "Restored session from persisted token"
                );
                self.session.establish(access_token, refresh_token, user);

                let service = Arc::clone(self);
                Some(tokio::spawn(async move { service.get_current_user().await }))
            }
            Err(e) => {
                tracing::error!(error = %e, "Token parsing error");
                // The token was never applied, so logout has nothing to
                // revoke server-side.
                self.session.clear();
                None
            }
        }
    }

    pub fn clear_error(&self) {
        self.session.clear_error();
    }

    pub async fn change_password(
        &self,
        current_password: &Secret<String>,
        new_password: &Secret<String>,
    ) -> Result<(), AuthError> {
        self.session.set_loading(true);

        let body = ChangePasswordRequest {
            current_password: current_password.expose_secret(),
            new_password: new_password.expose_secret(),
        };

        match self
            .api
            .put_json::<_, Value>("/auth/change-password", &body)
            .await
        {
            Ok(_) => {
                tracing::info!("Password changed");
                self.session.set_loading(false);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Password change failed");
                let err = AuthError::from_api(&e, CHANGE_PASSWORD_FAILED);
                self.session.record_error(err.message.clone());
                Err(err)
            }
        }
    }

    /// Employee profile linked to the signed-in account.
    pub async fn profile(&self) -> Result<Value, AuthError> {
        self.api
            .get_json::<ProfileResponse>("/auth/profile")
            .await
            .map(|response| response.profile)
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to load profile");
                AuthError::from_api(&e, PROFILE_FAILED)
            })
    }

    /// Update the self-editable profile fields (phone, address).
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<ProfileUpdateOutcome, AuthError> {
        if update.is_empty() {
            return Err(AuthError::new("Nothing to update."));
        }

        self.api
            .put_json::<_, ProfileUpdateOutcome>("/auth/profile", update)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to update profile");
                AuthError::from_api(&e, PROFILE_UPDATE_FAILED)
            })
    }
}
