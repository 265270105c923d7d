use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use super::endpoint::AuthEndpoint;
use crate::client::{ApiError, ApiRequest, DispatchError, Dispatcher};
use crate::config::AuthConfig;
use crate::models::{LoginRequest, UserProfile};
use crate::navigation::{Navigator, Route};
use crate::store::{StoreError, TokenStore};

/// Shown when the backend gives no usable message.
pub const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct LoginError {
    /// Human-readable reason, taken from the backend payload when present.
    pub message: String,
    #[source]
    pub source: ApiError,
}

impl LoginError {
    fn from_api(source: ApiError) -> Self {
        LoginError {
            message: source.user_message(LOGIN_FAILED),
            source,
        }
    }
}

/// Interactive login and logout.
///
/// Login talks to the auth endpoint directly, never through the dispatcher,
/// so no stale bearer token is sent and a rejected login cannot start a refresh.
pub struct AuthSession {
    endpoint: Arc<dyn AuthEndpoint>,
    dispatcher: Arc<Dispatcher>,
    navigator: Arc<dyn Navigator>,
    me_path: String,
    revoke_on_logout: bool,
    // Serializes login/logout against each other.
    busy: Mutex<()>,
}

impl AuthSession {
    pub fn new(
        endpoint: Arc<dyn AuthEndpoint>,
        dispatcher: Arc<Dispatcher>,
        navigator: Arc<dyn Navigator>,
        config: &AuthConfig,
    ) -> Self {
        AuthSession {
            endpoint,
            dispatcher,
            navigator,
            me_path: config.me_path.clone(),
            revoke_on_logout: config.revoke_on_logout,
            busy: Mutex::new(()),
        }
    }

    fn store(&self) -> &TokenStore {
        self.dispatcher.store()
    }

    /// Signs in, stores the credentials and profile, then lands on the dashboard.
    /// On failure nothing is written.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, LoginError> {
        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = match self.endpoint.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    event_name = "auth.login.failed",
                    event_domain = "auth",
                    error = %e,
                    "Login failed for '{}'",
                    credentials.email
                );
                return Err(LoginError::from_api(e));
            }
        };

        self.persist_login(
            &response.access_token,
            &response.refresh_token,
            response.expires_in,
            &response.user,
        )
        .map_err(|e| LoginError::from_api(e.into()))?;

        info!(
            event_name = "auth.login.succeeded",
            event_domain = "auth",
            "Logged in as '{}'",
            response.user.email
        );
        self.navigator.navigate(Route::Dashboard);
        Ok(response.user)
    }

    fn persist_login(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in: i64,
        user: &UserProfile,
    ) -> Result<(), StoreError> {
        let _busy = self.busy.lock().unwrap_or_else(|e| e.into_inner());
        self.store().save(access_token, refresh_token, expires_in)?;
        if let Err(e) = self.store().save_profile(user) {
            // Never leave credentials behind without the profile the guard needs.
            if let Err(clear_err) = self.store().clear() {
                error!("Failed to roll back credentials: {}", clear_err);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Clears the local session and goes to the login route, then asks the
    /// backend to revoke the old access token. Revocation is best effort.
    pub async fn logout(&self) -> Result<(), StoreError> {
        let access_token = {
            let _busy = self.busy.lock().unwrap_or_else(|e| e.into_inner());
            let token = self.store().access_token();
            if let Err(e) = self.store().clear_session() {
                error!("Failed to clear session storage: {}", e);
                return Err(e);
            }
            token
        };

        info!(
            event_name = "auth.logout",
            event_domain = "auth",
            "Logged out"
        );
        self.navigator.navigate(Route::Login);

        if self.revoke_on_logout {
            if let Some(token) = access_token {
                if let Err(e) = self.endpoint.logout(&token).await {
                    warn!("Server-side logout failed, ignoring: {}", e);
                }
            }
        }
        Ok(())
    }

    /// Fetches the signed-in profile and refreshes the cached copy.
    pub async fn current_user(&self) -> Result<UserProfile, DispatchError> {
        let profile: UserProfile = self.dispatcher.fetch(ApiRequest::get(&self.me_path)).await?;
        if let Err(e) = self.store().save_profile(&profile) {
            error!("Failed to cache user profile: {}", e);
        }
        Ok(profile)
    }

    /// The profile cached at login.
    pub fn cached_user(&self) -> Option<UserProfile> {
        self.store().profile()
    }
}
