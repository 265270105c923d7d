use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, debug_span, error, info, warn, Instrument};

use super::coordinator::{Admission, RefreshCoordinator};
use super::error::{ApiError, DispatchError};
use super::request::ApiRequest;
use super::transport::{check_envelope, unwrap_envelope, Transport};
use crate::auth::AuthEndpoint;
use crate::config::AuthConfig;
use crate::navigation::{Navigator, Route};
use crate::store::TokenStore;

/// Which requests are authenticated and how refreshes are bounded.
#[derive(Clone, Debug)]
pub struct DispatchPolicy {
    /// Paths containing any of these never get a bearer token and never refresh.
    pub unauthenticated_paths: Vec<String>,
    pub refresh_timeout: Duration,
    /// Refresh before sending when the token expires within this many seconds.
    pub proactive_refresh_buffer_seconds: Option<u64>,
}

impl DispatchPolicy {
    pub fn from_config(config: &AuthConfig) -> Self {
        DispatchPolicy {
            unauthenticated_paths: config.unauthenticated_paths.clone(),
            refresh_timeout: config.refresh_timeout(),
            proactive_refresh_buffer_seconds: config.proactive_refresh_buffer_seconds,
        }
    }

    pub fn is_unauthenticated(&self, path: &str) -> bool {
        self.unauthenticated_paths
            .iter()
            .any(|p| !p.is_empty() && path.contains(p.as_str()))
    }
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}

/// How one pass through the refresh protocol ended.
#[derive(Clone, Debug)]
enum RefreshOutcome {
    /// The store holds a new access token.
    Refreshed { access_token: String },
    /// The refresh call failed or timed out; the session was torn down.
    Failed { error: ApiError },
    /// There was no refresh token; the session was torn down.
    SessionExpired,
    /// The refresh we were waiting on was abandoned by its leader.
    /// Nothing was torn down.
    Aborted,
}

/// Single chokepoint for outbound backend traffic.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthEndpoint>,
    store: TokenStore,
    coordinator: Arc<RefreshCoordinator>,
    navigator: Arc<dyn Navigator>,
    policy: DispatchPolicy,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthEndpoint>,
        store: TokenStore,
        navigator: Arc<dyn Navigator>,
        policy: DispatchPolicy,
    ) -> Self {
        Dispatcher {
            transport,
            auth,
            store,
            coordinator: Arc::new(RefreshCoordinator::new()),
            navigator,
            policy,
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Sends `request` and returns the decoded JSON body (`null` when empty).
    pub async fn send(&self, request: ApiRequest) -> Result<Value, DispatchError> {
        let span = debug_span!(
            "dispatch",
            http_method = %request.method,
            url_path = request.path.as_str(),
            correlation_id = request.correlation_id.as_str(),
        );
        self.send_inner(request).instrument(span).await
    }

    /// Sends `request` and unwraps the `data` of its `{ success, data }` envelope.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, DispatchError> {
        let body = self.send(request).await?;
        Ok(unwrap_envelope(body)?)
    }

    /// Sends `request`, only checking the envelope's `success` flag.
    pub async fn execute(&self, request: ApiRequest) -> Result<(), DispatchError> {
        let body = self.send(request).await?;
        Ok(check_envelope(&body)?)
    }

    async fn send_inner(&self, mut request: ApiRequest) -> Result<Value, DispatchError> {
        let exempt = self.policy.is_unauthenticated(&request.path);
        if !exempt {
            self.refresh_proactively().await?;
        }
        self.authorize(&mut request, exempt);

        match self.exchange(&request).await {
            Ok(body) => Ok(body),
            Err(err) => self.recover(request, err, exempt).await,
        }
    }

    fn authorize(&self, request: &mut ApiRequest, exempt: bool) {
        if exempt {
            // Login and refresh must never carry a token from an earlier session.
            request.bearer = None;
        } else if let Some(token) = self.store.access_token() {
            request.bearer = Some(token);
        }
    }

    async fn exchange(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.transport.send(request).await?.into_json()
    }

    async fn recover(
        &self,
        mut request: ApiRequest,
        err: ApiError,
        exempt: bool,
    ) -> Result<Value, DispatchError> {
        if !err.is_unauthorized() || exempt {
            return Err(err.into());
        }
        if request.retried {
            debug!("401 on a replayed request; giving up");
            return Err(err.into());
        }
        request.retried = true;

        // A refresh finished while this request was on the wire.
        if let Some(current) = self.store.access_token() {
            if request.bearer.as_deref() != Some(current.as_str()) {
                debug!("Token changed since the request was sent; replaying");
                request.bearer = Some(current);
                return Ok(self.exchange(&request).await?);
            }
        }

        let access_token = match self.refresh_protocol().await {
            RefreshOutcome::Refreshed { access_token } => access_token,
            RefreshOutcome::Failed { error } => {
                return Err(DispatchError::SessionExpired { cause: error });
            }
            RefreshOutcome::SessionExpired => {
                return Err(DispatchError::SessionExpired { cause: err });
            }
            RefreshOutcome::Aborted => return Err(ApiError::RefreshAborted.into()),
        };

        debug!("Replaying request with refreshed token");
        request.bearer = Some(access_token);
        Ok(self.exchange(&request).await?)
    }

    async fn refresh_proactively(&self) -> Result<(), DispatchError> {
        let Some(buffer) = self.policy.proactive_refresh_buffer_seconds else {
            return Ok(());
        };
        if self.store.access_token().is_none()
            || self.store.refresh_token().is_none()
            || !self.store.is_expired(i64::try_from(buffer).unwrap_or(i64::MAX))
        {
            return Ok(());
        }

        debug!("Access token expires within {}s; refreshing first", buffer);
        match self.refresh_protocol().await {
            RefreshOutcome::Refreshed { .. } => Ok(()),
            RefreshOutcome::Failed { error } => Err(DispatchError::SessionExpired { cause: error }),
            RefreshOutcome::SessionExpired => Err(DispatchError::SessionExpired {
                cause: ApiError::NoRefreshToken,
            }),
            RefreshOutcome::Aborted => Err(ApiError::RefreshAborted.into()),
        }
    }

    async fn refresh_protocol(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.store.refresh_token() else {
            warn!(
                event_name = "client.session.expired",
                event_domain = "client",
                "No refresh token available; ending session"
            );
            self.end_session();
            return RefreshOutcome::SessionExpired;
        };

        let lease = match self.coordinator.admit() {
            Admission::Leader(lease) => lease,
            Admission::Follower(ticket) => {
                debug!(
                    queued = self.coordinator.pending(),
                    "Refresh already in flight; waiting for it"
                );
                return match ticket.wait().await {
                    Ok(access_token) => RefreshOutcome::Refreshed { access_token },
                    Err(ApiError::RefreshAborted) => RefreshOutcome::Aborted,
                    Err(error) => RefreshOutcome::Failed { error },
                };
            }
        };

        info!(
            event_name = "client.refresh.started",
            event_domain = "client",
            "Refreshing access token"
        );
        let timeout = self.policy.refresh_timeout;
        let result = match tokio::time::timeout(timeout, self.auth.refresh(&refresh_token)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::RefreshTimeout(timeout)),
        };
        let result = result.and_then(|response| {
            self.store.apply_refresh(&response)?;
            Ok(response.access_token)
        });

        match result {
            Ok(access_token) => {
                let replayed = lease.settle(Ok(access_token.clone()));
                info!(
                    event_name = "client.refresh.succeeded",
                    event_domain = "client",
                    replayed,
                    "Access token refreshed"
                );
                RefreshOutcome::Refreshed { access_token }
            }
            Err(error) => {
                // Tear down before releasing waiters so no one can start a
                // new refresh with the rejected refresh token.
                self.end_session();
                let rejected = lease.settle(Err(error.clone()));
                warn!(
                    event_name = "client.refresh.failed",
                    event_domain = "client",
                    rejected,
                    error = %error,
                    "Token refresh failed; ending session"
                );
                RefreshOutcome::Failed { error }
            }
        }
    }

    /// Forced logout: wipe the session and send the user to the login route.
    fn end_session(&self) {
        if let Err(e) = self.store.clear_session() {
            error!("Failed to clear session storage: {}", e);
        }
        self.navigator.navigate(Route::Login);
    }
}
