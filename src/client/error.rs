use std::time::Duration;

use serde_json::Value;

use crate::store::StoreError;

/// Everything that can go wrong with one backend exchange.
///
/// `Clone` so that a single refresh failure can be handed to every request
/// that was waiting on that refresh.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        /// The `message` field of the error payload, if any.
        message: Option<String>,
        body: Option<Value>,
    },

    #[error("unexpected response payload: {0}")]
    Decode(String),

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("backend reported failure: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    #[error("token refresh timed out after {0:?}")]
    RefreshTimeout(Duration),

    #[error("token refresh was abandoned before it settled")]
    RefreshAborted,

    #[error("no refresh token stored")]
    NoRefreshToken,

    #[error("session storage: {0}")]
    Storage(String),
}

impl ApiError {
    /// The HTTP status, for errors that came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The human-readable message the backend put in its error payload.
    pub fn payload_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } | ApiError::Rejected { message } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// The payload message, or `fallback` when the backend gave none.
    pub fn user_message(&self, fallback: &str) -> String {
        self.payload_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Storage(e.to_string())
    }
}

/// Result of a dispatched request that did not succeed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    /// Propagated unchanged; the session is still intact.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be recovered. Credentials have been wiped and the
    /// navigator was sent to the login route. `cause` is the original 401 when
    /// there was no refresh token, otherwise the refresh error.
    #[error("session expired: {cause}")]
    SessionExpired { cause: ApiError },
}

impl DispatchError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            DispatchError::Api(e) => e,
            DispatchError::SessionExpired { cause } => cause,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, DispatchError::SessionExpired { .. })
    }

    pub fn status(&self) -> Option<u16> {
        self.api_error().status()
    }
}
