use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use super::{Storage, StoreError};
use crate::models::{CredentialRecord, RefreshResponse, UserProfile};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const EXPIRES_AT_KEY: &str = "expires_at";
pub const USER_KEY: &str = "user";

const CREDENTIAL_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY];

/// Process-wide owner of the credential record and the cached user profile.
///
/// Getters never fail: a storage error is logged and reported as "absent".
/// Writers return the storage error so the calling operation fails with it.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        TokenStore { storage }
    }

    /// Writes a full credential record expiring `expires_in_seconds` from now.
    pub fn save(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in_seconds: i64,
    ) -> Result<CredentialRecord, StoreError> {
        let record = CredentialRecord {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at_epoch_ms: expiry_from_now(expires_in_seconds),
        };
        self.storage.set_many(&[
            (ACCESS_TOKEN_KEY, record.access_token.clone()),
            (REFRESH_TOKEN_KEY, record.refresh_token.clone()),
            (EXPIRES_AT_KEY, record.expires_at_epoch_ms.to_string()),
        ])?;
        debug!(
            "Saved credentials expiring at {}",
            record.expires_at_epoch_ms
        );
        Ok(record)
    }

    /// Stores the result of a refresh. The refresh token and expiry are only
    /// overwritten when the response carries them.
    pub fn apply_refresh(&self, response: &RefreshResponse) -> Result<(), StoreError> {
        let mut entries = vec![(ACCESS_TOKEN_KEY, response.access_token.clone())];
        if let Some(refresh_token) = &response.refresh_token {
            entries.push((REFRESH_TOKEN_KEY, refresh_token.clone()));
        }
        if let Some(expires_in) = response.expires_in {
            entries.push((EXPIRES_AT_KEY, expiry_from_now(expires_in).to_string()));
        }
        self.storage.set_many(&entries)
    }

    /// Removes the credential record. Idempotent.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove_many(&CREDENTIAL_KEYS)
    }

    /// Removes everything this client persisted: credentials and the cached profile.
    pub fn clear_session(&self) -> Result<(), StoreError> {
        self.storage.clear()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.read(EXPIRES_AT_KEY).and_then(|v| v.parse().ok())
    }

    /// The full record, or `None` unless all three fields are present and valid.
    pub fn credentials(&self) -> Option<CredentialRecord> {
        let values = match self.storage.get_many(&CREDENTIAL_KEYS) {
            Ok(values) => values,
            Err(e) => {
                error!("Failed to read credentials from session storage: {}", e);
                return None;
            }
        };
        match values.as_slice() {
            [Some(access_token), Some(refresh_token), Some(expires_at)] => {
                Some(CredentialRecord {
                    access_token: access_token.clone(),
                    refresh_token: refresh_token.clone(),
                    expires_at_epoch_ms: expires_at.parse().ok()?,
                })
            }
            _ => None,
        }
    }

    /// True when no expiry is stored or the token expires within `buffer_seconds`.
    pub fn is_expired(&self, buffer_seconds: i64) -> bool {
        is_expired_at(self.expires_at(), now_ms(), buffer_seconds)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.storage
            .set(USER_KEY, serde_json::to_string(profile)?)
    }

    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                error!("Cached user profile is not valid JSON: {}", e);
                None
            }
        }
    }

    pub fn backend_name(&self) -> &str {
        self.storage.backend_name()
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to read '{}' from session storage: {}", key, e);
                None
            }
        }
    }
}

/// Expiry check against an explicit clock, in epoch milliseconds.
pub fn is_expired_at(expires_at_ms: Option<i64>, now_ms: i64, buffer_seconds: i64) -> bool {
    match expires_at_ms {
        None => true,
        Some(expires_at) => {
            now_ms > expires_at.saturating_sub(buffer_seconds.saturating_mul(1000))
        }
    }
}

/// Lifetimes come from the backend; clamp instead of overflowing.
fn expiry_from_now(expires_in_seconds: i64) -> i64 {
    now_ms().saturating_add(expires_in_seconds.saturating_mul(1000))
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
