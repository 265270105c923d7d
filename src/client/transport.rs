use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::error::ApiError;
use super::request::ApiRequest;
use crate::models::Envelope;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Status and raw body of a completed HTTP exchange.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        TransportResponse {
            status,
            body: body.into(),
        }
    }

    /// 2xx bodies become JSON (an empty body is `null`); any other status
    /// becomes `ApiError::Status` carrying the payload's `message`.
    pub fn into_json(self) -> Result<Value, ApiError> {
        let parsed = if self.body.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(&self.body)
        };

        if (200..300).contains(&self.status) {
            return parsed.map_err(|e| ApiError::Decode(e.to_string()));
        }

        let body = parsed.ok().filter(|v| !v.is_null());
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string);
        Err(ApiError::Status {
            status: self.status,
            message,
            body,
        })
    }
}

/// Unwraps `{ success, data }`, failing on `success: false` or a missing `data`.
pub fn unwrap_envelope<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let envelope: Envelope<T> =
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Rejected {
            message: envelope.message,
        });
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Decode("envelope has no data".to_string()))
}

/// Checks the `success` flag of a response whose `data` is not needed.
pub fn check_envelope(value: &Value) -> Result<(), ApiError> {
    match value.get("success").and_then(Value::as_bool) {
        Some(false) => Err(ApiError::Rejected {
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        _ => Ok(()),
    }
}

/// Sends a fully prepared request. Implementations do not interpret statuses;
/// only failures to complete the exchange are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse, ApiError>;
}

/// reqwest-backed transport rooted at the API base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse, ApiError> {
        let url = self.url_for(&request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(CORRELATION_ID_HEADER, &request.correlation_id);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{} {}: {}", request.method, url, e)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("failed to read response body: {}", e)))?;

        debug!(
            http_method = %request.method,
            url_path = request.path.as_str(),
            http_status = status,
            "HTTP exchange completed"
        );
        Ok(TransportResponse { status, body })
    }
}
