use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;

/// One logical call to the backend. A replay after a token refresh reuses the
/// same `ApiRequest`, so it keeps its correlation id and its `retried` mark.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/users`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Sent as `Authorization: Bearer <token>` when set.
    pub bearer: Option<String>,
    /// Set once the request has been replayed after a refresh. Never replayed twice.
    pub retried: bool,
    pub correlation_id: String,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            bearer: None,
            retried: false,
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?);
        Ok(self)
    }

    /// Flattens a serializable struct into query pairs. `None` fields are
    /// skipped, sequences are joined with commas.
    pub fn with_query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(params).map_err(|e| ApiError::Encode(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(ApiError::Encode(
                "query parameters must serialize to an object".to_string(),
            ));
        };
        for (key, value) in map {
            if let Some(rendered) = render_query_value(value) {
                self.query.push((key, rendered));
            }
        }
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Asks intermediaries not to serve a cached listing.
    pub fn no_cache(self) -> Self {
        self.with_header("Cache-Control", "no-cache")
            .with_header("Pragma", "no-cache")
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn render_query_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(render_query_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(","))
            }
        }
        other => Some(other.to_string()),
    }
}
