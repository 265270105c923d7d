use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::client::{check_envelope, unwrap_envelope, ApiError, ApiRequest, Transport};
use crate::config::AuthConfig;
use crate::models::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};

/// The backend's authentication operations.
///
/// Calls made through this trait never go through the dispatcher: login and
/// refresh must not carry a bearer token, and their failures must not start a
/// refresh of their own.
#[async_trait]
pub trait AuthEndpoint: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST /auth/refresh`.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError>;

    /// `POST /auth/logout`, revoking the session server side.
    async fn logout(&self, access_token: &str) -> Result<(), ApiError>;
}

/// `AuthEndpoint` over HTTP, sharing the dispatcher's transport.
pub struct HttpAuthEndpoint {
    transport: Arc<dyn Transport>,
    login_path: String,
    refresh_path: String,
    logout_path: String,
}

impl HttpAuthEndpoint {
    pub fn new(transport: Arc<dyn Transport>, config: &AuthConfig) -> Self {
        HttpAuthEndpoint {
            transport,
            login_path: config.login_path.clone(),
            refresh_path: config.refresh_path.clone(),
            logout_path: config.logout_path.clone(),
        }
    }
}

#[async_trait]
impl AuthEndpoint for HttpAuthEndpoint {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        debug!("Logging in as '{}'", credentials.email);
        let request = ApiRequest::post(&self.login_path).with_json(credentials)?;
        let body = self.transport.send(&request).await?.into_json()?;
        unwrap_envelope(body)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let request = ApiRequest::post(&self.refresh_path).with_json(&RefreshRequest {
            refresh_token: refresh_token.to_string(),
        })?;
        let body = self.transport.send(&request).await?.into_json()?;
        unwrap_envelope(body)
    }

    async fn logout(&self, access_token: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post(&self.logout_path).with_bearer(access_token);
        let body = self.transport.send(&request).await?.into_json()?;
        check_envelope(&body)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::{Matcher, Server};

    use super::*;
    use crate::client::HttpTransport;

    fn endpoint(url: &str) -> HttpAuthEndpoint {
        let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();
        HttpAuthEndpoint::new(Arc::new(transport), &AuthConfig::default())
    }

    #[tokio::test]
    async fn test_login_unwraps_envelope() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/login")
            .match_header("content-type", "application/json")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(serde_json::json!({
                "email": "ada@example.com",
                "password": "secret"
            })))
            .with_status(200)
            .with_body(
                r#"{"success":true,"data":{"accessToken":"a1","refreshToken":"r1","expiresIn":3600,
                    "user":{"id":"u1","fullName":"Ada","email":"ada@example.com","role":"ADMIN"}}}"#,
            )
            .create_async()
            .await;

        let response = endpoint(&server.url())
            .login(&LoginRequest {
                email: "ada@example.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(response.access_token, "a1");
        assert_eq!(response.user.id, "u1");
    }

    #[tokio::test]
    async fn test_login_error_keeps_backend_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_body(r#"{"success":false,"message":"Invalid email or password"}"#)
            .create_async()
            .await;

        let err = endpoint(&server.url())
            .login(&LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.payload_message(), Some("Invalid email or password"));
    }

    #[tokio::test]
    async fn test_refresh_posts_refresh_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/refresh")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(serde_json::json!({ "refreshToken": "r1" })))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"accessToken":"a2","expiresIn":900}}"#)
            .create_async()
            .await;

        let response = endpoint(&server.url()).refresh("r1").await.unwrap();
        m.assert_async().await;
        assert_eq!(response.access_token, "a2");
        assert_eq!(response.refresh_token, None);
        assert_eq!(response.expires_in, Some(900));
    }

    #[tokio::test]
    async fn test_logout_sends_bearer() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/logout")
            .match_header("authorization", "Bearer a1")
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        endpoint(&server.url()).logout("a1").await.unwrap();
        m.assert_async().await;
    }
}
