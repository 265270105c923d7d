#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use nexus_admin::config::{load_config_from_str, ConfigV1};
use nexus_admin::navigation::RouteHistory;
use nexus_admin::startup::build_state;
use nexus_admin::state::AppState;

pub const LOGIN_OK: &str = r#"{
    "success": true,
    "data": {
        "accessToken": "a1",
        "refreshToken": "r1",
        "expiresIn": 3600,
        "user": {
            "id": "u1",
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "role": "SUPER_ADMIN"
        }
    }
}"#;

pub const EMPTY_PAGE: &str =
    r#"{"success":true,"data":{"items":[],"meta":{"page":1,"totalPages":1,"limit":10,"total":0}}}"#;

pub const UNAUTHORIZED: &str = r#"{"success":false,"message":"Token expired"}"#;

pub fn test_config(base_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
api:
  base_url: "{}"
  timeout_in_ms: 5000
auth:
  refresh_timeout_in_ms: 5000
storage:
  type: memory
logging:
  level: debug
"#,
        base_url
    );
    load_config_from_str(&yaml).expect("test config should parse")
}

pub fn file_config(base_url: &str, session_file: &Path) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
api:
  base_url: "{}"
storage:
  type: file
  path: "{}"
"#,
        base_url,
        session_file.display()
    );
    load_config_from_str(&yaml).expect("test config should parse")
}

pub fn build(config: ConfigV1) -> (AppState, Arc<RouteHistory>) {
    let history = Arc::new(RouteHistory::new());
    let state = build_state(Arc::new(config), history.clone()).expect("state should build");
    (state, history)
}

pub async fn mock_login(server: &mut mockito::Server) -> mockito::Mock {
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(LOGIN_OK)
        .create_async()
        .await
}

/// Builds the state against `server` and signs in as u1 with tokens a1/r1.
pub async fn signed_in(server: &mut mockito::Server) -> (AppState, Arc<RouteHistory>) {
    let (state, history) = build(test_config(&server.url()));
    let login = mock_login(server).await;
    state
        .session
        .login("ada@example.com", "secret")
        .await
        .expect("login should succeed");
    login.remove_async().await;
    history.take();
    (state, history)
}
