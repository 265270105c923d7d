use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;

/// Environment variables with this prefix override the YAML file.
/// Nested keys are separated by `__`, e.g. `NEXUS_ADMIN_API__BASE_URL`.
pub const ENV_PREFIX: &str = "NEXUS_ADMIN_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

impl Default for Config {
    fn default() -> Self {
        Config::ConfigV1(ConfigV1::default())
    }
}

/// Main config for v1.0.0: backend location, auth endpoints, session storage and logging.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Load config from a YAML file, layered over built-in defaults and under
/// `NEXUS_ADMIN_*` environment overrides. A missing file is not an error.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, ConfigError> {
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    extract(figment)
}

/// Parse a configuration from an in-memory YAML document.
pub fn load_config_from_str(yaml: &str) -> Result<ConfigV1, ConfigError> {
    let figment = Figment::from(Serialized::defaults(Config::default())).merge(Yaml::string(yaml));
    extract(figment)
}

fn extract(figment: Figment) -> Result<ConfigV1, ConfigError> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Where the backend lives and how long a single HTTP exchange may take.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_in_ms: default_timeout_in_ms(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_ms)
    }
}

/// Auth endpoint paths and the refresh policy of the request dispatcher.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct AuthConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    #[serde(default = "default_me_path")]
    pub me_path: String,
    /// Requests whose path contains any of these never carry a bearer token
    /// and never trigger a refresh on failure.
    #[serde(default = "default_unauthenticated_paths")]
    pub unauthenticated_paths: Vec<String>,
    #[serde(default = "default_refresh_timeout_in_ms")]
    pub refresh_timeout_in_ms: u64,
    /// When set, a request refreshes first if the access token expires within this many seconds.
    #[serde(default)]
    pub proactive_refresh_buffer_seconds: Option<u64>,
    #[serde(default = "default_revoke_on_logout")]
    pub revoke_on_logout: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            me_path: default_me_path(),
            unauthenticated_paths: default_unauthenticated_paths(),
            refresh_timeout_in_ms: default_refresh_timeout_in_ms(),
            proactive_refresh_buffer_seconds: None,
            revoke_on_logout: default_revoke_on_logout(),
        }
    }
}

impl AuthConfig {
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_in_ms)
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_in_ms() -> u64 {
    30_000
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_logout_path() -> String {
    "/auth/logout".to_string()
}

fn default_me_path() -> String {
    "/auth/me".to_string()
}

fn default_unauthenticated_paths() -> Vec<String> {
    vec![default_login_path(), default_refresh_path()]
}

fn default_refresh_timeout_in_ms() -> u64 {
    10_000
}

fn default_revoke_on_logout() -> bool {
    true
}
