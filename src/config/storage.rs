use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the session (tokens, expiry, cached profile) is persisted.
/// We differentiate the backends via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// A JSON file on disk. Without a `path`, the platform data directory is used.
    #[serde(rename = "file")]
    File {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Process memory only; the session is lost on exit.
    #[serde(rename = "memory")]
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File { path: None }
    }
}
