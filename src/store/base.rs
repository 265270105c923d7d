use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use tracing::info;

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::StorageConfig;

/// File name of the session document inside the data directory.
pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session storage at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode session value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no platform data directory available; set storage.path explicitly")]
    NoDataDir,
}

/// Durable string key-value storage, the equivalent of a browser's localStorage.
///
/// Multi-key operations are atomic: a concurrent reader sees either all of the
/// entries of a `set_many`/`remove_many` call or none of them.
pub trait Storage: Send + Sync {
    /// Reads several keys under one consistent snapshot.
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError>;
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError>;
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;
    /// Removes every key. Clearing empty storage is a no-op.
    fn clear(&self) -> Result<(), StoreError>;
    fn backend_name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_many(&[key])?.pop().flatten())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }
}

/// Creates a concrete storage implementation based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, StoreError> {
    match config {
        StorageConfig::File { path } => {
            let path = match path {
                Some(p) => p.clone(),
                None => default_session_path()?,
            };
            let storage = FileStorage::open(&path)?;
            info!("Using file session storage at {}", path.display());
            Ok(Arc::new(storage))
        }
        StorageConfig::Memory => {
            info!("Using in-memory session storage; the session ends with the process.");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

/// `<platform data dir>/session.json`, e.g. `~/.local/share/nexus-admin/session.json`.
pub fn default_session_path() -> Result<PathBuf, StoreError> {
    ProjectDirs::from("com", "Nexus", "nexus-admin")
        .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
        .ok_or(StoreError::NoDataDir)
}
