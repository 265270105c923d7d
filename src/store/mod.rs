pub mod base;
pub mod file_storage;
pub mod memory_storage;
pub mod token_store;

// Re-export the primary Store items so code outside can do
// "use crate::store::{Storage, TokenStore, create_storage};"
pub use base::{create_storage, Storage, StoreError};
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use token_store::{is_expired_at, TokenStore};
