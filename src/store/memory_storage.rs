use std::collections::HashMap;
use std::sync::RwLock;

use super::{Storage, StoreError};

/// Process-local storage. Used for tests and for `storage.type: memory`.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(keys.iter().map(|k| entries.get(*k).cloned()).collect())
    }

    fn set_many(&self, new_entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for (key, value) in new_entries {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set("a", "1".into()).unwrap();
        storage.set_many(&[("b", "2".into()), ("c", "3".into())]).unwrap();
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(
            storage.get_many(&["a", "missing", "c"]).unwrap(),
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );

        storage.remove_many(&["a", "b"]).unwrap();
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.set("a", "1".into()).unwrap();
        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(storage.is_empty());
    }
}
