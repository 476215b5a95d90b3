//! In-memory secure storage, for tests and headless runs

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use memoneo_core::{SecureStorage, StorageError};
use tracing::trace;

/// [`SecureStorage`] backed by a `DashMap`
#[derive(Debug, Default)]
pub struct InMemorySecureStorage {
    items: DashMap<String, String>,
    /// Simulates a locked or missing keychain
    unavailable: AtomicBool,
}

impl InMemorySecureStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following read and write fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl SecureStorage for InMemorySecureStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::ReadFailed("secure storage unavailable".to_string()));
        }
        trace!(key, "Secure storage read");
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed("secure storage unavailable".to_string()));
        }
        trace!(key, "Secure storage write");
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set() {
        let storage = InMemorySecureStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.get_item("k").await.unwrap(), None);

        storage.set_item("k", "v").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let storage = InMemorySecureStorage::new();
        storage.set_unavailable(true);
        assert!(storage.set_item("k", "v").await.is_err());
        storage.set_unavailable(false);
        assert!(storage.set_item("k", "v").await.is_ok());
    }
}
