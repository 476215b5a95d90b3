//! Secure-storage accessor for the two persisted secrets
//!
//! The auth token and the content-encryption passphrase live in separate
//! secure storage slots. This type only reads and writes them; it holds no
//! cryptographic logic and caches nothing.

use std::sync::Arc;

use memoneo_core::{SecureStorage, StorageError};
use memoneo_crypto::Passphrase;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default slot for the auth token
pub const DEFAULT_AUTH_TOKEN_KEY: &str = "memoneo.auth.hash";

/// Default slot for the content-encryption passphrase
pub const DEFAULT_ENCRYPTION_KEY_KEY: &str = "memoneo.text.key";

/// Names of the secure storage slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureStoreKeys {
    pub auth_token: String,
    pub encryption_key: String,
}

impl Default for SecureStoreKeys {
    fn default() -> Self {
        Self {
            auth_token: DEFAULT_AUTH_TOKEN_KEY.to_string(),
            encryption_key: DEFAULT_ENCRYPTION_KEY_KEY.to_string(),
        }
    }
}

/// Reads and writes the auth token and content passphrase
pub struct KeyStore<S: SecureStorage> {
    storage: Arc<S>,
    keys: SecureStoreKeys,
}

impl<S: SecureStorage> Clone for KeyStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            keys: self.keys.clone(),
        }
    }
}

impl<S: SecureStorage> KeyStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_keys(storage, SecureStoreKeys::default())
    }

    pub fn with_keys(storage: Arc<S>, keys: SecureStoreKeys) -> Self {
        Self { storage, keys }
    }

    pub fn keys(&self) -> &SecureStoreKeys {
        &self.keys
    }

    /// The content passphrase; `None` before onboarding
    pub async fn get_key(&self) -> Result<Option<Passphrase>, StorageError> {
        let value = self.storage.get_item(&self.keys.encryption_key).await?;
        Ok(value.filter(|v| !v.is_empty()).map(Passphrase::new))
    }

    /// Persist the content passphrase, overwriting any previous one
    pub async fn set_key(&self, passphrase: &Passphrase) -> Result<(), StorageError> {
        debug!(slot = %self.keys.encryption_key, "Storing content passphrase");
        self.storage
            .set_item(&self.keys.encryption_key, passphrase.expose())
            .await
    }

    /// The persisted auth token; an empty slot counts as absent
    pub async fn get_auth_token(&self) -> Result<Option<String>, StorageError> {
        let value = self.storage.get_item(&self.keys.auth_token).await?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    pub async fn set_auth_token(&self, token: &str) -> Result<(), StorageError> {
        debug!(slot = %self.keys.auth_token, "Storing auth token");
        self.storage.set_item(&self.keys.auth_token, token).await
    }

    /// Forget the auth token
    pub async fn clear_auth_token(&self) -> Result<(), StorageError> {
        self.set_auth_token("").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySecureStorage;

    fn key_store() -> (Arc<InMemorySecureStorage>, KeyStore<InMemorySecureStorage>) {
        let storage = Arc::new(InMemorySecureStorage::new());
        (Arc::clone(&storage), KeyStore::new(storage))
    }

    #[tokio::test]
    async fn test_key_absent_before_onboarding() {
        let (_, store) = key_store();
        assert!(store.get_key().await.unwrap().is_none());
        assert!(store.get_auth_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_key_overwrites() {
        let (storage, store) = key_store();
        store.set_key(&Passphrase::new("first")).await.unwrap();
        store.set_key(&Passphrase::new("second")).await.unwrap();

        assert_eq!(store.get_key().await.unwrap().unwrap().expose(), "second");
        assert_eq!(
            storage.get_item(DEFAULT_ENCRYPTION_KEY_KEY).await.unwrap(),
            Some("second".to_string())
        );
    }

    #[tokio::test]
    async fn test_clear_auth_token() {
        let (_, store) = key_store();
        store.set_auth_token("token-1").await.unwrap();
        assert_eq!(store.get_auth_token().await.unwrap().as_deref(), Some("token-1"));

        store.clear_auth_token().await.unwrap();
        assert!(store.get_auth_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_slot_names() {
        let storage = Arc::new(InMemorySecureStorage::new());
        let keys = SecureStoreKeys {
            auth_token: "a".to_string(),
            encryption_key: "k".to_string(),
        };
        let store = KeyStore::with_keys(Arc::clone(&storage), keys);
        store.set_auth_token("t").await.unwrap();

        assert_eq!(storage.get_item("a").await.unwrap(), Some("t".to_string()));
        assert!(storage.get_item(DEFAULT_AUTH_TOKEN_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (storage, store) = key_store();
        storage.set_unavailable(true);
        assert!(matches!(
            store.get_key().await,
            Err(StorageError::ReadFailed(_))
        ));
    }
}
