//! Boundaries to the outside world
//!
//! The sync core never talks to the network or the platform keychain
//! directly. It goes through these two traits so tests can swap in
//! in-memory implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{HttpError, StorageError};

/// Request headers, name to value
pub type Headers = BTreeMap<String, String>;

/// JSON HTTP client relative to the diary API base URL
#[async_trait]
pub trait HttpBoundary: Send + Sync {
    /// GET `path`, returning the decoded JSON body on a success status
    async fn get(&self, path: &str, headers: &Headers) -> Result<Value, HttpError>;

    /// POST `body` to `path`, returning the decoded JSON body on a success status
    async fn post(&self, path: &str, body: &Value, headers: &Headers) -> Result<Value, HttpError>;
}

/// Platform secure key-value storage
#[async_trait]
pub trait SecureStorage: Send + Sync {
    /// Read a value; `None` if the slot was never written
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, overwriting unconditionally
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
