//! Error types for the sync runner

use memoneo_core::{Failure, FailureKind, HttpError, StorageError, ValidationError};
use memoneo_crypto::CryptoError;
use thiserror::Error;

/// Errors raised while running a request
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport or HTTP-layer failure, message taken from the error body
    #[error("Network error: {0}")]
    Network(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("No auth token stored")]
    AuthMissing,

    /// Caller bug; returned from `submit`, never sent as a response
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The server answered, but not with the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// A worker or reply channel closed unexpectedly
    #[error("Channel error: {0}")]
    Channel(String),
}

impl From<HttpError> for SyncError {
    fn from(err: HttpError) -> Self {
        SyncError::Network(err.human_message())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Storage(StorageError::from(err))
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(err: tokio::task::JoinError) -> Self {
        SyncError::Channel(format!("Blocking task failed: {}", err))
    }
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Crypto(_) => FailureKind::Crypto,
            SyncError::AuthMissing => FailureKind::AuthMissing,
            SyncError::NotFound(_) => FailureKind::NotFound,
            SyncError::Storage(_) => FailureKind::Storage,
            // Validation is rejected before scheduling; the rest are
            // boundary-side failures from the caller's point of view
            SyncError::Network(_)
            | SyncError::Validation(_)
            | SyncError::Decode(_)
            | SyncError::Channel(_) => FailureKind::Network,
        }
    }

    /// Render as the plain-text failure carried by a response.
    ///
    /// Network failures keep the server's message verbatim.
    pub fn to_failure(&self) -> Failure {
        let message = match self {
            SyncError::Network(message) => message.clone(),
            other => other.to_string(),
        };
        Failure::new(self.kind(), message)
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
