//! Error types for memoneo-crypto

use thiserror::Error;

/// Errors that can occur during text field encryption
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Malformed encrypted field: {0}")]
    MalformedField(String),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
