//! # Memoneo Crypto
//!
//! Field-level encryption for free-text diary content.
//!
//! A single passphrase per user is stretched into a key for every operation;
//! each encryption draws a fresh random nonce. The sealed value travels as one
//! string, `hex(nonce) <|> base64(ciphertext)`, next to an `encrypted` flag in
//! the surrounding JSON object.
//!
//! ## Key Types
//!
//! - [`CipherService`]: derive / encrypt / decrypt
//! - [`EncryptedField`]: wire codec for sealed text
//! - [`Passphrase`]: redacting, zeroizing passphrase wrapper
//!
//! ## Example
//!
//! ```rust,ignore
//! use memoneo_crypto::{CipherService, Passphrase};
//!
//! let cipher = CipherService::default();
//! let key = Passphrase::new("my diary key");
//!
//! let sealed = cipher.encrypt("Slept well.", &key).unwrap();
//! let wire = sealed.to_string();
//! assert_eq!(cipher.decrypt(&wire, &key).unwrap(), "Slept well.");
//! ```

pub mod cipher;
pub mod error;
pub mod field;
pub mod secret;

// Re-exports
pub use cipher::{CipherConfig, CipherService, DEFAULT_ITERATIONS, DEFAULT_SALT, KEY_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use field::{EncryptedField, FIELD_SEPARATOR, NONCE_SIZE};
pub use secret::{DerivedKey, Passphrase};
