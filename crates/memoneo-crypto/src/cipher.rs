//! Cipher service for sensitive diary text
//!
//! Every operation stretches the passphrase with PBKDF2-HMAC-SHA512 under a
//! fixed salt and iteration count, then seals the UTF-8 text with
//! ChaCha20-Poly1305 under a fresh random nonce.
//!
//! The AEAD tag means a wrong passphrase or a tampered field fails with
//! [`CryptoError::DecryptionFailed`] instead of yielding garbage plaintext.

use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit},
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use tracing::trace;

use crate::error::{CryptoError, CryptoResult};
use crate::field::{EncryptedField, NONCE_SIZE};
use crate::secret::{DerivedKey, Passphrase};

/// Default key-stretching salt
pub const DEFAULT_SALT: &str = "memoneo-text-encryption";

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 5_000;

/// Key size expected by ChaCha20-Poly1305 (32 bytes)
pub const KEY_SIZE: usize = 32;

/// Key-derivation constants. Configuration, never per-call input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Fixed salt for PBKDF2
    pub salt: String,
    /// PBKDF2 rounds
    pub iterations: u32,
    /// Derived key length in bytes
    pub key_len: usize,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_string(),
            iterations: DEFAULT_ITERATIONS,
            key_len: KEY_SIZE,
        }
    }
}

impl CipherConfig {
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_key_len(mut self, key_len: usize) -> Self {
        self.key_len = key_len;
        self
    }
}

/// Stateless encrypt/decrypt of text fields
#[derive(Debug, Clone, Default)]
pub struct CipherService {
    config: CipherConfig,
}

impl CipherService {
    pub fn new(config: CipherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Stretch a passphrase into key bytes.
    ///
    /// Deterministic: the same passphrase always yields the same key under
    /// the same config.
    pub fn derive_key(&self, passphrase: &Passphrase) -> CryptoResult<DerivedKey> {
        if self.config.iterations == 0 {
            return Err(CryptoError::KeyDerivationFailed(
                "iteration count must be positive".to_string(),
            ));
        }
        if self.config.key_len == 0 {
            return Err(CryptoError::InvalidKey(
                "derived key length must be positive".to_string(),
            ));
        }

        let mut output = vec![0u8; self.config.key_len];
        pbkdf2_hmac::<Sha512>(
            passphrase.expose().as_bytes(),
            self.config.salt.as_bytes(),
            self.config.iterations,
            &mut output,
        );

        Ok(DerivedKey::new(output))
    }

    /// Derive the key and seal `plaintext` under a fresh nonce
    pub fn encrypt(&self, plaintext: &str, passphrase: &Passphrase) -> CryptoResult<EncryptedField> {
        let key = self.derive_key(passphrase)?;
        Self::encrypt_with_key(plaintext, &key)
    }

    /// Parse a wire string, derive the key and open it
    pub fn decrypt(&self, wire: &str, passphrase: &Passphrase) -> CryptoResult<String> {
        let field = EncryptedField::decode(wire)?;
        let key = self.derive_key(passphrase)?;
        Self::decrypt_with_key(&field, &key)
    }

    /// Seal with an already derived key (batch callers derive once)
    pub fn encrypt_with_key(plaintext: &str, key: &DerivedKey) -> CryptoResult<EncryptedField> {
        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        trace!(len = plaintext.len(), "Sealed text field");

        Ok(EncryptedField::new(nonce_bytes, ciphertext))
    }

    /// Open with an already derived key
    pub fn decrypt_with_key(field: &EncryptedField, key: &DerivedKey) -> CryptoResult<String> {
        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        let nonce = Nonce::from_slice(&field.nonce);

        let plaintext = cipher
            .decrypt(nonce, field.ciphertext.as_slice())
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FIELD_SEPARATOR;

    /// Low iteration count keeps the suite fast
    fn service() -> CipherService {
        CipherService::new(CipherConfig::default().with_iterations(16))
    }

    fn key() -> Passphrase {
        Passphrase::new("diary passphrase")
    }

    #[test]
    fn test_default_config() {
        let config = CipherConfig::default();
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.key_len, KEY_SIZE);
        assert_eq!(config.salt, DEFAULT_SALT);
    }

    #[test]
    fn test_round_trip() {
        let cipher = service();
        for text in ["Hello", "a", "Grüße aus Köln 🌧", "line one\nline two\ttabbed", " "] {
            let sealed = cipher.encrypt(text, &key()).unwrap();
            let opened = cipher.decrypt(&sealed.encode(), &key()).unwrap();
            assert_eq!(opened, text);
        }
    }

    #[test]
    fn test_round_trip_long_text() {
        let cipher = service();
        let text = "Today was long. ".repeat(500);
        let sealed = cipher.encrypt(&text, &key()).unwrap();
        assert_eq!(cipher.decrypt(&sealed.to_string(), &key()).unwrap(), text);
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let cipher = service();
        let first = cipher.encrypt("same text", &key()).unwrap();
        let second = cipher.encrypt("same text", &key()).unwrap();

        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.encode(), second.encode());
    }

    #[test]
    fn test_derive_key_deterministic() {
        let cipher = service();
        let a = cipher.derive_key(&key()).unwrap();
        let b = cipher.derive_key(&key()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.len(), KEY_SIZE);

        let other = cipher.derive_key(&Passphrase::new("other")).unwrap();
        assert_ne!(a.as_bytes(), other.as_bytes());
    }

    #[test]
    fn test_salt_changes_key() {
        let a = service().derive_key(&key()).unwrap();
        let b = CipherService::new(CipherConfig::default().with_iterations(16).with_salt("pepper"))
            .derive_key(&key())
            .unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_malformed_input_fails() {
        let err = service().decrypt("no-separator-here", &key()).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedField(_)));
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher = service();
        let sealed = cipher.encrypt("secret entry", &key()).unwrap();
        let err = cipher
            .decrypt(&sealed.encode(), &Passphrase::new("wrong"))
            .unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = service();
        let mut sealed = cipher.encrypt("secret entry", &key()).unwrap();
        sealed.ciphertext[0] ^= 0x01;
        assert!(cipher.decrypt(&sealed.encode(), &key()).is_err());
    }

    #[test]
    fn test_rejected_key_length() {
        let cipher = CipherService::new(CipherConfig::default().with_iterations(16).with_key_len(16));
        let err = cipher.encrypt("text", &key()).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey(_)));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let cipher = CipherService::new(CipherConfig::default().with_iterations(0));
        assert!(matches!(
            cipher.derive_key(&key()),
            Err(CryptoError::KeyDerivationFailed(_))
        ));
    }

    #[test]
    fn test_batch_helpers_share_key() {
        let cipher = service();
        let derived = cipher.derive_key(&key()).unwrap();
        let sealed = CipherService::encrypt_with_key("batched", &derived).unwrap();
        assert!(sealed.encode().contains(FIELD_SEPARATOR));
        assert_eq!(cipher.decrypt(&sealed.encode(), &key()).unwrap(), "batched");
        assert_eq!(
            CipherService::decrypt_with_key(&sealed, &derived).unwrap(),
            "batched"
        );
    }
}
