//! Wire encoding of encrypted text fields
//!
//! An [`EncryptedField`] travels as a single string:
//!
//! ```text
//! <hex nonce><|><base64 ciphertext>
//! ```
//!
//! Neither the hex nor the standard base64 alphabet contains `<`, `|` or `>`,
//! so the separator can never appear inside either half.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// Nonce size for ChaCha20-Poly1305 (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Delimiter between the nonce and ciphertext encodings
pub const FIELD_SEPARATOR: &str = "<|>";

/// A sealed text value: nonce plus authenticated ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedField {
    /// Nonce used for this encryption, fresh per call
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with trailing authentication tag
    pub ciphertext: Vec<u8>,
}

impl EncryptedField {
    pub fn new(nonce: [u8; NONCE_SIZE], ciphertext: Vec<u8>) -> Self {
        Self { nonce, ciphertext }
    }

    /// Encode to the `nonce<|>ciphertext` wire string
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            hex::encode(self.nonce),
            FIELD_SEPARATOR,
            STANDARD.encode(&self.ciphertext)
        )
    }

    /// Parse the `nonce<|>ciphertext` wire string
    pub fn decode(wire: &str) -> Result<Self, CryptoError> {
        let (nonce_part, cipher_part) = wire
            .split_once(FIELD_SEPARATOR)
            .ok_or_else(|| CryptoError::MalformedField("missing separator".to_string()))?;

        if cipher_part.contains(FIELD_SEPARATOR) {
            return Err(CryptoError::MalformedField(
                "more than one separator".to_string(),
            ));
        }

        let nonce_bytes =
            hex::decode(nonce_part).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        if nonce_bytes.len() != NONCE_SIZE {
            return Err(CryptoError::MalformedField(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                nonce_bytes.len()
            )));
        }

        let ciphertext = STANDARD
            .decode(cipher_part)
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        if ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::MalformedField(format!(
                "ciphertext shorter than {} byte tag",
                TAG_SIZE
            )));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&nonce_bytes);

        Ok(Self { nonce, ciphertext })
    }
}

impl fmt::Display for EncryptedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for EncryptedField {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for EncryptedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for EncryptedField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = String::deserialize(deserializer)?;
        Self::decode(&wire).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedField {
        EncryptedField::new([7; NONCE_SIZE], vec![1; TAG_SIZE + 4])
    }

    #[test]
    fn test_encode_shape() {
        let wire = sample().encode();
        let (nonce, rest) = wire.split_once(FIELD_SEPARATOR).unwrap();
        assert_eq!(nonce, "07".repeat(NONCE_SIZE));
        assert!(!rest.is_empty());
    }

    #[test]
    fn test_decode_parses_encoded() {
        let field = sample();
        let parsed: EncryptedField = field.to_string().parse().unwrap();
        assert_eq!(parsed, field);
    }

    #[test]
    fn test_missing_separator() {
        let err = EncryptedField::decode("no-separator-here").unwrap_err();
        assert!(matches!(err, CryptoError::MalformedField(_)));
    }

    #[test]
    fn test_bad_hex_nonce() {
        let err = EncryptedField::decode("zz<|>AAAA").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidEncoding(_)));
    }

    #[test]
    fn test_short_nonce() {
        let err = EncryptedField::decode("0102<|>AAAAAAAAAAAAAAAAAAAAAA==").unwrap_err();
        assert!(matches!(err, CryptoError::MalformedField(_)));
    }

    #[test]
    fn test_ciphertext_shorter_than_tag() {
        let wire = format!("{}<|>{}", "00".repeat(NONCE_SIZE), STANDARD.encode([1u8; 4]));
        let err = EncryptedField::decode(&wire).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedField(_)));
    }

    #[test]
    fn test_double_separator_rejected() {
        let wire = format!("{}<|>AAAA<|>BBBB", "00".repeat(NONCE_SIZE));
        assert!(EncryptedField::decode(&wire).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let field = sample();
        let json = serde_json::to_string(&field).unwrap();
        assert!(json.starts_with('"'));
        let back: EncryptedField = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);

        assert!(serde_json::from_str::<EncryptedField>("\"plain text\"").is_err());
    }
}
