//! Secret material wrappers
//!
//! Both types zero their memory on drop and never print their contents
//! through `Debug`, so they can sit inside structs that get logged.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// The user's content-encryption passphrase.
///
/// Created once at onboarding or read back from secure storage on start.
/// Never mutated after construction.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw passphrase (use with caution)
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

/// Key bytes stretched from a [`Passphrase`]
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey(Vec<u8>);

impl DerivedKey {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passphrase_debug_is_redacted() {
        let passphrase = Passphrase::new("correct horse battery staple");
        let debug = format!("{:?}", passphrase);
        assert!(!debug.contains("horse"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_derived_key_debug_shows_length_only() {
        let key = DerivedKey::new(vec![0xAB; 32]);
        let debug = format!("{:?}", key);
        assert_eq!(debug, "DerivedKey(32 bytes)");
        assert!(!debug.to_lowercase().contains("ab, ab"));
    }

    #[test]
    fn test_passphrase_accessors() {
        assert!(Passphrase::new("").is_empty());
        assert_eq!(Passphrase::new("k").expose(), "k");
    }
}
