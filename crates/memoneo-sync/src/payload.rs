//! Sealing outgoing text and opening fetched text
//!
//! Only text-topic values with non-empty text are ever encrypted. Opening a
//! batch derives the key once and isolates failures per item: an item that
//! fails to decrypt keeps its ciphertext, stays marked undecrypted and is
//! reported back, while the rest of the batch opens normally.

use memoneo_core::{EntityId, TopicLogValue, TopicLogValueContainer, TopicType};
use memoneo_crypto::{CipherService, CryptoError, EncryptedField, Passphrase};
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

/// A value ready for the wire plus its `encrypted` marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedValue {
    pub value: TopicLogValue,
    pub encrypted: bool,
}

fn missing_passphrase() -> SyncError {
    SyncError::Crypto(CryptoError::InvalidKey(
        "content passphrase has not been set".to_string(),
    ))
}

/// Whether saving this value will need the content passphrase
pub fn needs_sealing(kind: TopicType, value: &TopicLogValue) -> bool {
    kind.is_text() && value.has_text()
}

/// Encrypt the text of a text-topic value.
///
/// Empty text and non-text values pass through with `encrypted = false`
/// without touching the cipher.
pub fn seal_value(
    cipher: &CipherService,
    kind: TopicType,
    value: &TopicLogValue,
    passphrase: Option<&Passphrase>,
) -> SyncResult<SealedValue> {
    if !needs_sealing(kind, value) {
        return Ok(SealedValue {
            value: value.clone(),
            encrypted: false,
        });
    }

    let passphrase = passphrase.ok_or_else(missing_passphrase)?;
    let mut sealed = value.clone();
    if let Some(text) = sealed.text_mut() {
        *text = cipher.encrypt(text, passphrase)?.encode();
    }

    Ok(SealedValue {
        value: sealed,
        encrypted: true,
    })
}

/// Decrypted batch plus the topics whose text stayed sealed
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedValues {
    pub values: Vec<TopicLogValueContainer>,
    pub undecryptable: Vec<EntityId>,
}

/// Decrypt every sealed text value in a batch.
///
/// Values already opened are left alone, so opening is idempotent. Fails as
/// a whole only when sealed values exist and no passphrase is stored or the
/// key cannot be derived.
pub fn open_values(
    cipher: &CipherService,
    mut values: Vec<TopicLogValueContainer>,
    passphrase: Option<&Passphrase>,
) -> SyncResult<OpenedValues> {
    if !values.iter().any(TopicLogValueContainer::needs_decryption) {
        return Ok(OpenedValues {
            values,
            undecryptable: Vec::new(),
        });
    }

    let passphrase = passphrase.ok_or_else(missing_passphrase)?;
    let key = cipher.derive_key(passphrase)?;
    let mut undecryptable = Vec::new();

    for container in values.iter_mut().filter(|c| c.needs_decryption()) {
        let Some(text) = container.value.text_mut() else {
            continue;
        };

        let opened = EncryptedField::decode(text)
            .and_then(|field| CipherService::decrypt_with_key(&field, &key));

        match opened {
            Ok(plaintext) => {
                *text = plaintext;
                container.decrypted = true;
            }
            Err(e) => {
                warn!(topic = %container.topic_id, error = %e, "Leaving value sealed");
                undecryptable.push(container.topic_id.clone());
            }
        }
    }

    debug!(
        total = values.len(),
        failed = undecryptable.len(),
        "Opened topic log values"
    );

    Ok(OpenedValues {
        values,
        undecryptable,
    })
}
