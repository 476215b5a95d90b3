//! Configuration for the sync runner and its HTTP boundary

use std::path::PathBuf;
use std::time::Duration;

use memoneo_crypto::CipherConfig;
use memoneo_storage::SecureStoreKeys;
use serde::{Deserialize, Serialize};

/// Configuration for a [`SyncEffectRunner`](crate::SyncEffectRunner)
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Key-derivation constants for content encryption
    pub cipher: CipherConfig,
    /// Secure storage slot names
    pub keys: SecureStoreKeys,
    /// Response broadcast channel capacity
    pub event_channel_capacity: usize,
    /// How long a channel worker waits for work before retiring
    pub channel_idle_timeout: Duration,
    /// Root directory of saved voice recordings
    pub recordings_root: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cipher: CipherConfig::default(),
            keys: SecureStoreKeys::default(),
            event_channel_capacity: 256,
            channel_idle_timeout: Duration::from_secs(30),
            recordings_root: PathBuf::from("./recordings"),
        }
    }
}

impl SyncConfig {
    pub fn with_cipher(mut self, cipher: CipherConfig) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn with_keys(mut self, keys: SecureStoreKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    pub fn with_channel_idle_timeout(mut self, timeout: Duration) -> Self {
        self.channel_idle_timeout = timeout;
        self
    }

    pub fn with_recordings_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.recordings_root = root.into();
        self
    }
}

/// Configuration for [`ReqwestBoundary`](crate::ReqwestBoundary)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// API base URL, e.g. `https://api.memoneo.app/v1`
    pub base_url: String,
    /// Whole-request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
