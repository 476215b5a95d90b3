//! # Memoneo Sync
//!
//! Runs the diary client's server effects.
//!
//! Requests are validated, queued on their [`ChannelKey`](memoneo_core::ChannelKey)
//! and executed one at a time per key. Free text is sealed before it leaves
//! the device and opened again after it is fetched. Every response is
//! applied to the shared [`EntityStore`](memoneo_storage::EntityStore) before
//! the submitter sees it.
//!
//! ## Modules
//!
//! - [`runner`]: [`SyncEffectRunner`], per-channel single-flight workers
//! - [`executor`]: request to endpoint mapping and failure taxonomy
//! - [`payload`]: sealing and opening of topic log values
//! - [`recordings`]: file-system index of voice recordings
//! - [`http`]: [`ReqwestBoundary`], the production HTTP boundary
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use memoneo_core::{GoalRequest, Request};
//! use memoneo_storage::InMemorySecureStorage;
//! use memoneo_sync::{HttpConfig, ReqwestBoundary, SyncConfig, SyncEffectRunner};
//!
//! let http = Arc::new(ReqwestBoundary::new(HttpConfig::new("https://api.example.org"))?);
//! let runner = SyncEffectRunner::new(http, Arc::new(InMemorySecureStorage::new()), SyncConfig::default());
//!
//! let response = runner.execute(Request::Goal(GoalRequest::Fetch)).await?;
//! println!("{} goals", runner.snapshot().goals.goals.len());
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod payload;
pub mod recordings;
pub mod runner;

// Re-exports
pub use config::{HttpConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use executor::Executor;
pub use http::ReqwestBoundary;
pub use payload::{OpenedValues, SealedValue, open_values, seal_value};
pub use recordings::{list_recordings, recording_path, save_recording};
pub use runner::{PendingResponse, SyncEffectRunner};
