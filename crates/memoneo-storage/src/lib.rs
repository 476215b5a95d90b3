//! # Memoneo Storage
//!
//! Client-side state for the Memoneo diary client.
//!
//! ## Features
//!
//! - **KeyStore**: reads and writes the auth token and the content
//!   passphrase through a [`SecureStorage`] implementation
//! - **InMemorySecureStorage**: `DashMap`-backed secure storage for tests
//! - **EntityStore**: per-feature state slices with request/response reducers
//!
//! ## Example
//!
//! ```rust,ignore
//! use memoneo_core::{GoalResponse, Response};
//! use memoneo_storage::EntityStore;
//!
//! let mut store = EntityStore::new();
//! store.apply(&Response::Goal(GoalResponse::Fetched(Ok(goals))));
//! for goal in &store.goals.goals {
//!     println!("{} ({})", goal.name, goal.rank);
//! }
//! ```

pub mod key_store;
pub mod memory;
pub mod store;

// Re-exports
pub use key_store::{DEFAULT_AUTH_TOKEN_KEY, DEFAULT_ENCRYPTION_KEY_KEY, KeyStore, SecureStoreKeys};
pub use memory::InMemorySecureStorage;
pub use store::{
    AuthSlice, EntityStore, GoalSlice, KeySlice, PersonSlice, RecordingSlice, RecoverySlice,
    RequestStatus, SelectionTypeSlice, TopicLogSlice, TopicLogValueSlice, TopicSlice, UserSlice,
};

// Re-export the storage boundary from memoneo-core for convenience
pub use memoneo_core::{SecureStorage, StorageError};
