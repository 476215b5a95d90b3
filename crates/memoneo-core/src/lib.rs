//! # Memoneo Core
//!
//! Domain types, typed messages and boundary traits for the Memoneo diary
//! client's sync core.
//!
//! ## Key Traits
//!
//! - [`HttpBoundary`]: JSON GET/POST against the diary API
//! - [`SecureStorage`]: platform keychain get/set
//! - [`PriorityOrderable`]: items that live in rank-ordered lists
//!
//! ## Key Types
//!
//! - [`Request`] / [`Response`]: one closed enum per direction, one variant
//!   per feature domain
//! - [`ChannelKey`]: the lane a request is serialized on
//! - [`Topic`], [`TopicLog`], [`TopicLogValueContainer`], [`Goal`],
//!   [`Person`], [`SelectionType`], [`User`], [`TopicRecord`]
//! - [`TreeIndex`]: id-keyed parent/child view over a flat goal list
//! - [`MockHttpBoundary`]: scripted boundary for tests

pub mod channel;
pub mod error;
pub mod goal;
pub mod id;
pub mod message;
pub mod mock_http;
pub mod ordering;
pub mod person;
pub mod recording;
pub mod topic;
pub mod traits;

// Re-export main types
pub use channel::*;
pub use error::*;
pub use goal::*;
pub use id::*;
pub use message::*;
pub use mock_http::*;
pub use ordering::*;
pub use person::*;
pub use recording::*;
pub use topic::*;
pub use traits::*;
