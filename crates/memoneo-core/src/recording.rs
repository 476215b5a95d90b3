//! Voice recordings attached to topics

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// File extension of saved recordings
pub const RECORDING_EXTENSION: &str = "m4a";

/// A recording file found for one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub topic_id: EntityId,
    pub path: PathBuf,
}
