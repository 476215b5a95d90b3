//! Logical request lanes
//!
//! Every request maps to exactly one [`ChannelKey`]. Requests sharing a key
//! run one at a time in submission order; requests on different keys may
//! overlap freely.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Feature area a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Auth,
    EncryptionKey,
    User,
    Recovery,
    Topic,
    TopicLog,
    TopicLogValue,
    Goal,
    Person,
    SelectionType,
    Recording,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Auth => "auth",
            Domain::EncryptionKey => "encryption_key",
            Domain::User => "user",
            Domain::Recovery => "recovery",
            Domain::Topic => "topic",
            Domain::TopicLog => "topic_log",
            Domain::TopicLogValue => "topic_log_value",
            Domain::Goal => "goal",
            Domain::Person => "person",
            Domain::SelectionType => "selection_type",
            Domain::Recording => "recording",
        }
    }
}

/// Sub-lane within a domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lane {
    /// List and single-item reads
    Fetch,
    /// Mutations not tied to an existing entity (create, login, ...)
    Mutate,
    /// Mutations of one existing entity
    Entity(EntityId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey {
    pub domain: Domain,
    pub lane: Lane,
}

impl ChannelKey {
    pub fn fetch(domain: Domain) -> Self {
        Self {
            domain,
            lane: Lane::Fetch,
        }
    }

    pub fn mutate(domain: Domain) -> Self {
        Self {
            domain,
            lane: Lane::Mutate,
        }
    }

    pub fn entity(domain: Domain, id: EntityId) -> Self {
        Self {
            domain,
            lane: Lane::Entity(id),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lane {
            Lane::Fetch => write!(f, "{}/fetch", self.domain.as_str()),
            Lane::Mutate => write!(f, "{}/mutate", self.domain.as_str()),
            Lane::Entity(id) => write!(f, "{}/entity:{}", self.domain.as_str(), id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_channel_key_display() {
        assert_eq!(ChannelKey::fetch(Domain::Goal).to_string(), "goal/fetch");
        assert_eq!(
            ChannelKey::mutate(Domain::TopicLogValue).to_string(),
            "topic_log_value/mutate"
        );
        assert_eq!(
            ChannelKey::entity(Domain::Person, "p1".into()).to_string(),
            "person/entity:p1"
        );
    }

    #[test]
    fn test_entity_keys_are_distinct_per_id() {
        let keys: HashSet<_> = [
            ChannelKey::entity(Domain::Goal, "a".into()),
            ChannelKey::entity(Domain::Goal, "b".into()),
            ChannelKey::entity(Domain::Goal, "a".into()),
            ChannelKey::entity(Domain::Topic, "a".into()),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 3);
    }
}
