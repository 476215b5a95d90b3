//! Goals: ranked, one-level hierarchical objectives

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Highest valid progress value
pub const MAX_PROGRESS: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    OnHold,
    Cancelled,
}

/// A goal's reference to its parent goal.
///
/// The wire only ever carries the raw id. Once a list has been resolved the
/// reference is marked [`ParentRef::Resolved`], meaning the id is known to
/// exist in the same list and can be looked up there. Comparing a raw and a
/// resolved reference is rejected by the ordering functions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Raw(EntityId),
    Resolved(EntityId),
}

impl ParentRef {
    pub fn id(&self) -> &EntityId {
        match self {
            ParentRef::Raw(id) | ParentRef::Resolved(id) => id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ParentRef::Resolved(_))
    }

    /// Drop the resolution marker, e.g. before sending back to the server
    pub fn to_raw(&self) -> ParentRef {
        ParentRef::Raw(self.id().clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub status: GoalStatus,
    /// Percent complete, 0 to 100
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, with = "parent_wire")]
    pub parent: Option<ParentRef>,
}

impl Goal {
    pub fn parent_id(&self) -> Option<&EntityId> {
        self.parent.as_ref().map(ParentRef::id)
    }
}

/// Parent references travel as a bare id or `null`
mod parent_wire {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::ParentRef;
    use crate::id::EntityId;

    pub fn serialize<S: Serializer>(
        parent: &Option<ParentRef>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        parent.as_ref().map(ParentRef::id).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ParentRef>, D::Error> {
        let id = Option::<EntityId>::deserialize(deserializer)?;
        Ok(id.filter(|id| !id.is_empty()).map(ParentRef::Raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_goal_wire_parent_is_raw_id() {
        let goal: Goal = serde_json::from_value(json!({
            "id": "b",
            "name": "Run a marathon",
            "rank": 2,
            "status": "on_hold",
            "progress": 40,
            "parent": "a"
        }))
        .unwrap();

        assert_eq!(goal.parent, Some(ParentRef::Raw(EntityId::from("a"))));
        assert_eq!(goal.status, GoalStatus::OnHold);
        assert_eq!(goal.parent_id().map(EntityId::as_str), Some("a"));

        let wire = serde_json::to_value(&goal).unwrap();
        assert_eq!(wire["parent"], "a");
    }

    #[test]
    fn test_goal_missing_or_null_parent() {
        let goal: Goal = serde_json::from_value(json!({ "id": "a", "name": "x" })).unwrap();
        assert!(goal.parent.is_none());
        assert_eq!(goal.status, GoalStatus::Active);

        let goal: Goal =
            serde_json::from_value(json!({ "id": "a", "name": "x", "parent": null })).unwrap();
        assert!(goal.parent.is_none());
    }

    #[test]
    fn test_resolved_parent_serializes_as_id() {
        let mut goal: Goal = serde_json::from_value(json!({ "id": "b", "name": "x" })).unwrap();
        goal.parent = Some(ParentRef::Resolved(EntityId::from("a")));
        assert_eq!(serde_json::to_value(&goal).unwrap()["parent"], "a");
        assert_eq!(
            goal.parent.as_ref().map(ParentRef::to_raw),
            Some(ParentRef::Raw(EntityId::from("a")))
        );
    }
}
