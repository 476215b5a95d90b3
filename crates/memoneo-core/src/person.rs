//! People, selection types and the signed-in user

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Someone that can be picked in a person-selection topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

/// A user-defined list of choices for selection topics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionType {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub items: Vec<SelectionTypeItem>,
}

impl SelectionType {
    /// Drop deleted items, keeping the active ones in order
    pub fn retain_active_items(&mut self) {
        self.items.retain(|item| !item.deleted);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionTypeItem {
    pub id: EntityId,
    pub display_name: String,
    #[serde(default)]
    pub deleted: bool,
}

/// The signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retain_active_items() {
        let mut selection: SelectionType = serde_json::from_value(json!({
            "id": "st",
            "name": "Weather",
            "items": [
                { "id": "1", "displayName": "Sunny" },
                { "id": "2", "displayName": "Rain", "deleted": true },
                { "id": "3", "displayName": "Snow", "deleted": false }
            ]
        }))
        .unwrap();

        selection.retain_active_items();
        let names: Vec<_> = selection
            .items
            .iter()
            .map(|item| item.display_name.as_str())
            .collect();
        assert_eq!(names, ["Sunny", "Snow"]);
    }
}
