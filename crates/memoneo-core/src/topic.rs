//! Topics, topic logs and the values logged against them

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::EntityId;

/// Kind of answer a topic expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopicType {
    #[serde(rename = "text-simple")]
    TextSimple,
    #[serde(rename = "text-5rated")]
    TextFiveRated,
    #[serde(rename = "selection")]
    Selection,
    #[serde(rename = "person-selection")]
    PersonSelection,
    #[serde(rename = "goal-selection")]
    GoalSelection,
}

impl TopicType {
    /// Text topics carry free text, which is the only content ever encrypted
    pub fn is_text(self) -> bool {
        matches!(self, TopicType::TextSimple | TopicType::TextFiveRated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TopicType::TextSimple => "text-simple",
            TopicType::TextFiveRated => "text-5rated",
            TopicType::Selection => "selection",
            TopicType::PersonSelection => "person-selection",
            TopicType::GoalSelection => "goal-selection",
        }
    }
}

impl fmt::Display for TopicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic type plus its variant-specific configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TopicTypeInfo {
    #[serde(rename = "text-simple")]
    TextSimple,
    #[serde(rename = "text-5rated")]
    TextFiveRated,
    #[serde(rename = "selection", rename_all = "camelCase")]
    Selection { selection_type_id: EntityId },
    #[serde(rename = "person-selection")]
    PersonSelection,
    #[serde(rename = "goal-selection")]
    GoalSelection,
}

impl TopicTypeInfo {
    pub fn kind(&self) -> TopicType {
        match self {
            TopicTypeInfo::TextSimple => TopicType::TextSimple,
            TopicTypeInfo::TextFiveRated => TopicType::TextFiveRated,
            TopicTypeInfo::Selection { .. } => TopicType::Selection,
            TopicTypeInfo::PersonSelection => TopicType::PersonSelection,
            TopicTypeInfo::GoalSelection => TopicType::GoalSelection,
        }
    }
}

/// A recurring diary question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub has_voice: bool,
    /// Soft-delete marker; hard deletes remove the topic from the store
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub rank: i64,
    pub type_info: TopicTypeInfo,
}

/// Highest valid rating of a five-rated text answer
pub const MAX_RATING: u8 = 4;

/// The answer to one topic.
///
/// The wire form carries no discriminator; the variants are told apart by
/// their fields, so the rated variant must be tried before plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicLogValue {
    TextRated { text: String, rating: u8 },
    TextSimple { text: String },
    Selection { selected: Vec<EntityId> },
}

impl TopicLogValue {
    pub fn text(&self) -> Option<&str> {
        match self {
            TopicLogValue::TextRated { text, .. } | TopicLogValue::TextSimple { text } => {
                Some(text)
            }
            TopicLogValue::Selection { .. } => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            TopicLogValue::TextRated { text, .. } | TopicLogValue::TextSimple { text } => {
                Some(text)
            }
            TopicLogValue::Selection { .. } => None,
        }
    }

    /// Whether this value carries text that would need sealing
    pub fn has_text(&self) -> bool {
        self.text().is_some_and(|text| !text.is_empty())
    }

    /// Check the value shape against the topic type it answers
    pub fn validate_for(&self, kind: TopicType) -> Result<(), ValidationError> {
        let matches = match (self, kind) {
            (TopicLogValue::TextSimple { .. }, TopicType::TextSimple) => true,
            (TopicLogValue::TextRated { rating, .. }, TopicType::TextFiveRated) => {
                if *rating > MAX_RATING {
                    return Err(ValidationError::OutOfRange {
                        field: "rating",
                        value: i64::from(*rating),
                    });
                }
                true
            }
            (
                TopicLogValue::Selection { .. },
                TopicType::Selection | TopicType::PersonSelection | TopicType::GoalSelection,
            ) => true,
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(ValidationError::ValueTypeMismatch(kind.to_string()))
        }
    }
}

/// A logged value plus the ids it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicLogValueContainer {
    pub topic_id: EntityId,
    pub topic_log_id: EntityId,
    #[serde(rename = "type")]
    pub kind: TopicType,
    pub value: TopicLogValue,
    /// Text in `value` is sealed on the server
    #[serde(default)]
    pub encrypted: bool,
    /// Text in `value` has already been opened in memory
    #[serde(skip)]
    pub decrypted: bool,
}

impl TopicLogValueContainer {
    /// True while the text is still an encrypted wire string
    pub fn needs_decryption(&self) -> bool {
        self.encrypted && !self.decrypted && self.kind.is_text() && self.value.has_text()
    }
}

/// How far a topic log reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicLogDateType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl TopicLogDateType {
    pub fn as_str(self) -> &'static str {
        match self {
            TopicLogDateType::Daily => "daily",
            TopicLogDateType::Weekly => "weekly",
            TopicLogDateType::Monthly => "monthly",
            TopicLogDateType::Yearly => "yearly",
        }
    }
}

impl fmt::Display for TopicLogDateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dated round of answering topics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicLog {
    pub id: EntityId,
    pub date_type: TopicLogDateType,
    #[serde(with = "day_format")]
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `DD-MM-YYYY` day encoding used by the diary server
pub mod day_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d-%m-%Y";

    pub fn format(date: &NaiveDate) -> String {
        date.format(FORMAT).to_string()
    }

    pub fn parse(value: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(value, FORMAT)
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_info_wire_shape() {
        let info: TopicTypeInfo =
            serde_json::from_value(json!({ "type": "selection", "selectionTypeId": "st-1" }))
                .unwrap();
        assert_eq!(
            info,
            TopicTypeInfo::Selection {
                selection_type_id: EntityId::from("st-1")
            }
        );
        assert_eq!(info.kind(), TopicType::Selection);

        let rated: TopicTypeInfo = serde_json::from_value(json!({ "type": "text-5rated" })).unwrap();
        assert_eq!(rated.kind(), TopicType::TextFiveRated);
        assert!(rated.kind().is_text());
        assert!(!TopicType::GoalSelection.is_text());
    }

    #[test]
    fn test_topic_defaults() {
        let topic: Topic = serde_json::from_value(json!({
            "id": "t1",
            "name": "Sleep",
            "typeInfo": { "type": "text-simple" }
        }))
        .unwrap();
        assert_eq!(topic.rank, 0);
        assert!(!topic.deleted);
        assert!(!topic.has_voice);
    }

    #[test]
    fn test_value_variants_from_fields() {
        let rated: TopicLogValue =
            serde_json::from_value(json!({ "text": "ok", "rating": 3 })).unwrap();
        assert!(matches!(rated, TopicLogValue::TextRated { rating: 3, .. }));

        let simple: TopicLogValue = serde_json::from_value(json!({ "text": "ok" })).unwrap();
        assert!(matches!(simple, TopicLogValue::TextSimple { .. }));

        let selection: TopicLogValue =
            serde_json::from_value(json!({ "selected": ["a", "b"] })).unwrap();
        assert_eq!(selection.text(), None);
    }

    #[test]
    fn test_value_validation() {
        let rated = TopicLogValue::TextRated {
            text: String::new(),
            rating: 5,
        };
        assert!(matches!(
            rated.validate_for(TopicType::TextFiveRated),
            Err(ValidationError::OutOfRange { field: "rating", .. })
        ));

        let simple = TopicLogValue::TextSimple {
            text: "hi".to_string(),
        };
        assert!(simple.validate_for(TopicType::TextSimple).is_ok());
        assert!(simple.validate_for(TopicType::Selection).is_err());

        let selection = TopicLogValue::Selection { selected: vec![] };
        assert!(selection.validate_for(TopicType::PersonSelection).is_ok());
    }

    #[test]
    fn test_needs_decryption() {
        let mut container = TopicLogValueContainer {
            topic_id: "t1".into(),
            topic_log_id: "l1".into(),
            kind: TopicType::TextSimple,
            value: TopicLogValue::TextSimple {
                text: "sealed".to_string(),
            },
            encrypted: true,
            decrypted: false,
        };
        assert!(container.needs_decryption());

        container.decrypted = true;
        assert!(!container.needs_decryption());

        container.decrypted = false;
        container.value = TopicLogValue::TextSimple {
            text: String::new(),
        };
        assert!(!container.needs_decryption());
    }

    #[test]
    fn test_container_skips_decrypted_flag_on_wire() {
        let container = TopicLogValueContainer {
            topic_id: "t1".into(),
            topic_log_id: "l1".into(),
            kind: TopicType::TextFiveRated,
            value: TopicLogValue::TextRated {
                text: "x".to_string(),
                rating: 2,
            },
            encrypted: false,
            decrypted: true,
        };
        let wire = serde_json::to_value(&container).unwrap();
        assert_eq!(wire["type"], "text-5rated");
        assert_eq!(wire["topicLogId"], "l1");
        assert!(wire.get("decrypted").is_none());
    }

    #[test]
    fn test_topic_log_day_format() {
        let log: TopicLog = serde_json::from_value(json!({
            "id": "l1",
            "dateType": "weekly",
            "date": "07-03-2021"
        }))
        .unwrap();
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2021, 3, 7).unwrap());
        assert_eq!(log.date_type, TopicLogDateType::Weekly);
        assert_eq!(day_format::format(&log.date), "07-03-2021");

        let bad = serde_json::from_value::<TopicLog>(json!({
            "id": "l1",
            "dateType": "daily",
            "date": "2021-03-07"
        }));
        assert!(bad.is_err());
    }
}
