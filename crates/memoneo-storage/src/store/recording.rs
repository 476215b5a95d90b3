//! Recording index reducer

use std::collections::BTreeMap;

use memoneo_core::{EntityId, RecordingRequest, RecordingResponse, TopicRecord};

use super::RequestStatus;

/// Known recordings by topic id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSlice {
    pub records: BTreeMap<EntityId, TopicRecord>,
    pub list: RequestStatus,
    pub save: RequestStatus,
}

impl RecordingSlice {
    pub(super) fn begin(&mut self, request: &RecordingRequest) {
        match request {
            RecordingRequest::List { .. } => self.list.start(),
            RecordingRequest::Save { .. } => self.save.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &RecordingResponse) {
        match response {
            RecordingResponse::Listed(outcome) => {
                self.list.finish(outcome);
                if let Ok(records) = outcome {
                    self.records = records
                        .iter()
                        .map(|r| (r.topic_id.clone(), r.clone()))
                        .collect();
                }
            }
            RecordingResponse::Saved(outcome) => {
                self.save.finish(outcome);
                if let Ok(record) = outcome {
                    self.records.insert(record.topic_id.clone(), record.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoneo_core::{Failure, FailureKind};
    use std::path::PathBuf;

    fn record(topic_id: &str) -> TopicRecord {
        TopicRecord {
            topic_id: topic_id.into(),
            path: PathBuf::from(format!("/rec/daily/5-March-2024/{}.m4a", topic_id)),
        }
    }

    #[test]
    fn test_listing_replaces_index() {
        let mut slice = RecordingSlice::default();
        slice.apply(&RecordingResponse::Saved(Ok(record("stale"))));
        slice.apply(&RecordingResponse::Listed(Ok(vec![record("t1"), record("t2")])));

        let ids: Vec<&str> = slice.records.keys().map(EntityId::as_str).collect();
        assert_eq!(ids, ["t1", "t2"]);
    }

    #[test]
    fn test_save_replaces_record_of_same_topic() {
        let mut slice = RecordingSlice::default();
        slice.begin(&RecordingRequest::List {
            directory: PathBuf::from("/rec/daily/5-March-2024"),
        });
        slice.apply(&RecordingResponse::Listed(Ok(vec![record("t1")])));

        let mut moved = record("t1");
        moved.path = PathBuf::from("/rec/daily/6-March-2024/t1.m4a");
        let response = RecordingResponse::Saved(Ok(moved.clone()));
        slice.apply(&response);
        slice.apply(&response);

        assert!(!slice.list.loading);
        assert_eq!(slice.records.len(), 1);
        assert_eq!(slice.records.get(&EntityId::from("t1")), Some(&moved));
    }

    #[test]
    fn test_failed_save_keeps_index() {
        let mut slice = RecordingSlice::default();
        slice.apply(&RecordingResponse::Listed(Ok(vec![record("t1")])));
        slice.apply(&RecordingResponse::Saved(Err(Failure::new(
            FailureKind::Storage,
            "No such file or directory",
        ))));

        assert_eq!(slice.records.len(), 1);
        assert_eq!(slice.save.error.as_deref(), Some("No such file or directory"));
    }
}
