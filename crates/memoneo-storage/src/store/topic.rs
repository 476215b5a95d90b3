//! Topic, topic log and logged value reducers

use std::collections::BTreeMap;

use memoneo_core::{
    EntityId, Topic, TopicLog, TopicLogRequest, TopicLogResponse, TopicLogValueContainer,
    TopicLogValueRequest, TopicLogValueResponse, TopicRequest, TopicResponse, move_to_rank,
    sort_by_priority,
};
use tracing::{debug, warn};

use super::RequestStatus;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicSlice {
    pub topics: Vec<Topic>,
    pub fetch: RequestStatus,
    pub create: RequestStatus,
    pub update: RequestStatus,
    pub delete: RequestStatus,
    pub priority: RequestStatus,
}

impl TopicSlice {
    pub fn get(&self, id: &EntityId) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.id == id)
    }

    pub(super) fn begin(&mut self, request: &TopicRequest) {
        match request {
            TopicRequest::Fetch => self.fetch.start(),
            TopicRequest::Create(_) => self.create.start(),
            TopicRequest::Update { .. } => self.update.start(),
            TopicRequest::Delete { .. } => self.delete.start(),
            TopicRequest::ChangePriority { .. } => self.priority.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &TopicResponse) {
        match response {
            TopicResponse::Fetched(outcome) => {
                self.fetch.finish(outcome);
                if let Ok(topics) = outcome {
                    let mut topics = topics.clone();
                    if let Err(e) = sort_by_priority(&mut topics) {
                        warn!(error = %e, "Topic list left in server order");
                    }
                    self.topics = topics;
                }
            }
            TopicResponse::Created(outcome) => {
                self.create.finish(outcome);
                if let Ok(topic) = outcome {
                    match self.position(&topic.id) {
                        Some(index) => self.topics[index] = topic.clone(),
                        None => self.topics.push(topic.clone()),
                    }
                }
            }
            TopicResponse::Updated(outcome) => {
                self.update.finish(outcome);
                if let Ok(topic) = outcome {
                    if let Some(index) = self.position(&topic.id) {
                        self.topics[index] = topic.clone();
                    }
                }
            }
            TopicResponse::Deleted(outcome) => {
                self.delete.finish(outcome);
                if let Ok(deletion) = outcome {
                    if deletion.hard {
                        self.topics.retain(|t| t.id != deletion.id);
                    } else if let Some(index) = self.position(&deletion.id) {
                        self.topics[index].deleted = true;
                    }
                }
            }
            TopicResponse::PriorityChanged(outcome) => {
                self.priority.finish(outcome);
                if let Ok(change) = outcome {
                    match move_to_rank(&mut self.topics, &change.id, change.new_rank) {
                        Ok(true) => {}
                        Ok(false) => debug!(topic = %change.id, "Rank change for unknown topic"),
                        Err(e) => warn!(error = %e, "Topic rank change left list unsorted"),
                    }
                }
            }
        }
    }

    fn position(&self, id: &EntityId) -> Option<usize> {
        self.topics.iter().position(|t| &t.id == id)
    }
}

/// Topic logs, newest first, plus the log currently being filled in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicLogSlice {
    pub logs: Vec<TopicLog>,
    pub active: Option<TopicLog>,
    pub fetch: RequestStatus,
    pub get_or_create: RequestStatus,
}

impl TopicLogSlice {
    pub(super) fn begin(&mut self, request: &TopicLogRequest) {
        match request {
            TopicLogRequest::Fetch => self.fetch.start(),
            TopicLogRequest::GetOrCreate { .. } => self.get_or_create.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &TopicLogResponse) {
        match response {
            TopicLogResponse::Fetched(outcome) => {
                self.fetch.finish(outcome);
                if let Ok(logs) = outcome {
                    self.logs = logs.clone();
                    self.sort_newest_first();
                }
            }
            TopicLogResponse::Activated(outcome) => {
                self.get_or_create.finish(outcome);
                if let Ok(log) = outcome {
                    match self.logs.iter().position(|l| l.id == log.id) {
                        Some(index) => self.logs[index] = log.clone(),
                        None => {
                            self.logs.push(log.clone());
                            self.sort_newest_first();
                        }
                    }
                    self.active = Some(log.clone());
                }
            }
        }
    }

    fn sort_newest_first(&mut self) {
        self.logs.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// Values of the loaded topic log, keyed by topic id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicLogValueSlice {
    pub topic_log_id: Option<EntityId>,
    pub values: BTreeMap<EntityId, TopicLogValueContainer>,
    /// Topics whose text stayed sealed after the last fetch
    pub undecryptable: Vec<EntityId>,
    pub fetch: RequestStatus,
    pub save: RequestStatus,
}

impl TopicLogValueSlice {
    pub fn get(&self, topic_id: &EntityId) -> Option<&TopicLogValueContainer> {
        self.values.get(topic_id)
    }

    pub(super) fn begin(&mut self, request: &TopicLogValueRequest) {
        match request {
            TopicLogValueRequest::Fetch { .. } => self.fetch.start(),
            TopicLogValueRequest::Save { .. } => self.save.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &TopicLogValueResponse) {
        match response {
            TopicLogValueResponse::Fetched(outcome) => {
                self.fetch.finish(outcome);
                if let Ok(fetched) = outcome {
                    self.topic_log_id = Some(fetched.topic_log_id.clone());
                    self.values = fetched
                        .values
                        .iter()
                        .map(|value| (value.topic_id.clone(), value.clone()))
                        .collect();
                    self.undecryptable = fetched.undecryptable.clone();
                }
            }
            TopicLogValueResponse::Saved(outcome) => {
                self.save.finish(outcome);
                if let Ok(saved) = outcome {
                    if self
                        .topic_log_id
                        .as_ref()
                        .is_some_and(|loaded| loaded != &saved.topic_log_id)
                    {
                        debug!(
                            topic_log = %saved.topic_log_id,
                            "Save landed after switching logs; not shown"
                        );
                        return;
                    }
                    self.undecryptable.retain(|id| id != &saved.topic_id);
                    self.values.insert(saved.topic_id.clone(), saved.clone());
                }
            }
        }
    }
}
