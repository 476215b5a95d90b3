//! In-memory entity store
//!
//! One state slice per feature. Each slice is touched twice per request:
//! [`EntityStore::begin`] marks the operation loading, and
//! [`EntityStore::apply`] folds the response in. Reducers merge by id, so
//! applying the same response twice leaves the same state as applying it once.
//!
//! The store is only ever mutated through these two entry points.

mod goal;
mod person;
mod recording;
mod session;
mod topic;

pub use goal::GoalSlice;
pub use person::{PersonSlice, SelectionTypeSlice};
pub use recording::RecordingSlice;
pub use session::{AuthSlice, KeySlice, RecoverySlice, UserSlice};
pub use topic::{TopicLogSlice, TopicLogValueSlice, TopicSlice};

use memoneo_core::{Outcome, Request, Response};

/// Loading flag and last error message of one operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl RequestStatus {
    pub fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Clear `loading` and record the failure message, if any.
    ///
    /// This is a flag, not a counter: with several requests of the same
    /// operation queued, the first response clears `loading` while the rest
    /// are still running.
    pub fn finish<T>(&mut self, outcome: &Outcome<T>) {
        self.loading = false;
        self.error = outcome.as_ref().err().map(|failure| failure.message.clone());
    }
}

/// All client-side entity state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    pub auth: AuthSlice,
    pub encryption_key: KeySlice,
    pub user: UserSlice,
    pub recovery: RecoverySlice,
    pub topics: TopicSlice,
    pub topic_logs: TopicLogSlice,
    pub topic_log_values: TopicLogValueSlice,
    pub goals: GoalSlice,
    pub persons: PersonSlice,
    pub selection_types: SelectionTypeSlice,
    pub recordings: RecordingSlice,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the operation behind `request` as in flight
    pub fn begin(&mut self, request: &Request) {
        match request {
            Request::Auth(r) => self.auth.begin(r),
            Request::EncryptionKey(r) => self.encryption_key.begin(r),
            Request::User(r) => self.user.begin(r),
            Request::Recovery(r) => self.recovery.begin(r),
            Request::Topic(r) => self.topics.begin(r),
            Request::TopicLog(r) => self.topic_logs.begin(r),
            Request::TopicLogValue(r) => self.topic_log_values.begin(r),
            Request::Goal(r) => self.goals.begin(r),
            Request::Person(r) => self.persons.begin(r),
            Request::SelectionType(r) => self.selection_types.begin(r),
            Request::Recording(r) => self.recordings.begin(r),
        }
    }

    /// Fold a response into the matching slice
    pub fn apply(&mut self, response: &Response) {
        match response {
            Response::Auth(r) => {
                self.auth.apply(r);
                if !self.auth.authenticated {
                    self.user.user = None;
                }
            }
            Response::EncryptionKey(r) => self.encryption_key.apply(r),
            Response::User(r) => self.user.apply(r),
            Response::Recovery(r) => self.recovery.apply(r),
            Response::Topic(r) => self.topics.apply(r),
            Response::TopicLog(r) => self.topic_logs.apply(r),
            Response::TopicLogValue(r) => self.topic_log_values.apply(r),
            Response::Goal(r) => self.goals.apply(r),
            Response::Person(r) => self.persons.apply(r),
            Response::SelectionType(r) => self.selection_types.apply(r),
            Response::Recording(r) => self.recordings.apply(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoneo_core::{
        AuthResponse, Failure, FailureKind, GoalRequest, GoalResponse, NewGoal, PersonRequest,
        PersonResponse, User, UserResponse,
    };

    #[test]
    fn test_begin_then_failed_apply() {
        let mut store = EntityStore::new();
        store.begin(&Request::Goal(GoalRequest::Create(NewGoal {
            name: "x".to_string(),
            description: String::new(),
            parent: None,
        })));
        assert!(store.goals.create.loading);

        store.apply(&Response::Goal(GoalResponse::Created(Err(Failure::new(
            FailureKind::Network,
            "Request failed with status code 500",
        )))));
        assert!(!store.goals.create.loading);
        assert_eq!(
            store.goals.create.error.as_deref(),
            Some("Request failed with status code 500")
        );
        assert!(store.goals.goals.is_empty());
    }

    #[test]
    fn test_failure_stays_on_its_own_slice() {
        let mut store = EntityStore::new();
        store.begin(&Request::Person(PersonRequest::Fetch));
        store.apply(&Response::Person(PersonResponse::Fetched(Err(Failure::new(
            FailureKind::Network,
            "offline",
        )))));

        assert_eq!(store.persons.fetch.error.as_deref(), Some("offline"));
        assert!(store.goals.fetch.error.is_none());
        assert!(store.topics.fetch.error.is_none());
    }

    #[test]
    fn test_restart_clears_previous_error() {
        let mut status = RequestStatus::default();
        status.finish::<()>(&Err(Failure::new(FailureKind::Network, "x")));
        assert!(status.error.is_some());
        status.start();
        assert!(status.loading);
        assert!(status.error.is_none());
    }

    #[test]
    fn test_first_response_clears_loading() {
        let mut store = EntityStore::new();
        store.begin(&Request::Person(PersonRequest::Fetch));
        store.begin(&Request::Person(PersonRequest::Fetch));
        store.apply(&Response::Person(PersonResponse::Fetched(Ok(Vec::new()))));

        assert!(!store.persons.fetch.loading);
    }

    #[test]
    fn test_failed_relogin_keeps_user() {
        let mut store = EntityStore::new();
        store.apply(&Response::Auth(AuthResponse::LoggedIn(Ok(()))));
        store.apply(&Response::User(UserResponse::Fetched(Ok(User {
            id: "u".into(),
            name: "Kim".to_string(),
            mail: "kim@example.org".to_string(),
        }))));

        store.apply(&Response::Auth(AuthResponse::LoggedIn(Err(Failure::new(
            FailureKind::Network,
            "Wrong password",
        )))));
        assert!(store.auth.authenticated);
        assert!(store.user.user.is_some());

        store.apply(&Response::Auth(AuthResponse::AutoLoggedIn(Err(Failure::new(
            FailureKind::Network,
            "Request failed with status code 401",
        )))));
        assert!(!store.auth.authenticated);
        assert!(store.user.user.is_none());
    }
}
