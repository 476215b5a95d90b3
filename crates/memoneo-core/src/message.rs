//! Typed request and response messages
//!
//! A [`Request`] is a domain intent issued by the UI. The sync runner turns
//! each one into exactly one [`Response`], which the entity store applies.
//! Every response variant carries an [`Outcome`] so a failure lands on the
//! same reducer arm as the success it replaces.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use memoneo_crypto::Passphrase;
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelKey, Domain};
use crate::error::ValidationError;
use crate::goal::{Goal, MAX_PROGRESS};
use crate::id::EntityId;
use crate::person::{Person, SelectionType, User};
use crate::recording::TopicRecord;
use crate::topic::{
    Topic, TopicLog, TopicLogDateType, TopicLogValue, TopicLogValueContainer, TopicTypeInfo,
};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone)]
pub enum Request {
    Auth(AuthRequest),
    EncryptionKey(KeyRequest),
    User(UserRequest),
    Recovery(RecoveryRequest),
    Topic(TopicRequest),
    TopicLog(TopicLogRequest),
    TopicLogValue(TopicLogValueRequest),
    Goal(GoalRequest),
    Person(PersonRequest),
    SelectionType(SelectionTypeRequest),
    Recording(RecordingRequest),
}

#[derive(Debug, Clone)]
pub enum AuthRequest {
    Login { mail: String, password: Passphrase },
    Register { name: String, mail: String, password: Passphrase },
    /// Re-validate the persisted token
    AutoLogin,
    /// Forget the persisted token; never touches the network
    Logout,
}

#[derive(Debug, Clone)]
pub enum KeyRequest {
    /// Load the content passphrase from secure storage
    Retrieve,
    /// Persist a user-entered content passphrase
    Init { passphrase: Passphrase },
}

#[derive(Debug, Clone)]
pub enum UserRequest {
    Fetch,
    ChangeMail { mail: String, password: Passphrase },
}

#[derive(Debug, Clone)]
pub enum RecoveryRequest {
    RequestCode { mail: String },
    VerifyCode { code: String },
}

#[derive(Debug, Clone)]
pub enum TopicRequest {
    Fetch,
    Create(NewTopic),
    Update { topic: Topic, recover: bool },
    Delete { id: EntityId },
    ChangePriority { id: EntityId, new_rank: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTopic {
    pub name: String,
    pub description: String,
    pub optional: bool,
    pub type_info: TopicTypeInfo,
}

#[derive(Debug, Clone)]
pub enum TopicLogRequest {
    Fetch,
    GetOrCreate {
        date_type: TopicLogDateType,
        date: NaiveDate,
    },
}

#[derive(Debug, Clone)]
pub enum TopicLogValueRequest {
    Fetch { topic_log_id: EntityId },
    Save {
        topic: Topic,
        topic_log_id: EntityId,
        value: TopicLogValue,
    },
}

#[derive(Debug, Clone)]
pub enum GoalRequest {
    Fetch,
    Create(NewGoal),
    Update { goal: Goal, recover: bool },
    Delete { id: EntityId },
    ChangePriority { id: EntityId, new_rank: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGoal {
    pub name: String,
    pub description: String,
    pub parent: Option<EntityId>,
}

#[derive(Debug, Clone)]
pub enum PersonRequest {
    Fetch,
    Create { name: String, surname: String },
    Delete { id: EntityId },
}

#[derive(Debug, Clone)]
pub enum SelectionTypeRequest {
    Fetch,
    FetchOne { id: EntityId },
    Create { name: String },
    AddItem {
        selection_type_id: EntityId,
        display_name: String,
    },
    DeleteItem {
        selection_type_id: EntityId,
        item_id: EntityId,
    },
}

#[derive(Debug, Clone)]
pub enum RecordingRequest {
    /// Index the recordings stored under `directory`
    List { directory: PathBuf },
    /// Move a captured file into the recordings tree
    Save {
        topic_id: EntityId,
        date_type: TopicLogDateType,
        date: NaiveDate,
        source: PathBuf,
    },
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_id(id: &EntityId, field: &'static str) -> Result<(), ValidationError> {
    require(id.as_str(), field)
}

fn require_secret(secret: &Passphrase, field: &'static str) -> Result<(), ValidationError> {
    if secret.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

impl Request {
    pub fn domain(&self) -> Domain {
        match self {
            Request::Auth(_) => Domain::Auth,
            Request::EncryptionKey(_) => Domain::EncryptionKey,
            Request::User(_) => Domain::User,
            Request::Recovery(_) => Domain::Recovery,
            Request::Topic(_) => Domain::Topic,
            Request::TopicLog(_) => Domain::TopicLog,
            Request::TopicLogValue(_) => Domain::TopicLogValue,
            Request::Goal(_) => Domain::Goal,
            Request::Person(_) => Domain::Person,
            Request::SelectionType(_) => Domain::SelectionType,
            Request::Recording(_) => Domain::Recording,
        }
    }

    /// Short operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Request::Auth(AuthRequest::Login { .. }) => "auth.login",
            Request::Auth(AuthRequest::Register { .. }) => "auth.register",
            Request::Auth(AuthRequest::AutoLogin) => "auth.auto_login",
            Request::Auth(AuthRequest::Logout) => "auth.logout",
            Request::EncryptionKey(KeyRequest::Retrieve) => "key.retrieve",
            Request::EncryptionKey(KeyRequest::Init { .. }) => "key.init",
            Request::User(UserRequest::Fetch) => "user.fetch",
            Request::User(UserRequest::ChangeMail { .. }) => "user.change_mail",
            Request::Recovery(RecoveryRequest::RequestCode { .. }) => "recovery.request_code",
            Request::Recovery(RecoveryRequest::VerifyCode { .. }) => "recovery.verify_code",
            Request::Topic(TopicRequest::Fetch) => "topic.fetch",
            Request::Topic(TopicRequest::Create(_)) => "topic.create",
            Request::Topic(TopicRequest::Update { .. }) => "topic.update",
            Request::Topic(TopicRequest::Delete { .. }) => "topic.delete",
            Request::Topic(TopicRequest::ChangePriority { .. }) => "topic.change_priority",
            Request::TopicLog(TopicLogRequest::Fetch) => "topic_log.fetch",
            Request::TopicLog(TopicLogRequest::GetOrCreate { .. }) => "topic_log.get_or_create",
            Request::TopicLogValue(TopicLogValueRequest::Fetch { .. }) => "topic_log_value.fetch",
            Request::TopicLogValue(TopicLogValueRequest::Save { .. }) => "topic_log_value.save",
            Request::Goal(GoalRequest::Fetch) => "goal.fetch",
            Request::Goal(GoalRequest::Create(_)) => "goal.create",
            Request::Goal(GoalRequest::Update { .. }) => "goal.update",
            Request::Goal(GoalRequest::Delete { .. }) => "goal.delete",
            Request::Goal(GoalRequest::ChangePriority { .. }) => "goal.change_priority",
            Request::Person(PersonRequest::Fetch) => "person.fetch",
            Request::Person(PersonRequest::Create { .. }) => "person.create",
            Request::Person(PersonRequest::Delete { .. }) => "person.delete",
            Request::SelectionType(SelectionTypeRequest::Fetch) => "selection_type.fetch",
            Request::SelectionType(SelectionTypeRequest::FetchOne { .. }) => {
                "selection_type.fetch_one"
            }
            Request::SelectionType(SelectionTypeRequest::Create { .. }) => "selection_type.create",
            Request::SelectionType(SelectionTypeRequest::AddItem { .. }) => {
                "selection_type.add_item"
            }
            Request::SelectionType(SelectionTypeRequest::DeleteItem { .. }) => {
                "selection_type.delete_item"
            }
            Request::Recording(RecordingRequest::List { .. }) => "recording.list",
            Request::Recording(RecordingRequest::Save { .. }) => "recording.save",
        }
    }

    /// The lane this request is serialized on
    pub fn channel(&self) -> ChannelKey {
        let domain = self.domain();
        match self {
            Request::Auth(_) | Request::Recovery(_) => ChannelKey::mutate(domain),
            Request::EncryptionKey(KeyRequest::Retrieve) => ChannelKey::fetch(domain),
            Request::EncryptionKey(KeyRequest::Init { .. }) => ChannelKey::mutate(domain),
            Request::User(UserRequest::Fetch) => ChannelKey::fetch(domain),
            Request::User(UserRequest::ChangeMail { .. }) => ChannelKey::mutate(domain),

            Request::Topic(TopicRequest::Fetch) => ChannelKey::fetch(domain),
            Request::Topic(TopicRequest::Create(_)) => ChannelKey::mutate(domain),
            Request::Topic(TopicRequest::Update { topic, .. }) => {
                ChannelKey::entity(domain, topic.id.clone())
            }
            Request::Topic(
                TopicRequest::Delete { id } | TopicRequest::ChangePriority { id, .. },
            ) => ChannelKey::entity(domain, id.clone()),

            Request::TopicLog(TopicLogRequest::Fetch) => ChannelKey::fetch(domain),
            Request::TopicLog(TopicLogRequest::GetOrCreate { .. }) => ChannelKey::mutate(domain),

            Request::TopicLogValue(TopicLogValueRequest::Fetch { .. }) => ChannelKey::fetch(domain),
            Request::TopicLogValue(TopicLogValueRequest::Save { topic, .. }) => {
                ChannelKey::entity(domain, topic.id.clone())
            }

            Request::Goal(GoalRequest::Fetch) => ChannelKey::fetch(domain),
            Request::Goal(GoalRequest::Create(_)) => ChannelKey::mutate(domain),
            Request::Goal(GoalRequest::Update { goal, .. }) => {
                ChannelKey::entity(domain, goal.id.clone())
            }
            Request::Goal(GoalRequest::Delete { id } | GoalRequest::ChangePriority { id, .. }) => {
                ChannelKey::entity(domain, id.clone())
            }

            Request::Person(PersonRequest::Fetch) => ChannelKey::fetch(domain),
            Request::Person(PersonRequest::Create { .. }) => ChannelKey::mutate(domain),
            Request::Person(PersonRequest::Delete { id }) => ChannelKey::entity(domain, id.clone()),

            Request::SelectionType(
                SelectionTypeRequest::Fetch | SelectionTypeRequest::FetchOne { .. },
            ) => ChannelKey::fetch(domain),
            Request::SelectionType(SelectionTypeRequest::Create { .. }) => {
                ChannelKey::mutate(domain)
            }
            Request::SelectionType(
                SelectionTypeRequest::AddItem {
                    selection_type_id, ..
                }
                | SelectionTypeRequest::DeleteItem {
                    selection_type_id, ..
                },
            ) => ChannelKey::entity(domain, selection_type_id.clone()),

            Request::Recording(RecordingRequest::List { .. }) => ChannelKey::fetch(domain),
            Request::Recording(RecordingRequest::Save { topic_id, .. }) => {
                ChannelKey::entity(domain, topic_id.clone())
            }
        }
    }

    /// Whether the request must carry the persisted auth token
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Request::Auth(
                AuthRequest::Login { .. } | AuthRequest::Register { .. } | AuthRequest::Logout
            ) | Request::EncryptionKey(_)
                | Request::Recovery(_)
                | Request::Recording(_)
        )
    }

    /// Reject requests with missing or out-of-range fields.
    ///
    /// A failure here is a caller bug: it is returned to the submitter
    /// directly and never becomes a [`Response`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Request::Auth(AuthRequest::Login { mail, password }) => {
                require(mail, "mail")?;
                require_secret(password, "password")
            }
            Request::Auth(AuthRequest::Register {
                name,
                mail,
                password,
            }) => {
                require(name, "name")?;
                require(mail, "mail")?;
                require_secret(password, "password")
            }
            Request::Auth(AuthRequest::AutoLogin | AuthRequest::Logout) => Ok(()),

            Request::EncryptionKey(KeyRequest::Retrieve) => Ok(()),
            Request::EncryptionKey(KeyRequest::Init { passphrase }) => {
                require_secret(passphrase, "passphrase")
            }

            Request::User(UserRequest::Fetch) => Ok(()),
            Request::User(UserRequest::ChangeMail { mail, password }) => {
                require(mail, "mail")?;
                require_secret(password, "password")
            }

            Request::Recovery(RecoveryRequest::RequestCode { mail }) => require(mail, "mail"),
            Request::Recovery(RecoveryRequest::VerifyCode { code }) => require(code, "code"),

            Request::Topic(TopicRequest::Fetch) => Ok(()),
            Request::Topic(TopicRequest::Create(topic)) => require(&topic.name, "name"),
            Request::Topic(TopicRequest::Update { topic, .. }) => {
                require_id(&topic.id, "id")?;
                require(&topic.name, "name")
            }
            Request::Topic(TopicRequest::Delete { id } | TopicRequest::ChangePriority { id, .. }) => {
                require_id(id, "id")
            }

            Request::TopicLog(_) => Ok(()),

            Request::TopicLogValue(TopicLogValueRequest::Fetch { topic_log_id }) => {
                require_id(topic_log_id, "topic_log_id")
            }
            Request::TopicLogValue(TopicLogValueRequest::Save {
                topic,
                topic_log_id,
                value,
            }) => {
                require_id(&topic.id, "topic_id")?;
                require_id(topic_log_id, "topic_log_id")?;
                value.validate_for(topic.type_info.kind())
            }

            Request::Goal(GoalRequest::Fetch) => Ok(()),
            Request::Goal(GoalRequest::Create(goal)) => {
                require(&goal.name, "name")?;
                match &goal.parent {
                    Some(parent) => require_id(parent, "parent"),
                    None => Ok(()),
                }
            }
            Request::Goal(GoalRequest::Update { goal, .. }) => {
                require_id(&goal.id, "id")?;
                require(&goal.name, "name")?;
                if goal.progress > MAX_PROGRESS {
                    return Err(ValidationError::OutOfRange {
                        field: "progress",
                        value: i64::from(goal.progress),
                    });
                }
                Ok(())
            }
            Request::Goal(GoalRequest::Delete { id } | GoalRequest::ChangePriority { id, .. }) => {
                require_id(id, "id")
            }

            Request::Person(PersonRequest::Fetch) => Ok(()),
            Request::Person(PersonRequest::Create { name, surname }) => {
                require(name, "name")?;
                require(surname, "surname")
            }
            Request::Person(PersonRequest::Delete { id }) => require_id(id, "id"),

            Request::SelectionType(SelectionTypeRequest::Fetch) => Ok(()),
            Request::SelectionType(SelectionTypeRequest::FetchOne { id }) => require_id(id, "id"),
            Request::SelectionType(SelectionTypeRequest::Create { name }) => require(name, "name"),
            Request::SelectionType(SelectionTypeRequest::AddItem {
                selection_type_id,
                display_name,
            }) => {
                require_id(selection_type_id, "selection_type_id")?;
                require(display_name, "display_name")
            }
            Request::SelectionType(SelectionTypeRequest::DeleteItem {
                selection_type_id,
                item_id,
            }) => {
                require_id(selection_type_id, "selection_type_id")?;
                require_id(item_id, "item_id")
            }

            Request::Recording(RecordingRequest::List { directory }) => {
                if directory.as_os_str().is_empty() {
                    return Err(ValidationError::MissingField("directory"));
                }
                Ok(())
            }
            Request::Recording(RecordingRequest::Save {
                topic_id, source, ..
            }) => {
                require_id(topic_id, "topic_id")?;
                if source.as_os_str().is_empty() {
                    return Err(ValidationError::MissingField("source"));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Category of a runtime failure delivered through the response channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Crypto,
    AuthMissing,
    NotFound,
    Storage,
}

/// A failed request, rendered by the UI as plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Success payload or failure of one request
pub type Outcome<T> = Result<T, Failure>;

/// Result of a delete: soft (flag set) or hard (entity removed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub id: EntityId,
    pub hard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankChange {
    pub id: EntityId,
    pub new_rank: i64,
}

/// Values of one topic log, text already opened where possible
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedValues {
    pub topic_log_id: EntityId,
    pub values: Vec<TopicLogValueContainer>,
    /// Topics whose text could not be decrypted and is still sealed
    pub undecryptable: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Auth(AuthResponse),
    EncryptionKey(KeyResponse),
    User(UserResponse),
    Recovery(RecoveryResponse),
    Topic(TopicResponse),
    TopicLog(TopicLogResponse),
    TopicLogValue(TopicLogValueResponse),
    Goal(GoalResponse),
    Person(PersonResponse),
    SelectionType(SelectionTypeResponse),
    Recording(RecordingResponse),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthResponse {
    LoggedIn(Outcome<()>),
    Registered(Outcome<()>),
    AutoLoggedIn(Outcome<()>),
    LoggedOut(Outcome<()>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyResponse {
    /// `true` when a passphrase is stored
    Retrieved(Outcome<bool>),
    Initialized(Outcome<()>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserResponse {
    Fetched(Outcome<User>),
    MailChanged(Outcome<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryResponse {
    CodeRequested(Outcome<()>),
    CodeVerified(Outcome<()>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopicResponse {
    Fetched(Outcome<Vec<Topic>>),
    Created(Outcome<Topic>),
    Updated(Outcome<Topic>),
    Deleted(Outcome<Deletion>),
    PriorityChanged(Outcome<RankChange>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopicLogResponse {
    Fetched(Outcome<Vec<TopicLog>>),
    Activated(Outcome<TopicLog>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopicLogValueResponse {
    Fetched(Outcome<FetchedValues>),
    Saved(Outcome<TopicLogValueContainer>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GoalResponse {
    Fetched(Outcome<Vec<Goal>>),
    Created(Outcome<Goal>),
    Updated(Outcome<Goal>),
    Deleted(Outcome<Deletion>),
    PriorityChanged(Outcome<RankChange>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersonResponse {
    Fetched(Outcome<Vec<Person>>),
    Created(Outcome<Person>),
    Deleted(Outcome<EntityId>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionTypeResponse {
    Fetched(Outcome<Vec<SelectionType>>),
    FetchedOne(Outcome<SelectionType>),
    Created(Outcome<SelectionType>),
    ItemAdded(Outcome<SelectionType>),
    ItemDeleted(Outcome<SelectionType>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordingResponse {
    Listed(Outcome<Vec<TopicRecord>>),
    Saved(Outcome<TopicRecord>),
}

fn failure_of<T>(outcome: &Outcome<T>) -> Option<&Failure> {
    outcome.as_ref().err()
}

impl Response {
    pub fn domain(&self) -> Domain {
        match self {
            Response::Auth(_) => Domain::Auth,
            Response::EncryptionKey(_) => Domain::EncryptionKey,
            Response::User(_) => Domain::User,
            Response::Recovery(_) => Domain::Recovery,
            Response::Topic(_) => Domain::Topic,
            Response::TopicLog(_) => Domain::TopicLog,
            Response::TopicLogValue(_) => Domain::TopicLogValue,
            Response::Goal(_) => Domain::Goal,
            Response::Person(_) => Domain::Person,
            Response::SelectionType(_) => Domain::SelectionType,
            Response::Recording(_) => Domain::Recording,
        }
    }

    /// The failure carried by this response, if any
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Response::Auth(
                AuthResponse::LoggedIn(o)
                | AuthResponse::Registered(o)
                | AuthResponse::AutoLoggedIn(o)
                | AuthResponse::LoggedOut(o),
            ) => failure_of(o),
            Response::EncryptionKey(KeyResponse::Retrieved(o)) => failure_of(o),
            Response::EncryptionKey(KeyResponse::Initialized(o)) => failure_of(o),
            Response::User(UserResponse::Fetched(o)) => failure_of(o),
            Response::User(UserResponse::MailChanged(o)) => failure_of(o),
            Response::Recovery(
                RecoveryResponse::CodeRequested(o) | RecoveryResponse::CodeVerified(o),
            ) => failure_of(o),
            Response::Topic(TopicResponse::Fetched(o)) => failure_of(o),
            Response::Topic(TopicResponse::Created(o) | TopicResponse::Updated(o)) => {
                failure_of(o)
            }
            Response::Topic(TopicResponse::Deleted(o)) => failure_of(o),
            Response::Topic(TopicResponse::PriorityChanged(o)) => failure_of(o),
            Response::TopicLog(TopicLogResponse::Fetched(o)) => failure_of(o),
            Response::TopicLog(TopicLogResponse::Activated(o)) => failure_of(o),
            Response::TopicLogValue(TopicLogValueResponse::Fetched(o)) => failure_of(o),
            Response::TopicLogValue(TopicLogValueResponse::Saved(o)) => failure_of(o),
            Response::Goal(GoalResponse::Fetched(o)) => failure_of(o),
            Response::Goal(GoalResponse::Created(o) | GoalResponse::Updated(o)) => failure_of(o),
            Response::Goal(GoalResponse::Deleted(o)) => failure_of(o),
            Response::Goal(GoalResponse::PriorityChanged(o)) => failure_of(o),
            Response::Person(PersonResponse::Fetched(o)) => failure_of(o),
            Response::Person(PersonResponse::Created(o)) => failure_of(o),
            Response::Person(PersonResponse::Deleted(o)) => failure_of(o),
            Response::SelectionType(SelectionTypeResponse::Fetched(o)) => failure_of(o),
            Response::SelectionType(
                SelectionTypeResponse::FetchedOne(o)
                | SelectionTypeResponse::Created(o)
                | SelectionTypeResponse::ItemAdded(o)
                | SelectionTypeResponse::ItemDeleted(o),
            ) => failure_of(o),
            Response::Recording(RecordingResponse::Listed(o)) => failure_of(o),
            Response::Recording(RecordingResponse::Saved(o)) => failure_of(o),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    /// The response `request` would produce had it failed with `failure`
    pub fn failed(request: &Request, failure: Failure) -> Self {
        match request {
            Request::Auth(r) => Response::Auth(match r {
                AuthRequest::Login { .. } => AuthResponse::LoggedIn(Err(failure)),
                AuthRequest::Register { .. } => AuthResponse::Registered(Err(failure)),
                AuthRequest::AutoLogin => AuthResponse::AutoLoggedIn(Err(failure)),
                AuthRequest::Logout => AuthResponse::LoggedOut(Err(failure)),
            }),
            Request::EncryptionKey(r) => Response::EncryptionKey(match r {
                KeyRequest::Retrieve => KeyResponse::Retrieved(Err(failure)),
                KeyRequest::Init { .. } => KeyResponse::Initialized(Err(failure)),
            }),
            Request::User(r) => Response::User(match r {
                UserRequest::Fetch => UserResponse::Fetched(Err(failure)),
                UserRequest::ChangeMail { .. } => UserResponse::MailChanged(Err(failure)),
            }),
            Request::Recovery(r) => Response::Recovery(match r {
                RecoveryRequest::RequestCode { .. } => RecoveryResponse::CodeRequested(Err(failure)),
                RecoveryRequest::VerifyCode { .. } => RecoveryResponse::CodeVerified(Err(failure)),
            }),
            Request::Topic(r) => Response::Topic(match r {
                TopicRequest::Fetch => TopicResponse::Fetched(Err(failure)),
                TopicRequest::Create(_) => TopicResponse::Created(Err(failure)),
                TopicRequest::Update { .. } => TopicResponse::Updated(Err(failure)),
                TopicRequest::Delete { .. } => TopicResponse::Deleted(Err(failure)),
                TopicRequest::ChangePriority { .. } => TopicResponse::PriorityChanged(Err(failure)),
            }),
            Request::TopicLog(r) => Response::TopicLog(match r {
                TopicLogRequest::Fetch => TopicLogResponse::Fetched(Err(failure)),
                TopicLogRequest::GetOrCreate { .. } => TopicLogResponse::Activated(Err(failure)),
            }),
            Request::TopicLogValue(r) => Response::TopicLogValue(match r {
                TopicLogValueRequest::Fetch { .. } => TopicLogValueResponse::Fetched(Err(failure)),
                TopicLogValueRequest::Save { .. } => TopicLogValueResponse::Saved(Err(failure)),
            }),
            Request::Goal(r) => Response::Goal(match r {
                GoalRequest::Fetch => GoalResponse::Fetched(Err(failure)),
                GoalRequest::Create(_) => GoalResponse::Created(Err(failure)),
                GoalRequest::Update { .. } => GoalResponse::Updated(Err(failure)),
                GoalRequest::Delete { .. } => GoalResponse::Deleted(Err(failure)),
                GoalRequest::ChangePriority { .. } => GoalResponse::PriorityChanged(Err(failure)),
            }),
            Request::Person(r) => Response::Person(match r {
                PersonRequest::Fetch => PersonResponse::Fetched(Err(failure)),
                PersonRequest::Create { .. } => PersonResponse::Created(Err(failure)),
                PersonRequest::Delete { .. } => PersonResponse::Deleted(Err(failure)),
            }),
            Request::SelectionType(r) => Response::SelectionType(match r {
                SelectionTypeRequest::Fetch => SelectionTypeResponse::Fetched(Err(failure)),
                SelectionTypeRequest::FetchOne { .. } => SelectionTypeResponse::FetchedOne(Err(failure)),
                SelectionTypeRequest::Create { .. } => SelectionTypeResponse::Created(Err(failure)),
                SelectionTypeRequest::AddItem { .. } => SelectionTypeResponse::ItemAdded(Err(failure)),
                SelectionTypeRequest::DeleteItem { .. } => SelectionTypeResponse::ItemDeleted(Err(failure)),
            }),
            Request::Recording(r) => Response::Recording(match r {
                RecordingRequest::List { .. } => RecordingResponse::Listed(Err(failure)),
                RecordingRequest::Save { .. } => RecordingResponse::Saved(Err(failure)),
            }),
        }
    }
}
