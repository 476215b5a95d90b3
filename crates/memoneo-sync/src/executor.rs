//! Request executor
//!
//! Turns one [`Request`] into exactly one [`Response`]: picks the endpoint,
//! attaches the bearer token, seals or opens text, and maps every failure to
//! a [`Failure`](memoneo_core::Failure) on the matching response variant.
//!
//! The executor never mutates the entity store. It only reads it to reject
//! operations on ids the client has never seen before any network call.

use std::path::PathBuf;
use std::sync::Arc;

use memoneo_core::{
    AuthRequest, AuthResponse, Deletion, EntityId, FetchedValues, Goal, GoalRequest,
    GoalResponse, Headers, HttpBoundary, KeyRequest, KeyResponse, NewGoal, NewTopic, Outcome,
    Person, PersonRequest, PersonResponse, RankChange, RecordingRequest, RecordingResponse,
    RecoveryRequest, RecoveryResponse, Request, Response, SecureStorage, SelectionType,
    SelectionTypeRequest, SelectionTypeResponse, Topic, TopicLog, TopicLogDateType,
    TopicLogRequest, TopicLogResponse, TopicLogValue, TopicLogValueContainer,
    TopicLogValueRequest, TopicLogValueResponse, TopicRequest, TopicResponse, User, UserRequest,
    UserResponse, day_format,
};
use memoneo_crypto::{CipherService, Passphrase};
use memoneo_storage::{EntityStore, KeyStore};
use parking_lot::RwLock;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::payload::{needs_sealing, open_values, seal_value};
use crate::recordings::{list_recordings, save_recording};

#[derive(Deserialize)]
struct TokenPayload {
    token: String,
}

/// Unwrap the `{ "data": ... }` envelope of a success body
fn data<T: DeserializeOwned>(mut body: Value) -> SyncResult<T> {
    let payload = body
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| SyncError::Decode("missing `data` field".to_string()))?;
    Ok(serde_json::from_value(payload)?)
}

/// `data` of a delete reply: `true` when the entity was removed for good
fn hard_deleted(body: &Value) -> bool {
    body.get("data").and_then(Value::as_bool).unwrap_or(false)
}

fn json_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

fn outcome<T>(op: &'static str, result: SyncResult<T>) -> Outcome<T> {
    result.map_err(|e| {
        warn!(op, error = %e, "Request failed");
        e.to_failure()
    })
}

/// Runs requests against the HTTP boundary and secure storage
pub struct Executor<H: HttpBoundary, S: SecureStorage> {
    http: Arc<H>,
    keys: KeyStore<S>,
    cipher: CipherService,
    recordings_root: PathBuf,
    store: Arc<RwLock<EntityStore>>,
}

impl<H: HttpBoundary, S: SecureStorage> Executor<H, S> {
    pub fn new(
        http: Arc<H>,
        keys: KeyStore<S>,
        cipher: CipherService,
        recordings_root: PathBuf,
        store: Arc<RwLock<EntityStore>>,
    ) -> Self {
        Self {
            http,
            keys,
            cipher,
            recordings_root,
            store,
        }
    }

    pub fn key_store(&self) -> &KeyStore<S> {
        &self.keys
    }

    /// Run one request to completion
    ///
    /// Headers are resolved once up front: the bearer token is attached
    /// exactly when [`Request::requires_auth`] says so, and a missing token
    /// fails the request with `AuthMissing` before any other work.
    pub async fn execute(&self, request: Request) -> Response {
        debug!(op = request.name(), "Executing request");
        let headers = match self.headers_for(&request).await {
            Ok(headers) => headers,
            Err(e) => {
                warn!(op = request.name(), error = %e, "Request failed");
                return Response::failed(&request, e.to_failure());
            }
        };
        let headers = &headers;

        match request {
            Request::Auth(r) => Response::Auth(self.auth(headers, r).await),
            Request::EncryptionKey(r) => Response::EncryptionKey(self.encryption_key(r).await),
            Request::User(r) => Response::User(self.user(headers, r).await),
            Request::Recovery(r) => Response::Recovery(self.recovery(headers, r).await),
            Request::Topic(r) => Response::Topic(self.topic(headers, r).await),
            Request::TopicLog(r) => Response::TopicLog(self.topic_log(headers, r).await),
            Request::TopicLogValue(r) => {
                Response::TopicLogValue(self.topic_log_value(headers, r).await)
            }
            Request::Goal(r) => Response::Goal(self.goal(headers, r).await),
            Request::Person(r) => Response::Person(self.person(headers, r).await),
            Request::SelectionType(r) => {
                Response::SelectionType(self.selection_type(headers, r).await)
            }
            Request::Recording(r) => Response::Recording(self.recording(r).await),
        }
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    async fn headers_for(&self, request: &Request) -> SyncResult<Headers> {
        let mut headers = json_headers();
        if request.requires_auth() {
            let token = self
                .keys
                .get_auth_token()
                .await?
                .ok_or(SyncError::AuthMissing)?;
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        Ok(headers)
    }

    async fn get(&self, headers: &Headers, path: &str) -> SyncResult<Value> {
        Ok(self.http.get(path, headers).await?)
    }

    async fn post(&self, headers: &Headers, path: &str, body: &Value) -> SyncResult<Value> {
        Ok(self.http.post(path, body, headers).await?)
    }

    /// Fail with `NotFound` unless the store already knows `id`
    fn require_known(
        &self,
        what: &str,
        id: &EntityId,
        known: impl FnOnce(&EntityStore) -> bool,
    ) -> SyncResult<()> {
        if known(&self.store.read()) {
            Ok(())
        } else {
            Err(SyncError::NotFound(format!("{} {}", what, id)))
        }
    }

    async fn passphrase_if(&self, needed: bool) -> SyncResult<Option<Passphrase>> {
        if needed {
            Ok(self.keys.get_key().await?)
        } else {
            Ok(None)
        }
    }

    // ------------------------------------------------------------------------
    // Auth, key, user, recovery
    // ------------------------------------------------------------------------

    async fn auth(&self, headers: &Headers, request: AuthRequest) -> AuthResponse {
        match request {
            AuthRequest::Login { mail, password } => {
                let body = json!({ "mail": mail, "password": password.expose() });
                AuthResponse::LoggedIn(outcome("auth.login", self.authenticate(headers, "/login", body).await))
            }
            AuthRequest::Register {
                name,
                mail,
                password,
            } => {
                let body = json!({ "name": name, "mail": mail, "password": password.expose() });
                AuthResponse::Registered(outcome(
                    "auth.register",
                    self.authenticate(headers, "/register", body).await,
                ))
            }
            AuthRequest::AutoLogin => {
                AuthResponse::AutoLoggedIn(outcome("auth.auto_login", self.auto_login(headers).await))
            }
            AuthRequest::Logout => {
                let result = self.keys.clear_auth_token().await.map_err(SyncError::from);
                if result.is_ok() {
                    info!("Logged out");
                }
                AuthResponse::LoggedOut(outcome("auth.logout", result))
            }
        }
    }

    async fn authenticate(&self, headers: &Headers, path: &str, body: Value) -> SyncResult<()> {
        let reply = self.post(headers, path, &body).await?;
        let TokenPayload { token } = data(reply)?;
        if token.is_empty() {
            return Err(SyncError::Decode("empty auth token".to_string()));
        }

        self.keys.set_auth_token(&token).await?;
        info!(path, "Authenticated");
        Ok(())
    }

    async fn auto_login(&self, headers: &Headers) -> SyncResult<()> {
        self.post(headers, "/login", &json!({})).await?;
        info!("Auto-login succeeded");
        Ok(())
    }

    async fn encryption_key(&self, request: KeyRequest) -> KeyResponse {
        match request {
            KeyRequest::Retrieve => {
                let result = self
                    .keys
                    .get_key()
                    .await
                    .map(|key| key.is_some())
                    .map_err(SyncError::from);
                KeyResponse::Retrieved(outcome("key.retrieve", result))
            }
            KeyRequest::Init { passphrase } => {
                let result = self.keys.set_key(&passphrase).await.map_err(SyncError::from);
                KeyResponse::Initialized(outcome("key.init", result))
            }
        }
    }

    async fn user(&self, headers: &Headers, request: UserRequest) -> UserResponse {
        match request {
            UserRequest::Fetch => UserResponse::Fetched(outcome("user.fetch", self.fetch_user(headers).await)),
            UserRequest::ChangeMail { mail, password } => {
                let result = self.change_mail(headers, mail, &password).await;
                UserResponse::MailChanged(outcome("user.change_mail", result))
            }
        }
    }

    async fn fetch_user(&self, headers: &Headers) -> SyncResult<User> {
        data(self.get(headers, "/user/get").await?)
    }

    async fn change_mail(
        &self,
        headers: &Headers,
        mail: String,
        password: &Passphrase,
    ) -> SyncResult<String> {
        let body = json!({ "mail": mail, "password": password.expose() });
        self.post(headers, "/user/mail/change", &body).await?;
        info!("Changed account mail");
        Ok(mail)
    }

    async fn recovery(&self, headers: &Headers, request: RecoveryRequest) -> RecoveryResponse {
        match request {
            RecoveryRequest::RequestCode { mail } => {
                let result = self
                    .post(headers, "/user/recovery/forgotten", &json!({ "mail": mail }))
                    .await
                    .map(drop);
                RecoveryResponse::CodeRequested(outcome("recovery.request_code", result))
            }
            RecoveryRequest::VerifyCode { code } => {
                let result = self
                    .post(headers, "/user/recovery/verify", &json!({ "code": code }))
                    .await
                    .map(drop);
                RecoveryResponse::CodeVerified(outcome("recovery.verify_code", result))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Topics
    // ------------------------------------------------------------------------

    async fn topic(&self, headers: &Headers, request: TopicRequest) -> TopicResponse {
        match request {
            TopicRequest::Fetch => TopicResponse::Fetched(outcome("topic.fetch", self.fetch_topics(headers).await)),
            TopicRequest::Create(topic) => {
                TopicResponse::Created(outcome("topic.create", self.create_topic(headers, &topic).await))
            }
            TopicRequest::Update { topic, recover } => {
                TopicResponse::Updated(outcome("topic.update", self.update_topic(headers, topic, recover).await))
            }
            TopicRequest::Delete { id } => {
                TopicResponse::Deleted(outcome("topic.delete", self.delete_topic(headers, id).await))
            }
            TopicRequest::ChangePriority { id, new_rank } => TopicResponse::PriorityChanged(outcome(
                "topic.change_priority",
                self.rerank(headers, "topic", "/topic/edit", id, new_rank, |s, id| {
                    s.topics.get(id).is_some()
                })
                .await,
            )),
        }
    }

    async fn fetch_topics(&self, headers: &Headers) -> SyncResult<Vec<Topic>> {
        let topics: Vec<Topic> = data(self.get(headers, "/topic/get").await?)?;
        debug!(count = topics.len(), "Fetched topics");
        Ok(topics)
    }

    async fn create_topic(&self, headers: &Headers, topic: &NewTopic) -> SyncResult<Topic> {
        let body = serde_json::to_value(topic)?;
        let created: Topic = data(self.post(headers, "/topic/create", &body).await?)?;
        info!(id = %created.id, "Created topic");
        Ok(created)
    }

    async fn update_topic(
        &self,
        headers: &Headers,
        mut topic: Topic,
        recover: bool,
    ) -> SyncResult<Topic> {
        self.require_known("topic", &topic.id, |s| s.topics.get(&topic.id).is_some())?;

        let mut body = serde_json::to_value(&topic)?;
        if let Value::Object(map) = &mut body {
            map.insert("recover".to_string(), Value::Bool(recover));
        }
        self.post(headers, "/topic/edit", &body).await?;

        if recover {
            topic.deleted = false;
        }
        Ok(topic)
    }

    async fn delete_topic(&self, headers: &Headers, id: EntityId) -> SyncResult<Deletion> {
        self.require_known("topic", &id, |s| s.topics.get(&id).is_some())?;

        let reply = self.get(headers, &format!("/topic/delete/{}", id)).await?;
        let hard = hard_deleted(&reply);
        info!(id = %id, hard, "Deleted topic");
        Ok(Deletion { id, hard })
    }

    /// Shared priority change for topics and goals
    async fn rerank(
        &self,
        headers: &Headers,
        what: &str,
        path: &str,
        id: EntityId,
        new_rank: i64,
        known: impl FnOnce(&EntityStore, &EntityId) -> bool,
    ) -> SyncResult<RankChange> {
        self.require_known(what, &id, |s| known(s, &id))?;

        self.post(headers, path, &json!({ "id": id, "rank": new_rank }))
            .await?;
        debug!(id = %id, new_rank, "Changed priority");
        Ok(RankChange { id, new_rank })
    }

    // ------------------------------------------------------------------------
    // Topic logs and values
    // ------------------------------------------------------------------------

    async fn topic_log(&self, headers: &Headers, request: TopicLogRequest) -> TopicLogResponse {
        match request {
            TopicLogRequest::Fetch => {
                TopicLogResponse::Fetched(outcome("topic_log.fetch", self.fetch_topic_logs(headers).await))
            }
            TopicLogRequest::GetOrCreate { date_type, date } => TopicLogResponse::Activated(
                outcome("topic_log.get_or_create", self.get_or_create_log(headers, date_type, date).await),
            ),
        }
    }

    async fn fetch_topic_logs(&self, headers: &Headers) -> SyncResult<Vec<TopicLog>> {
        data(self.get(headers, "/topiclog/get").await?)
    }

    async fn get_or_create_log(
        &self,
        headers: &Headers,
        date_type: TopicLogDateType,
        date: chrono::NaiveDate,
    ) -> SyncResult<TopicLog> {
        let path = format!(
            "/topiclog/getorcreate/{}/{}",
            date_type,
            day_format::format(&date)
        );
        data(self.get(headers, &path).await?)
    }

    async fn topic_log_value(
        &self,
        headers: &Headers,
        request: TopicLogValueRequest,
    ) -> TopicLogValueResponse {
        match request {
            TopicLogValueRequest::Fetch { topic_log_id } => TopicLogValueResponse::Fetched(outcome(
                "topic_log_value.fetch",
                self.fetch_values(headers, topic_log_id).await,
            )),
            TopicLogValueRequest::Save {
                topic,
                topic_log_id,
                value,
            } => TopicLogValueResponse::Saved(outcome(
                "topic_log_value.save",
                self.save_value(headers, &topic, topic_log_id, value).await,
            )),
        }
    }

    async fn fetch_values(
        &self,
        headers: &Headers,
        topic_log_id: EntityId,
    ) -> SyncResult<FetchedValues> {
        let path = format!("/topiclogvalue/get/{}", topic_log_id);
        let values: Vec<TopicLogValueContainer> = data(self.get(headers, &path).await?)?;

        let sealed = values.iter().any(TopicLogValueContainer::needs_decryption);
        let passphrase = self.passphrase_if(sealed).await?;
        let cipher = self.cipher.clone();

        let opened = tokio::task::spawn_blocking(move || {
            open_values(&cipher, values, passphrase.as_ref())
        })
        .await??;

        Ok(FetchedValues {
            topic_log_id,
            values: opened.values,
            undecryptable: opened.undecryptable,
        })
    }

    async fn save_value(
        &self,
        headers: &Headers,
        topic: &Topic,
        topic_log_id: EntityId,
        value: TopicLogValue,
    ) -> SyncResult<TopicLogValueContainer> {
        let kind = topic.type_info.kind();

        let passphrase = self.passphrase_if(needs_sealing(kind, &value)).await?;
        let cipher = self.cipher.clone();
        let plain = value.clone();
        let sealed = tokio::task::spawn_blocking(move || {
            seal_value(&cipher, kind, &plain, passphrase.as_ref())
        })
        .await??;

        let body = json!({
            "topicId": topic.id,
            "topicLogId": topic_log_id,
            "type": kind,
            "value": sealed.value,
            "encrypted": sealed.encrypted,
        });
        self.post(headers, "/topiclogvalue/createorupdate", &body)
            .await?;

        debug!(topic = %topic.id, encrypted = sealed.encrypted, "Saved topic log value");

        // The store keeps plaintext; the flag records how the server holds it
        Ok(TopicLogValueContainer {
            topic_id: topic.id.clone(),
            topic_log_id,
            kind,
            value,
            encrypted: sealed.encrypted,
            decrypted: sealed.encrypted,
        })
    }

    // ------------------------------------------------------------------------
    // Goals
    // ------------------------------------------------------------------------

    async fn goal(&self, headers: &Headers, request: GoalRequest) -> GoalResponse {
        match request {
            GoalRequest::Fetch => GoalResponse::Fetched(outcome("goal.fetch", self.fetch_goals(headers).await)),
            GoalRequest::Create(goal) => {
                GoalResponse::Created(outcome("goal.create", self.create_goal(headers, &goal).await))
            }
            GoalRequest::Update { goal, recover } => {
                GoalResponse::Updated(outcome("goal.update", self.update_goal(headers, goal, recover).await))
            }
            GoalRequest::Delete { id } => {
                GoalResponse::Deleted(outcome("goal.delete", self.delete_goal(headers, id).await))
            }
            GoalRequest::ChangePriority { id, new_rank } => GoalResponse::PriorityChanged(outcome(
                "goal.change_priority",
                self.rerank(headers, "goal", "/goal/edit", id, new_rank, |s, id| {
                    s.goals.get(id).is_some()
                })
                .await,
            )),
        }
    }

    async fn fetch_goals(&self, headers: &Headers) -> SyncResult<Vec<Goal>> {
        let goals: Vec<Goal> = data(self.get(headers, "/goal/get").await?)?;
        debug!(count = goals.len(), "Fetched goals");
        Ok(goals)
    }

    async fn create_goal(&self, headers: &Headers, goal: &NewGoal) -> SyncResult<Goal> {
        let body = serde_json::to_value(goal)?;
        let created: Goal = data(self.post(headers, "/goal/create", &body).await?)?;
        info!(id = %created.id, parent = ?created.parent_id(), "Created goal");
        Ok(created)
    }

    async fn update_goal(
        &self,
        headers: &Headers,
        mut goal: Goal,
        recover: bool,
    ) -> SyncResult<Goal> {
        self.require_known("goal", &goal.id, |s| s.goals.get(&goal.id).is_some())?;

        let body = json!({
            "id": goal.id,
            "name": goal.name,
            "description": goal.description,
            "progress": goal.progress,
            "status": goal.status,
            "recover": recover,
        });
        self.post(headers, "/goal/edit", &body).await?;

        if recover {
            goal.deleted = false;
        }
        Ok(goal)
    }

    async fn delete_goal(&self, headers: &Headers, id: EntityId) -> SyncResult<Deletion> {
        self.require_known("goal", &id, |s| s.goals.get(&id).is_some())?;

        let reply = self.get(headers, &format!("/goal/delete/{}", id)).await?;
        let hard = hard_deleted(&reply);
        info!(id = %id, hard, "Deleted goal");
        Ok(Deletion { id, hard })
    }

    // ------------------------------------------------------------------------
    // Persons and selection types
    // ------------------------------------------------------------------------

    async fn person(&self, headers: &Headers, request: PersonRequest) -> PersonResponse {
        match request {
            PersonRequest::Fetch => {
                PersonResponse::Fetched(outcome("person.fetch", self.fetch_persons(headers).await))
            }
            PersonRequest::Create { name, surname } => PersonResponse::Created(outcome(
                "person.create",
                self.create_person(headers, name, surname).await,
            )),
            PersonRequest::Delete { id } => {
                PersonResponse::Deleted(outcome("person.delete", self.delete_person(headers, id).await))
            }
        }
    }

    async fn fetch_persons(&self, headers: &Headers) -> SyncResult<Vec<Person>> {
        data(self.get(headers, "/person/get").await?)
    }

    async fn create_person(
        &self,
        headers: &Headers,
        name: String,
        surname: String,
    ) -> SyncResult<Person> {
        let body = json!({ "name": name, "surname": surname });
        let person: Person = data(self.post(headers, "/person/create", &body).await?)?;
        info!(id = %person.id, "Created person");
        Ok(person)
    }

    async fn delete_person(&self, headers: &Headers, id: EntityId) -> SyncResult<EntityId> {
        self.require_known("person", &id, |s| s.persons.contains(&id))?;

        self.get(headers, &format!("/person/{}", id)).await?;
        info!(id = %id, "Deleted person");
        Ok(id)
    }

    async fn selection_type(
        &self,
        headers: &Headers,
        request: SelectionTypeRequest,
    ) -> SelectionTypeResponse {
        match request {
            SelectionTypeRequest::Fetch => SelectionTypeResponse::Fetched(outcome(
                "selection_type.fetch",
                self.fetch_selection_types(headers).await,
            )),
            SelectionTypeRequest::FetchOne { id } => SelectionTypeResponse::FetchedOne(outcome(
                "selection_type.fetch_one",
                self.fetch_selection_type(headers, &id).await,
            )),
            SelectionTypeRequest::Create { name } => SelectionTypeResponse::Created(outcome(
                "selection_type.create",
                self.create_selection_type(headers, name).await,
            )),
            SelectionTypeRequest::AddItem {
                selection_type_id,
                display_name,
            } => SelectionTypeResponse::ItemAdded(outcome(
                "selection_type.add_item",
                self.add_item(headers, &selection_type_id, display_name).await,
            )),
            SelectionTypeRequest::DeleteItem {
                selection_type_id,
                item_id,
            } => SelectionTypeResponse::ItemDeleted(outcome(
                "selection_type.delete_item",
                self.delete_item(headers, &selection_type_id, &item_id).await,
            )),
        }
    }

    async fn fetch_selection_types(&self, headers: &Headers) -> SyncResult<Vec<SelectionType>> {
        data(self.get(headers, "/selectiontype/get").await?)
    }

    async fn fetch_selection_type(
        &self,
        headers: &Headers,
        id: &EntityId,
    ) -> SyncResult<SelectionType> {
        data(self.get(headers, &format!("/selectiontype/get/{}", id)).await?)
    }

    async fn create_selection_type(
        &self,
        headers: &Headers,
        name: String,
    ) -> SyncResult<SelectionType> {
        let created: SelectionType = data(
            self.post(headers, "/selectiontype/create", &json!({ "name": name }))
                .await?,
        )?;
        info!(id = %created.id, "Created selection type");
        Ok(created)
    }

    async fn add_item(
        &self,
        headers: &Headers,
        id: &EntityId,
        display_name: String,
    ) -> SyncResult<SelectionType> {
        self.require_known("selection type", id, |s| s.selection_types.get(id).is_some())?;

        let path = format!("/selectiontype/item/add/{}", id);
        data(
            self.post(headers, &path, &json!({ "displayName": display_name }))
                .await?,
        )
    }

    async fn delete_item(
        &self,
        headers: &Headers,
        id: &EntityId,
        item_id: &EntityId,
    ) -> SyncResult<SelectionType> {
        self.require_known("selection type", id, |s| s.selection_types.get(id).is_some())?;

        let path = format!("/selectiontype/item/delete/{}/{}", id, item_id);
        data(self.get(headers, &path).await?)
    }

    // ------------------------------------------------------------------------
    // Recordings
    // ------------------------------------------------------------------------

    async fn recording(&self, request: RecordingRequest) -> RecordingResponse {
        match request {
            RecordingRequest::List { directory } => RecordingResponse::Listed(outcome(
                "recording.list",
                list_recordings(&directory).await,
            )),
            RecordingRequest::Save {
                topic_id,
                date_type,
                date,
                source,
            } => RecordingResponse::Saved(outcome(
                "recording.save",
                save_recording(&self.recordings_root, &topic_id, date_type, date, &source).await,
            )),
        }
    }
}
