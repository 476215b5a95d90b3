//! Mock HTTP boundary for testing
//!
//! Serves scripted JSON replies per path, records every call and can hold
//! calls behind a gate so tests can observe how many requests are in flight
//! at once.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use memoneo_core::{HttpBoundary, MockHttpBoundary};
//! use serde_json::json;
//!
//! let http = MockHttpBoundary::new();
//! http.respond_data("/goal/get", json!([{ "id": "a", "name": "Read more" }]));
//!
//! let body = http.get("/goal/get", &Default::default()).await.unwrap();
//! assert_eq!(body["data"][0]["id"], "a");
//! assert_eq!(http.calls_to("/goal/get"), 1);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::HttpError;
use crate::traits::{Headers, HttpBoundary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One call seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub headers: Headers,
}

type Reply = Result<Value, HttpError>;

/// In-memory [`HttpBoundary`] with scripted replies
pub struct MockHttpBoundary {
    /// Reply served for every call to a path
    sticky: DashMap<String, Reply>,
    /// One-shot replies, served before the sticky one
    queued: DashMap<String, VecDeque<Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: DashMap<String, usize>,
    peak: DashMap<String, usize>,
    gated: AtomicBool,
    gate: Semaphore,
}

impl Default for MockHttpBoundary {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHttpBoundary {
    pub fn new() -> Self {
        Self {
            sticky: DashMap::new(),
            queued: DashMap::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: DashMap::new(),
            peak: DashMap::new(),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
        }
    }

    /// Serve `body` verbatim for every call to `path`
    pub fn respond(&self, path: impl Into<String>, body: Value) {
        self.sticky.insert(path.into(), Ok(body));
    }

    /// Serve `{ "data": data }` for every call to `path`
    pub fn respond_data(&self, path: impl Into<String>, data: Value) {
        self.respond(path, json!({ "data": data }));
    }

    /// Fail every call to `path`
    pub fn fail(&self, path: impl Into<String>, error: HttpError) {
        self.sticky.insert(path.into(), Err(error));
    }

    /// Serve `reply` once, ahead of the sticky reply
    pub fn respond_once(&self, path: impl Into<String>, reply: Result<Value, HttpError>) {
        self.queued.entry(path.into()).or_default().push_back(reply);
    }

    /// Make every following call wait until [`release`](Self::release)d
    pub fn hold(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    /// Let `n` held calls through
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Stop holding calls and let every waiting call through
    pub fn open(&self) {
        self.gated.store(false, Ordering::SeqCst);
        self.gate.close();
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.path == path).count()
    }

    pub fn last_call_to(&self, path: &str) -> Option<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|c| c.path == path)
            .cloned()
    }

    /// Calls to `path` currently inside the mock
    pub fn in_flight(&self, path: &str) -> usize {
        self.in_flight.get(path).map(|n| *n).unwrap_or(0)
    }

    /// Highest number of simultaneous calls ever seen on `path`
    pub fn peak_in_flight(&self, path: &str) -> usize {
        self.peak.get(path).map(|n| *n).unwrap_or(0)
    }

    /// Poll until `n` calls to `path` are in flight
    pub async fn wait_for_in_flight(&self, path: &str, n: usize) {
        while self.in_flight(path) < n {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    fn next_reply(&self, path: &str) -> Reply {
        let queued = self
            .queued
            .get_mut(path)
            .and_then(|mut queue| queue.pop_front());
        if let Some(reply) = queued {
            return reply;
        }

        match self.sticky.get(path) {
            Some(reply) => reply.clone(),
            None => Err(HttpError::status(
                404,
                Some(json!({ "error": format!("no mock reply for {}", path) })),
            )),
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &Headers,
    ) -> Reply {
        self.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
            headers: headers.clone(),
        });

        let current = {
            let mut count = self.in_flight.entry(path.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        {
            let mut peak = self.peak.entry(path.to_string()).or_insert(0);
            *peak = (*peak).max(current);
        }

        debug!(?method, path, in_flight = current, "Mock HTTP call");

        if self.gated.load(Ordering::SeqCst) {
            // A closed gate means `open` was called; pass straight through
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }

        let reply = self.next_reply(path);

        if let Some(mut count) = self.in_flight.get_mut(path) {
            *count = count.saturating_sub(1);
        }

        reply
    }
}

#[async_trait]
impl HttpBoundary for MockHttpBoundary {
    async fn get(&self, path: &str, headers: &Headers) -> Result<Value, HttpError> {
        self.dispatch(Method::Get, path, None, headers).await
    }

    async fn post(&self, path: &str, body: &Value, headers: &Headers) -> Result<Value, HttpError> {
        self.dispatch(Method::Post, path, Some(body.clone()), headers)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sticky_and_queued_replies() {
        let http = MockHttpBoundary::new();
        http.respond_data("/person/get", json!([]));
        http.respond_once("/person/get", Err(HttpError::transport("offline")));

        let first = http.get("/person/get", &Headers::new()).await;
        assert!(first.is_err());

        let second = http.get("/person/get", &Headers::new()).await.unwrap();
        assert_eq!(second, json!({ "data": [] }));
        assert_eq!(http.calls_to("/person/get"), 2);
    }

    #[tokio::test]
    async fn test_unscripted_path_is_not_found() {
        let http = MockHttpBoundary::new();
        let err = http.get("/nowhere", &Headers::new()).await.unwrap_err();
        assert_eq!(err.status, Some(404));
    }

    #[tokio::test]
    async fn test_records_post_body_and_headers() {
        let http = MockHttpBoundary::new();
        http.respond_data("/goal/create", json!({ "id": "g1", "name": "x" }));

        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), "Bearer t".to_string());
        http.post("/goal/create", &json!({ "name": "x" }), &headers)
            .await
            .unwrap();

        let call = http.last_call_to("/goal/create").unwrap();
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.body, Some(json!({ "name": "x" })));
        assert_eq!(call.headers.get("Authorization").unwrap(), "Bearer t");
    }

    #[tokio::test]
    async fn test_gate_holds_calls() {
        let http = Arc::new(MockHttpBoundary::new());
        http.respond_data("/topic/get", json!([]));
        http.hold();

        let task = {
            let http = Arc::clone(&http);
            tokio::spawn(async move { http.get("/topic/get", &Headers::new()).await })
        };

        http.wait_for_in_flight("/topic/get", 1).await;
        assert_eq!(http.in_flight("/topic/get"), 1);

        http.release(1);
        assert!(task.await.unwrap().is_ok());
        assert_eq!(http.in_flight("/topic/get"), 0);
        assert_eq!(http.peak_in_flight("/topic/get"), 1);
    }
}
