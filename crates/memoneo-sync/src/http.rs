//! HTTP boundary over `reqwest`
//!
//! Paths are joined onto the configured base URL. Non-success statuses are
//! turned into an [`HttpError`] carrying the decoded error body, so the
//! runner can surface the server's own message.

use async_trait::async_trait;
use memoneo_core::{Headers, HttpBoundary, HttpError};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::HttpConfig;
use crate::error::{SyncError, SyncResult};

/// [`HttpBoundary`] talking to the diary API
#[derive(Debug, Clone)]
pub struct ReqwestBoundary {
    client: Client,
    base_url: String,
}

impl ReqwestBoundary {
    pub fn new(config: HttpConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn send(&self, builder: RequestBuilder, headers: &Headers) -> Result<Value, HttpError> {
        let builder = headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::transport(e.to_string()))?;

        decode(response).await
    }
}

/// Join a base URL and an absolute API path without doubling the slash
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

async fn decode(response: Response) -> Result<Value, HttpError> {
    let status = response.status();
    trace!(status = status.as_u16(), "HTTP response");

    if !status.is_success() {
        let body = response.json::<Value>().await.ok();
        debug!(status = status.as_u16(), "HTTP request failed");
        return Err(HttpError::status(status.as_u16(), body));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| HttpError::transport(format!("Invalid JSON body: {}", e)))
}

#[async_trait]
impl HttpBoundary for ReqwestBoundary {
    async fn get(&self, path: &str, headers: &Headers) -> Result<Value, HttpError> {
        debug!(path, "GET");
        self.send(self.client.get(self.url(path)), headers).await
    }

    async fn post(&self, path: &str, body: &Value, headers: &Headers) -> Result<Value, HttpError> {
        debug!(path, "POST");
        self.send(self.client.post(self.url(path)).json(body), headers)
            .await
    }
}
