//! Sync effect runner
//!
//! Every [`Request`] is routed to the worker task of its [`ChannelKey`].
//! A worker owns one FIFO queue and runs one request at a time, so two
//! requests on the same key never overlap on the network while requests on
//! different keys proceed in parallel.
//!
//! For each request the worker:
//! 1. executes it against the HTTP boundary and secure storage
//! 2. applies the response to the [`EntityStore`]
//! 3. broadcasts the response to subscribers
//! 4. hands it back to the submitter
//!
//! Workers are spawned on first use and retire after sitting idle for
//! `channel_idle_timeout`. A worker only retires while its queue is empty,
//! and `submit` enqueues under the same map entry lock, so no queued request
//! is ever dropped by retirement.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use memoneo_core::{ChannelKey, HttpBoundary, Request, Response, SecureStorage};
use memoneo_crypto::CipherService;
use memoneo_storage::{EntityStore, KeyStore};
use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::timeout;
use tracing::{Instrument, debug, info_span, trace};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::executor::Executor;

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

struct RunnerInner<H: HttpBoundary, S: SecureStorage> {
    executor: Executor<H, S>,
    store: Arc<RwLock<EntityStore>>,
    channels: DashMap<ChannelKey, mpsc::UnboundedSender<Envelope>>,
    events: broadcast::Sender<Response>,
    idle_timeout: Duration,
}

/// Schedules requests onto per-channel single-flight workers.
///
/// Cheap to clone; clones share the same workers and store. Must be used
/// from within a Tokio runtime.
pub struct SyncEffectRunner<H: HttpBoundary, S: SecureStorage> {
    inner: Arc<RunnerInner<H, S>>,
}

impl<H: HttpBoundary, S: SecureStorage> Clone for SyncEffectRunner<H, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H, S> SyncEffectRunner<H, S>
where
    H: HttpBoundary + 'static,
    S: SecureStorage + 'static,
{
    pub fn new(http: Arc<H>, storage: Arc<S>, config: SyncConfig) -> Self {
        let store = Arc::new(RwLock::new(EntityStore::new()));
        let keys = KeyStore::with_keys(storage, config.keys);
        let executor = Executor::new(
            http,
            keys,
            CipherService::new(config.cipher),
            config.recordings_root,
            Arc::clone(&store),
        );
        let (events, _) = broadcast::channel(config.event_channel_capacity.max(1));

        Self {
            inner: Arc::new(RunnerInner {
                executor,
                store,
                channels: DashMap::new(),
                events,
                idle_timeout: config.channel_idle_timeout,
            }),
        }
    }

    /// Queue a request on its channel.
    ///
    /// Invalid requests are rejected here with [`SyncError::Validation`] and
    /// never reach a worker or the store.
    pub fn submit(&self, request: Request) -> SyncResult<PendingResponse> {
        request.validate()?;

        let key = request.channel();
        trace!(op = request.name(), channel = %key, "Submitting request");
        self.inner.store.write().begin(&request);

        let (reply, rx) = oneshot::channel();
        let envelope = Envelope { request, reply };

        let mut slot = self
            .inner
            .channels
            .entry(key.clone())
            .or_insert_with(|| self.spawn_worker(key.clone()));

        if let Err(mpsc::error::SendError(envelope)) = slot.send(envelope) {
            // The worker is gone but its sender was still registered
            let sender = self.spawn_worker(key.clone());
            sender
                .send(envelope)
                .map_err(|_| SyncError::Channel(format!("worker for {} refused request", key)))?;
            *slot = sender;
        }
        drop(slot);

        Ok(PendingResponse { key, rx })
    }

    /// Submit and wait for the response
    pub async fn execute(&self, request: Request) -> SyncResult<Response> {
        self.submit(request)?.wait().await
    }

    /// Receive every response after it has been applied to the store
    pub fn subscribe(&self) -> broadcast::Receiver<Response> {
        self.inner.events.subscribe()
    }

    /// Copy of the current entity state
    pub fn snapshot(&self) -> EntityStore {
        self.inner.store.read().clone()
    }

    /// Read the entity state without copying it
    pub fn with_store<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
        f(&self.inner.store.read())
    }

    pub fn key_store(&self) -> &KeyStore<S> {
        self.inner.executor.key_store()
    }

    /// Number of channels with a live worker
    pub fn active_channels(&self) -> usize {
        self.inner.channels.len()
    }

    pub fn has_channel(&self, key: &ChannelKey) -> bool {
        self.inner.channels.contains_key(key)
    }

    fn spawn_worker(&self, key: ChannelKey) -> mpsc::UnboundedSender<Envelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::clone(&self.inner);
        let span = info_span!("channel", key = %key);

        debug!(channel = %key, "Spawning channel worker");
        tokio::spawn(run_worker(inner, key, rx).instrument(span));
        tx
    }
}

async fn run_worker<H, S>(
    inner: Arc<RunnerInner<H, S>>,
    key: ChannelKey,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
) where
    H: HttpBoundary + 'static,
    S: SecureStorage + 'static,
{
    loop {
        match timeout(inner.idle_timeout, rx.recv()).await {
            Ok(Some(Envelope { request, reply })) => {
                let op = request.name();
                let response = inner.executor.execute(request).await;

                inner.store.write().apply(&response);
                // No subscribers is fine
                let _ = inner.events.send(response.clone());

                if reply.send(response).is_err() {
                    debug!(op, "Submitter went away before the response");
                }
            }
            Ok(None) => break,
            Err(_) => {
                // Holding the entry lock while checking keeps submit from
                // slipping a request in between the check and the removal
                let retired = inner
                    .channels
                    .remove_if(&key, |_, _| rx.is_empty())
                    .is_some();
                if retired {
                    break;
                }
            }
        }
    }

    debug!("Channel worker retired");
}

/// Handle to the response of one submitted request
#[derive(Debug)]
pub struct PendingResponse {
    key: ChannelKey,
    rx: oneshot::Receiver<Response>,
}

impl PendingResponse {
    /// The channel the request was queued on
    pub fn channel(&self) -> &ChannelKey {
        &self.key
    }

    pub async fn wait(self) -> SyncResult<Response> {
        let Self { key, rx } = self;
        rx.await
            .map_err(|_| SyncError::Channel(format!("worker for {} stopped", key)))
    }
}
