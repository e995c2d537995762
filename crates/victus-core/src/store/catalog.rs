// ── Catalog store ──
//
// Owns the cached catalogs and drives their lifecycle:
//
//   Idle → Hydrating → Live ⇄ Degraded → Recovering → Live
//
// One pump task per catalog kind reads its event stream and applies
// changes while Live. A lost stream (or a failed hydration) discards the
// cache and arms a retry timer; a stream reconnect or the timer firing
// starts a recovery. Concurrent hydration triggers share one request set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use victus_api::{CatalogClient, ListFilter, StreamEvent};

use super::snapshot::{CatalogSnapshot, Hydrated, SyncState};
use crate::config::CatalogConfig;
use crate::error::CoreError;
use crate::model::{CatalogEntity, CatalogKind, Identified};
use crate::normalize::{
    extract_id, normalize, normalize_administrator, normalize_city, normalize_complex,
    normalize_department,
};
use crate::stream::SnapshotStream;

type SharedHydration = Shared<BoxFuture<'static, Result<(), CoreError>>>;

/// What started a recovery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecoveryTrigger {
    Reconnect,
    Timer,
}

// ── CatalogStore ─────────────────────────────────────────────────────

/// The catalog synchronization layer.
///
/// Cheaply cloneable via `Arc<StoreInner>`. Construct once per
/// application, call [`start()`](Self::start) to hydrate and follow the
/// event streams, read with [`snapshot()`](Self::snapshot) or
/// [`subscribe()`](Self::subscribe), and mutate through
/// [`create()`](Self::create) / [`update()`](Self::update) /
/// [`delete()`](Self::delete).
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    config: CatalogConfig,
    client: CatalogClient,
    snapshot: watch::Sender<CatalogSnapshot>,
    /// Liveness flag: cancelled by `shutdown()`. Results of REST calls
    /// that finish afterwards are discarded.
    cancel: CancellationToken,
    /// Set by `start()`; without it the store never opens streams or
    /// schedules retries (one-shot use).
    started: AtomicBool,
    /// In-flight hydration, shared by every concurrent trigger.
    hydration: Mutex<Option<SharedHydration>>,
    /// Held while a reconnect- or timer-triggered recovery runs.
    recovering: AtomicBool,
    /// A stream dropped while a hydration was in flight; its result
    /// can't be trusted.
    stream_gap: AtomicBool,
    retry_timer: Mutex<Option<JoinHandle<()>>>,
    pumps: Mutex<HashMap<CatalogKind, JoinHandle<()>>>,
}

impl CatalogStore {
    /// Build a store from configuration. Does not touch the network.
    pub fn new(config: CatalogConfig) -> Result<Self, CoreError> {
        let client = CatalogClient::new(&config.api_url, config.stream_base(), &config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Build a store around an existing client (tests, custom transports).
    pub fn with_client(config: CatalogConfig, client: CatalogClient) -> Self {
        let (snapshot, _) = watch::channel(CatalogSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                config,
                client,
                snapshot,
                cancel: CancellationToken::new(),
                started: AtomicBool::new(false),
                hydration: Mutex::new(None),
                recovering: AtomicBool::new(false),
                stream_gap: AtomicBool::new(false),
                retry_timer: Mutex::new(None),
                pumps: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    pub(crate) fn client(&self) -> &CatalogClient {
        &self.inner.client
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current snapshot.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    pub fn state(&self) -> SyncState {
        self.inner.snapshot.borrow().state
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> SnapshotStream<CatalogSnapshot> {
        SnapshotStream::new(self.inner.snapshot.subscribe())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open the event streams and run the initial hydration.
    ///
    /// A failed hydration leaves the store `Degraded` with a retry armed;
    /// the error is returned for reporting but needs no handling.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.ensure_open()?;
        if self.inner.started.swap(true, Ordering::AcqRel) {
            debug!("catalog store already started");
            return self.refresh().await;
        }
        info!(api = %self.inner.client.base_url(), "starting catalog store");
        self.ensure_subscriptions();
        self.refresh().await
    }

    /// Run (or join) a full hydration and return its outcome.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.ensure_open()?;
        self.hydration().await
    }

    /// Stop every task, timer and stream. Terminal.
    pub fn shutdown(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();
        self.clear_retry();
        for (kind, handle) in lock(&self.inner.pumps).drain() {
            debug!(%kind, "closing event stream");
            handle.abort();
        }
        self.inner.snapshot.send_modify(|snap| snap.state = SyncState::Idle);
        info!("catalog store shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            Err(CoreError::Shutdown)
        } else {
            Ok(())
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create an entity. On success the normalized result is merged into
    /// the cache right away when optimistic updates are on.
    pub async fn create<B: Serialize + Sync>(
        &self,
        kind: CatalogKind,
        payload: &B,
    ) -> Result<CatalogEntity, CoreError> {
        self.ensure_open()?;
        let raw = self.inner.client.resource(kind.resource()).create(payload).await?;
        let entity = normalize(kind, &raw);
        debug!(%kind, id = entity.id(), "created");
        self.merge_optimistic(entity.clone());
        Ok(entity)
    }

    /// Update an entity by id. A server that answers with an empty body
    /// gets the submitted payload echoed back as the result.
    pub async fn update<B: Serialize + Sync>(
        &self,
        kind: CatalogKind,
        id: &str,
        payload: &B,
    ) -> Result<CatalogEntity, CoreError> {
        self.ensure_open()?;
        let raw = self
            .inner
            .client
            .resource(kind.resource())
            .update(id, payload)
            .await?;
        let raw = if raw.is_object() {
            raw
        } else {
            echo_payload(id, payload)?
        };
        let entity = normalize(kind, &raw);
        debug!(%kind, id, "updated");
        self.merge_optimistic(entity.clone());
        Ok(entity)
    }

    /// Delete an entity by id, cascading in the cache.
    pub async fn delete(&self, kind: CatalogKind, id: &str) -> Result<(), CoreError> {
        self.ensure_open()?;
        self.inner.client.resource(kind.resource()).delete(id).await?;
        debug!(%kind, id, "deleted");
        if self.optimistic() {
            self.inner.snapshot.send_modify(|snap| snap.remove(kind, id));
        }
        Ok(())
    }

    fn optimistic(&self) -> bool {
        self.inner.config.optimistic_updates && self.state() == SyncState::Live
    }

    fn merge_optimistic(&self, entity: CatalogEntity) {
        if self.optimistic() && !entity.id().is_empty() {
            self.inner.snapshot.send_modify(|snap| snap.upsert(entity));
        }
    }

    // ── Hydration ────────────────────────────────────────────────────

    /// The in-flight hydration, or a new one.
    fn hydration(&self) -> SharedHydration {
        let mut slot = lock(&self.inner.hydration);
        if let Some(in_flight) = slot.as_ref() {
            debug!("joining in-flight hydration");
            return in_flight.clone();
        }
        let store = self.clone();
        let fut = async move {
            let result = store.run_hydration().await;
            *lock(&store.inner.hydration) = None;
            result
        }
        .boxed()
        .shared();
        *slot = Some(fut.clone());
        fut
    }

    async fn run_hydration(&self) -> Result<(), CoreError> {
        self.ensure_open()?;

        let mut entered = SyncState::Hydrating;
        self.inner.stream_gap.store(false, Ordering::Release);
        self.inner.snapshot.send_modify(|snap| {
            if matches!(snap.state, SyncState::Degraded | SyncState::Recovering) {
                snap.state = SyncState::Recovering;
            } else {
                snap.state = SyncState::Hydrating;
            }
            entered = snap.state;
        });
        info!(state = %entered, "hydrating catalogs");

        let fetched = self.fetch_all().await;

        // In-flight requests are allowed to finish; their result is
        // dropped once the store is gone.
        if self.inner.cancel.is_cancelled() {
            debug!("store shut down during hydration, discarding result");
            return Err(CoreError::Shutdown);
        }

        match fetched {
            Ok(_) if self.inner.stream_gap.swap(false, Ordering::AcqRel) => {
                let message = "event stream lost during hydration".to_owned();
                self.enter_degraded(&message);
                Err(CoreError::Transport {
                    message,
                    timeout: false,
                })
            }
            Ok(hydrated) => {
                self.clear_retry();
                self.inner.snapshot.send_modify(|snap| {
                    snap.replace_all(hydrated);
                    snap.state = SyncState::Live;
                });
                let snap = self.snapshot();
                info!(
                    departments = snap.departments.len(),
                    cities = snap.cities.len(),
                    complexes = snap.complexes.len(),
                    administrators = snap.administrators.len(),
                    "catalogs live"
                );
                Ok(())
            }
            Err(e) => {
                self.enter_degraded(&format!("hydration failed: {e}"));
                Err(e)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Hydrated, CoreError> {
        let all = ListFilter::default();
        let complexes_filter = ListFilter {
            page: self.inner.config.page_size.map(|_| 0),
            size: self.inner.config.page_size,
            ..ListFilter::default()
        };
        let client = &self.inner.client;

        let (departments, cities, complexes, administrators) = futures_util::future::try_join4(
            client.departments().list(&all),
            client.cities().list(&all),
            client.complexes().list(&complexes_filter),
            client.administrators().list(&all),
        )
        .await?;

        Ok(Hydrated {
            departments: departments.iter().map(normalize_department).collect(),
            cities: cities.iter().map(normalize_city).collect(),
            complexes: complexes.iter().map(normalize_complex).collect(),
            administrators: administrators.iter().map(normalize_administrator).collect(),
        })
    }

    // ── Degraded / recovery ──────────────────────────────────────────

    /// Discard the cache and arm the retry timer.
    fn enter_degraded(&self, reason: &str) {
        let mut was = SyncState::Idle;
        self.inner.snapshot.send_modify(|snap| {
            was = snap.state;
            snap.clear();
            snap.state = SyncState::Degraded;
        });
        if was != SyncState::Degraded {
            warn!(from = %was, %reason, "catalog store degraded, cache discarded");
        }
        self.schedule_retry();
    }

    /// Arm (or re-arm) the single retry timer.
    fn schedule_retry(&self) {
        if !self.inner.started.load(Ordering::Acquire) || self.inner.cancel.is_cancelled() {
            return;
        }
        let mut slot = lock(&self.inner.retry_timer);
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let store = self.clone();
        let delay = self.inner.config.retry_interval;
        let cancel = self.inner.cancel.clone();
        *slot = Some(tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
            // Release the slot so a failed recovery can arm a fresh timer.
            drop(lock(&store.inner.retry_timer).take());
            store.recover(RecoveryTrigger::Timer).await;
        }));
        debug!(delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), "retry scheduled");
    }

    fn clear_retry(&self) {
        if let Some(handle) = lock(&self.inner.retry_timer).take() {
            handle.abort();
        }
    }

    /// Rehydrate after a failure. Reconnect and timer triggers exclude each
    /// other: one that finds a recovery running is dropped.
    async fn recover(&self, trigger: RecoveryTrigger) {
        let Some(_guard) = RecoveryGuard::acquire(&self.inner.recovering) else {
            debug!(?trigger, "recovery already running, dropping trigger");
            return;
        };
        if self.state() == SyncState::Live {
            debug!(?trigger, "already live, nothing to recover");
            return;
        }
        // A timer trigger already released its own slot.
        self.clear_retry();
        info!(?trigger, "recovering catalogs");
        match self.hydration().await {
            Ok(()) => {
                info!(?trigger, "catalog store recovered");
                self.ensure_subscriptions();
            }
            Err(e) => debug!(?trigger, error = %e, "recovery failed"),
        }
    }

    // ── Event streams ────────────────────────────────────────────────

    /// Open a pump for every kind that has none, or whose subscription
    /// gave up reconnecting.
    fn ensure_subscriptions(&self) {
        if !self.inner.started.load(Ordering::Acquire) || self.inner.cancel.is_cancelled() {
            return;
        }
        let mut pumps = lock(&self.inner.pumps);
        for kind in [
            CatalogKind::Department,
            CatalogKind::City,
            CatalogKind::Complex,
            CatalogKind::Administrator,
        ] {
            if pumps.get(&kind).is_some_and(|h| !h.is_finished()) {
                continue;
            }
            if pumps.contains_key(&kind) {
                info!(%kind, "reopening event stream");
            }
            let subscription = self
                .inner
                .client
                .subscribe(&kind.resource(), self.inner.config.reconnect.clone());
            pumps.insert(kind, tokio::spawn(pump(self.clone(), kind, subscription)));
        }
    }

    fn handle_stream_event(&self, kind: CatalogKind, event: StreamEvent) {
        match event {
            StreamEvent::Created(raw) | StreamEvent::Updated(raw) => self.apply_upsert(kind, &raw),
            StreamEvent::Deleted(raw) => self.apply_delete(kind, &raw),
            StreamEvent::ConnectionOpened => {
                if self.state() == SyncState::Degraded {
                    info!(%kind, "event stream back while degraded, recovering");
                    let store = self.clone();
                    tokio::spawn(async move { store.recover(RecoveryTrigger::Reconnect).await });
                }
            }
            StreamEvent::ConnectionLost { reason } => match self.state() {
                SyncState::Live => {
                    self.enter_degraded(&format!("{kind} stream lost: {reason}"));
                }
                SyncState::Hydrating | SyncState::Recovering => {
                    warn!(%kind, %reason, "stream lost during hydration, result will be discarded");
                    self.inner.stream_gap.store(true, Ordering::Release);
                }
                state => debug!(%kind, %state, %reason, "stream lost while not live"),
            },
            StreamEvent::Malformed { message } => {
                warn!(%kind, %message, "ignoring malformed event");
            }
        }
    }

    fn apply_upsert(&self, kind: CatalogKind, raw: &Value) {
        let entity = normalize(kind, raw);
        if entity.id().is_empty() {
            debug!(%kind, "event without id ignored");
            return;
        }
        self.inner.snapshot.send_if_modified(|snap| {
            if snap.state != SyncState::Live {
                debug!(%kind, state = %snap.state, "event discarded");
                return false;
            }
            snap.upsert(entity);
            true
        });
    }

    fn apply_delete(&self, kind: CatalogKind, raw: &Value) {
        let Some(id) = extract_id(kind, raw) else {
            debug!(%kind, "delete event without id ignored");
            return;
        };
        self.inner.snapshot.send_if_modified(|snap| {
            if snap.state != SyncState::Live {
                debug!(%kind, state = %snap.state, "event discarded");
                return false;
            }
            snap.remove(kind, &id);
            true
        });
    }
}

/// Feed one kind's stream into the store until it ends or the store shuts down.
async fn pump(store: CatalogStore, kind: CatalogKind, mut subscription: victus_api::SseSubscription) {
    let cancel = store.inner.cancel.clone();
    // Only the first loss after a connection counts; failed reconnect
    // attempts repeat it.
    let mut connected = true;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = subscription.recv() => {
                let Some(event) = event else {
                    warn!(%kind, "event stream ended");
                    break;
                };
                match event {
                    StreamEvent::ConnectionLost { .. } if !connected => {
                        debug!(%kind, "event stream still down");
                    }
                    event => {
                        connected = match event {
                            StreamEvent::ConnectionOpened => true,
                            StreamEvent::ConnectionLost { .. } => false,
                            _ => connected,
                        };
                        store.handle_stream_event(kind, event);
                    }
                }
            }
        }
    }
    subscription.close();
}

/// Resets the recovery flag on drop, including when the task is aborted.
struct RecoveryGuard<'a>(&'a AtomicBool);

impl<'a> RecoveryGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RecoveryGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub(super) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Submitted payload plus the id, for servers that answer updates with
/// an empty body.
pub(super) fn echo_payload<B: Serialize>(id: &str, payload: &B) -> Result<Value, CoreError> {
    let mut value = serde_json::to_value(payload).map_err(|e| CoreError::Internal(e.to_string()))?;
    if let Value::Object(ref mut map) = value {
        map.insert("id".into(), Value::String(id.to_owned()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn echo_payload_adds_id() {
        let echoed = echo_payload("7", &json!({ "nombre": "Caldas" })).unwrap_or_default();
        assert_eq!(echoed, json!({ "nombre": "Caldas", "id": "7" }));
    }

    #[test]
    fn recovery_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let first = RecoveryGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(RecoveryGuard::acquire(&flag).is_none());
        drop(first);
        assert!(RecoveryGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn dropped_reconnect_trigger_keeps_retry_timer() {
        let store = CatalogStore::new(CatalogConfig::default()).unwrap_or_else(|e| panic!("{e}"));
        store.inner.started.store(true, Ordering::Release);
        store.enter_degraded("test");
        assert!(lock(&store.inner.retry_timer).is_some());

        // Another recovery holds the guard; the reconnect trigger loses.
        let held = RecoveryGuard::acquire(&store.inner.recovering);
        store.recover(RecoveryTrigger::Reconnect).await;
        assert!(lock(&store.inner.retry_timer).is_some());

        drop(held);
        store.shutdown();
    }

    #[tokio::test]
    async fn shut_down_store_rejects_work() {
        let store = CatalogStore::new(CatalogConfig::default()).unwrap_or_else(|e| panic!("{e}"));
        store.shutdown();
        assert!(store.is_shut_down());
        assert_eq!(store.refresh().await, Err(CoreError::Shutdown));
        assert_eq!(
            store.delete(CatalogKind::City, "1").await,
            Err(CoreError::Shutdown)
        );
    }
}
