// ── Dwelling feed ──
//
// The dwellings of one residential complex, kept current from the
// complex's own event stream. Opened on demand and closed when the view
// that needs it goes away; independent of the catalog store's state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use victus_api::{CatalogClient, ListFilter, Resource, SseSubscription, StreamEvent};

use super::catalog::{CatalogStore, echo_payload};
use super::collection::{from_records, remove_by_id, upsert};
use crate::error::CoreError;
use crate::model::Dwelling;
use crate::normalize::{extract_dwelling_id, normalize_dwelling};
use crate::requests::DwellingRequest;
use crate::stream::SnapshotStream;

/// Point-in-time view of one complex's dwellings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DwellingSnapshot {
    pub complex_id: String,
    pub dwellings: Arc<Vec<Dwelling>>,
    /// The event stream dropped; the list may have missed changes until
    /// it is re-listed on reconnect.
    pub stale: bool,
}

/// Live dwelling list for one complex.
pub struct DwellingFeed {
    inner: Arc<FeedInner>,
    cancel: CancellationToken,
    pump: Option<JoinHandle<()>>,
}

struct FeedInner {
    complex_id: String,
    client: CatalogClient,
    snapshot: watch::Sender<DwellingSnapshot>,
    optimistic: bool,
}

impl DwellingFeed {
    /// List the complex's dwellings and follow its event stream.
    ///
    /// The stream is opened before the listing so nothing published in
    /// between is lost. Closed automatically when the store shuts down.
    pub async fn open(store: &CatalogStore, complex_id: impl Into<String>) -> Result<Self, CoreError> {
        if store.is_shut_down() {
            return Err(CoreError::Shutdown);
        }
        let complex_id = complex_id.into();
        if complex_id.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "conjuntoId es obligatorio".into(),
            });
        }

        let client = store.client().clone();
        let resource = Resource::DwellingsOf(complex_id.clone());
        let subscription = client.subscribe(&resource, store.config().reconnect.clone());

        let raw = client.resource(resource).list(&ListFilter::default()).await?;
        let (snapshot, _) = watch::channel(DwellingSnapshot {
            complex_id: complex_id.clone(),
            dwellings: from_records(
                raw.iter()
                    .map(|r| owned_by(normalize_dwelling(r), &complex_id)),
            ),
            stale: false,
        });
        let count = snapshot.borrow().dwellings.len();
        info!(complex_id = %complex_id, count, "dwelling feed open");

        let inner = Arc::new(FeedInner {
            complex_id,
            client,
            snapshot,
            optimistic: store.config().optimistic_updates,
        });
        let cancel = store.cancel_token().child_token();
        let pump = tokio::spawn(pump(Arc::clone(&inner), subscription, cancel.clone()));

        Ok(Self {
            inner,
            cancel,
            pump: Some(pump),
        })
    }

    pub fn complex_id(&self) -> &str {
        &self.inner.complex_id
    }

    pub fn snapshot(&self) -> DwellingSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotStream<DwellingSnapshot> {
        SnapshotStream::new(self.inner.snapshot.subscribe())
    }

    /// Dwellings whose number, type or status contains `query`,
    /// case-insensitively. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<Dwelling> {
        search(&self.inner.snapshot.borrow().dwellings, query)
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create(&self, request: &DwellingRequest) -> Result<Dwelling, CoreError> {
        self.ensure_open()?;
        request.validate()?;
        let raw = self
            .inner
            .client
            .resource(Resource::DwellingsOf(self.inner.complex_id.clone()))
            .create(request)
            .await?;
        let dwelling = owned_by(normalize_dwelling(&raw), &self.inner.complex_id);
        self.merge(dwelling.clone());
        Ok(dwelling)
    }

    pub async fn update(&self, id: &str, request: &DwellingRequest) -> Result<Dwelling, CoreError> {
        self.ensure_open()?;
        request.validate()?;
        let raw = self
            .inner
            .client
            .resource(Resource::Dwellings)
            .update(id, request)
            .await?;
        let raw = if raw.is_object() {
            raw
        } else {
            echo_payload(id, request)?
        };
        let dwelling = owned_by(normalize_dwelling(&raw), &self.inner.complex_id);
        self.merge(dwelling.clone());
        Ok(dwelling)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.ensure_open()?;
        self.inner.client.resource(Resource::Dwellings).delete(id).await?;
        if self.inner.optimistic {
            self.inner.remove(id);
        }
        Ok(())
    }

    /// Stop following the stream. Terminal.
    pub fn close(&mut self) {
        self.cancel.cancel();
        if let Some(pump) = self.pump.take() {
            pump.abort();
            debug!(complex_id = %self.inner.complex_id, "dwelling feed closed");
        }
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            Err(CoreError::Shutdown)
        } else {
            Ok(())
        }
    }

    fn merge(&self, dwelling: Dwelling) {
        if self.inner.optimistic {
            self.inner.upsert(dwelling);
        }
    }
}

impl Drop for DwellingFeed {
    fn drop(&mut self) {
        self.close();
    }
}

impl FeedInner {
    fn upsert(&self, dwelling: Dwelling) {
        if dwelling.id.is_empty() {
            return;
        }
        self.snapshot.send_modify(|snap| {
            snap.dwellings = upsert(&snap.dwellings, dwelling);
        });
    }

    fn remove(&self, id: &str) {
        self.snapshot.send_if_modified(|snap| {
            let next = remove_by_id(&snap.dwellings, Some(id));
            if Arc::ptr_eq(&next, &snap.dwellings) {
                return false;
            }
            snap.dwellings = next;
            true
        });
    }

    async fn relist(&self) {
        let listed = self
            .client
            .resource(Resource::DwellingsOf(self.complex_id.clone()))
            .list(&ListFilter::default())
            .await;
        match listed {
            Ok(raw) => {
                let dwellings = from_records(
                    raw.iter()
                        .map(|r| owned_by(normalize_dwelling(r), &self.complex_id)),
                );
                info!(complex_id = %self.complex_id, count = dwellings.len(), "dwellings re-listed");
                self.snapshot.send_modify(|snap| {
                    snap.dwellings = dwellings;
                    snap.stale = false;
                });
            }
            Err(e) => warn!(complex_id = %self.complex_id, error = %e, "dwelling re-list failed"),
        }
    }
}

async fn pump(feed: Arc<FeedInner>, mut subscription: SseSubscription, cancel: CancellationToken) {
    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = subscription.recv() => event,
        };
        let Some(event) = event else {
            warn!(complex_id = %feed.complex_id, "dwelling stream ended");
            feed.snapshot.send_modify(|snap| snap.stale = true);
            break;
        };
        match event {
            StreamEvent::Created(raw) | StreamEvent::Updated(raw) => {
                feed.upsert(owned_by(normalize_dwelling(&raw), &feed.complex_id));
            }
            StreamEvent::Deleted(raw) => match extract_dwelling_id(&raw) {
                Some(id) => feed.remove(&id),
                None => debug!("dwelling delete event without id ignored"),
            },
            StreamEvent::ConnectionOpened => {
                let stale = feed.snapshot.borrow().stale;
                if stale {
                    feed.relist().await;
                }
            }
            StreamEvent::ConnectionLost { reason } => {
                warn!(complex_id = %feed.complex_id, %reason, "dwelling stream lost");
                feed.snapshot.send_if_modified(|snap| !std::mem::replace(&mut snap.stale, true));
            }
            StreamEvent::Malformed { message } => {
                warn!(complex_id = %feed.complex_id, %message, "ignoring malformed dwelling event");
            }
        }
    }
    subscription.close();
}

/// Fill in the owning complex when the record does not name one.
fn owned_by(mut dwelling: Dwelling, complex_id: &str) -> Dwelling {
    if dwelling.complex_id.is_empty() {
        complex_id.clone_into(&mut dwelling.complex_id);
    }
    dwelling
}

fn search(dwellings: &[Dwelling], query: &str) -> Vec<Dwelling> {
    let needle = query.trim().to_lowercase();
    dwellings
        .iter()
        .filter(|d| {
            needle.is_empty()
                || d.number.to_lowercase().contains(&needle)
                || d.dwelling_type.label().to_lowercase().contains(&needle)
                || d.status.label().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
