//! Server-sent event subscription with auto-reconnect.
//!
//! Each [`SseSubscription`] owns one background task holding at most one
//! live HTTP connection to a `.../stream` endpoint. Change events, connection
//! transitions, and malformed payloads are delivered in order over a single
//! channel as [`StreamEvent`]s. Lost connections are retried with exponential
//! backoff.
//!
//! # Example
//!
//! ```rust,ignore
//! use victus_api::{CatalogClient, ReconnectConfig, Resource, StreamEvent};
//!
//! let mut sub = client.subscribe(&Resource::Departments, ReconnectConfig::default());
//! while let Some(event) = sub.recv().await {
//!     match event {
//!         StreamEvent::Created(raw) | StreamEvent::Updated(raw) => println!("upsert {raw}"),
//!         StreamEvent::Deleted(raw) => println!("delete {raw}"),
//!         other => println!("{other:?}"),
//!     }
//! }
//! sub.close();
//! ```

mod decoder;
mod envelope;

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use decoder::{SseDecoder, SseFrame};
pub use envelope::ChangeKind;

// ── Channel capacity ─────────────────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;

// ── StreamEvent ──────────────────────────────────────────────────────

/// Everything a subscription reports, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An entity was created. Carries the raw record.
    Created(Value),
    /// An entity was updated. Carries the raw record.
    Updated(Value),
    /// An entity was deleted. Carries the raw record or a bare id.
    Deleted(Value),
    /// A connection (first or reconnected) was established.
    ConnectionOpened,
    /// The connection failed or dropped; a reconnect may follow.
    ConnectionLost { reason: String },
    /// A frame's payload could not be parsed. The connection stays up.
    Malformed { message: String },
}

impl StreamEvent {
    fn change(kind: ChangeKind, payload: Value) -> Self {
        match kind {
            ChangeKind::Created => Self::Created(payload),
            ChangeKind::Updated => Self::Updated(payload),
            ChangeKind::Deleted => Self::Deleted(payload),
        }
    }
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for stream reconnection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 500ms.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 4s.
    pub max_delay: Duration,

    /// Maximum consecutive reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            max_retries: None,
        }
    }
}

// ── SseSubscription ──────────────────────────────────────────────────

/// Handle to a running event-stream subscription.
///
/// Closing (or dropping) the handle is terminal: the background task is
/// cancelled, any pending backoff sleep is abandoned, and [`recv`](Self::recv)
/// yields nothing further.
pub struct SseSubscription {
    events: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SseSubscription {
    /// Spawn the connection loop for `url`. Must be called within a tokio runtime.
    ///
    /// Returns immediately; the first connection attempt happens in the
    /// background and is reported as [`StreamEvent::ConnectionOpened`] or
    /// [`StreamEvent::ConnectionLost`].
    pub fn subscribe(http: reqwest::Client, url: Url, reconnect: ReconnectConfig) -> Self {
        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            sse_loop(http, url, event_tx, reconnect, task_cancel).await;
        });

        Self {
            events,
            cancel,
            task,
        }
    }

    /// Wait for the next event. Returns `None` once the subscription is
    /// closed or the reconnect budget is exhausted.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.events.recv().await
    }

    /// Stop the subscription. No event is delivered after this returns.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.events.close();
        self.task.abort();
    }

    /// `true` once the background task has ended (closed, or gave up reconnecting).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SseSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

enum ReadOutcome {
    /// The consumer went away or the subscription was cancelled.
    Closed,
    /// The connection could not be established or dropped.
    Lost(String),
}

/// Main loop: connect → read → on loss, report, backoff → reconnect.
async fn sse_loop(
    http: reqwest::Client,
    url: Url,
    event_tx: mpsc::Sender<StreamEvent>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            outcome = connect_and_read(&http, &url, &event_tx, &cancel, &mut attempt) => outcome,
        };

        let reason = match outcome {
            ReadOutcome::Closed => break,
            ReadOutcome::Lost(reason) => reason,
        };

        tracing::warn!(path = url.path(), %reason, attempt, "Event stream lost");
        if !emit(&event_tx, &cancel, StreamEvent::ConnectionLost { reason }).await {
            break;
        }

        if let Some(max) = reconnect.max_retries {
            if attempt >= max {
                tracing::error!(
                    path = url.path(),
                    max_retries = max,
                    "Event stream reconnection limit reached, giving up"
                );
                break;
            }
        }

        let delay = calculate_backoff(attempt, &reconnect);
        tracing::info!(
            path = url.path(),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "Waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }

    tracing::debug!(path = url.path(), "Event stream loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open one connection and pump frames until it drops.
///
/// Resets `attempt` once the server accepts the stream.
async fn connect_and_read(
    http: &reqwest::Client,
    url: &Url,
    event_tx: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
    attempt: &mut u32,
) -> ReadOutcome {
    // The query string may carry the subscription key, so only the path is logged.
    tracing::info!(path = url.path(), "Connecting to event stream");

    let resp = match http
        .get(url.clone())
        .header(ACCEPT, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => return ReadOutcome::Lost(crate::Error::Transport(e).to_string()),
    };

    let status = resp.status();
    if !status.is_success() {
        return ReadOutcome::Lost(crate::Error::StreamConnect(format!("HTTP {status}")).to_string());
    }
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.is_empty() && !content_type.starts_with("text/event-stream") {
        return ReadOutcome::Lost(
            crate::Error::StreamConnect(format!("unexpected content type {content_type:?}"))
                .to_string(),
        );
    }

    *attempt = 0;
    tracing::info!(path = url.path(), "Event stream connected");
    if !emit(event_tx, cancel, StreamEvent::ConnectionOpened).await {
        return ReadOutcome::Closed;
    }

    let mut body = resp.bytes_stream();
    let mut decoder = SseDecoder::new();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return ReadOutcome::Closed,
            chunk = body.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        for frame in decoder.feed(&bytes) {
                            if let Some(event) = frame_to_event(&frame) {
                                if !emit(event_tx, cancel, event).await {
                                    return ReadOutcome::Closed;
                                }
                            }
                        }
                    }
                    Some(Err(e)) => return ReadOutcome::Lost(e.to_string()),
                    None => return ReadOutcome::Lost("stream ended by server".into()),
                }
            }
        }
    }
}

fn frame_to_event(frame: &SseFrame) -> Option<StreamEvent> {
    match envelope::parse_frame(frame) {
        Ok(Some((kind, payload))) => Some(StreamEvent::change(kind, payload)),
        Ok(None) => {
            tracing::trace!(event = ?frame.event, "Ignoring non-change frame");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Malformed event payload");
            Some(StreamEvent::Malformed {
                message: e.to_string(),
            })
        }
    }
}

/// Deliver an event unless cancelled. Returns `false` when the consumer is gone.
async fn emit(
    event_tx: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
    event: StreamEvent,
) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        sent = event_tx.send(event) => sent.is_ok(),
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// `delay = min(initial * 2^attempt, max)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let factor = 2_u32.saturating_pow(attempt);
    config
        .initial_delay
        .saturating_mul(factor)
        .min(config.max_delay)
}

// ── Tests ────────────────────────────────────────────────────────────
