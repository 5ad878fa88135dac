//! Bounded event inbox — decouples inbound event intake from processing.
//!
//! Each bound session owns one of these. The server keeps buffering
//! received messages for a session until they are fetched, so the client
//! side mirrors that with a fixed-capacity queue plus a periodic flush
//! timer: producers enqueue raw event payloads, a consumer either pulls
//! them one at a time or lets [`EventInbox::flush_every`] hand over
//! accumulated batches on an interval.
//!
//! Uses tokio::sync::mpsc bounded channels.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

/// Default queue capacity for a freshly bound session.
pub const DEFAULT_CAPACITY: usize = 10;

/// Default flush interval for a freshly bound session.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

// ─────────────────────────────────────────────
// InboundEvent
// ─────────────────────────────────────────────

/// A single buffered event: the raw JSON payload plus intake time.
#[derive(Clone, Debug)]
pub struct InboundEvent {
    /// Raw event payload as received from the service.
    pub payload: Value,
    /// When the event entered the inbox.
    pub received_at: DateTime<Utc>,
}

impl InboundEvent {
    /// Wrap a payload, stamping it with the current time.
    pub fn new(payload: Value) -> Self {
        InboundEvent {
            payload,
            received_at: Utc::now(),
        }
    }
}

// ─────────────────────────────────────────────
// EventInbox
// ─────────────────────────────────────────────

/// Fixed-capacity event queue with a periodic drain timer.
///
/// Producers choose their overflow policy per call: [`try_push`] drops the
/// event when the queue is full (and reports it), [`push`] waits for space.
///
/// [`try_push`]: EventInbox::try_push
/// [`push`]: EventInbox::push
pub struct EventInbox {
    tx: mpsc::Sender<InboundEvent>,
    rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    capacity: usize,
    flush_interval: Duration,
}

impl EventInbox {
    /// Create an inbox with the given flush interval and queue capacity.
    pub fn new(flush_interval: Duration, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        EventInbox {
            tx,
            rx: tokio::sync::Mutex::new(rx),
            capacity,
            flush_interval,
        }
    }

    /// Create an inbox with the default capacity (10) and interval (1 s).
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_FLUSH_INTERVAL, DEFAULT_CAPACITY)
    }

    /// Queue capacity this inbox was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Flush interval used by [`EventInbox::flush_every`].
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Enqueue an event without waiting. Returns `false` if the event was
    /// dropped because the queue is full.
    pub fn try_push(&self, payload: Value) -> bool {
        match self.tx.try_send(InboundEvent::new(payload)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(ev)) => {
                trace!(received_at = %ev.received_at, "inbox full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Enqueue an event, waiting for space if the queue is full.
    pub async fn push(
        &self,
        payload: Value,
    ) -> Result<(), mpsc::error::SendError<InboundEvent>> {
        self.tx.send(InboundEvent::new(payload)).await
    }

    /// Get a clone of the producer handle, for feeding the inbox from a
    /// separate task.
    pub fn sender(&self) -> mpsc::Sender<InboundEvent> {
        self.tx.clone()
    }

    /// Pull the next event, waiting until one arrives.
    /// Returns `None` if all producer handles are dropped.
    pub async fn recv(&self) -> Option<InboundEvent> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }

    /// Sweep everything currently buffered, in arrival order, without
    /// waiting. Empty when nothing is queued.
    pub async fn drain(&self) -> Vec<InboundEvent> {
        let mut rx = self.rx.lock().await;
        let mut batch = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            batch.push(ev);
        }
        batch
    }

    /// Run the periodic drain loop: every flush interval, hand any
    /// accumulated events to `on_batch` as one batch.
    ///
    /// Runs until the surrounding task is dropped or aborted; empty ticks
    /// do not invoke the consumer.
    pub async fn flush_every<F>(&self, mut on_batch: F)
    where
        F: FnMut(Vec<InboundEvent>),
    {
        let mut interval = tokio::time::interval(self.flush_interval);
        loop {
            interval.tick().await;
            let batch = self.drain().await;
            if !batch.is_empty() {
                trace!(events = batch.len(), "flushing inbox batch");
                on_batch(batch);
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_push_then_recv() {
        let inbox = EventInbox::with_defaults();
        inbox.push(json!({"type": "FriendMessage"})).await.unwrap();

        let ev = inbox.recv().await.unwrap();
        assert_eq!(ev.payload["type"], "FriendMessage");
    }

    #[tokio::test]
    async fn test_try_push_drops_when_full() {
        let inbox = EventInbox::new(Duration::from_secs(1), 2);
        assert!(inbox.try_push(json!(1)));
        assert!(inbox.try_push(json!(2)));
        // Queue is at capacity — the third event is dropped.
        assert!(!inbox.try_push(json!(3)));

        let batch = inbox.drain().await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].payload, json!(1));
        assert_eq!(batch[1].payload, json!(2));
    }

    #[tokio::test]
    async fn test_drain_preserves_order() {
        let inbox = EventInbox::with_defaults();
        for i in 0..5 {
            inbox.push(json!(i)).await.unwrap();
        }

        let batch = inbox.drain().await;
        let values: Vec<i64> = batch.iter().map(|e| e.payload.as_i64().unwrap()).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_drain_empty_inbox() {
        let inbox = EventInbox::with_defaults();
        assert!(inbox.drain().await.is_empty());
    }

    #[tokio::test]
    async fn test_sender_clone_feeds_inbox() {
        let inbox = EventInbox::with_defaults();
        let tx = inbox.sender();
        tx.send(InboundEvent::new(json!({"from": "clone"})))
            .await
            .unwrap();

        let ev = inbox.recv().await.unwrap();
        assert_eq!(ev.payload["from"], "clone");
    }

    #[tokio::test]
    async fn test_flush_every_delivers_batches() {
        let inbox = std::sync::Arc::new(EventInbox::new(Duration::from_millis(10), 10));
        let (batch_tx, mut batch_rx) = mpsc::unbounded_channel();

        let flusher = {
            let inbox = inbox.clone();
            tokio::spawn(async move {
                inbox
                    .flush_every(move |batch| {
                        let _ = batch_tx.send(batch);
                    })
                    .await;
            })
        };

        inbox.push(json!("a")).await.unwrap();
        inbox.push(json!("b")).await.unwrap();

        let batch = tokio::time::timeout(Duration::from_secs(1), batch_rx.recv())
            .await
            .expect("flush timer never fired")
            .expect("flusher dropped");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].payload, json!("a"));
        assert_eq!(batch[1].payload, json!("b"));

        flusher.abort();
    }

    #[tokio::test]
    async fn test_received_at_is_monotonic_enough() {
        let before = Utc::now();
        let ev = InboundEvent::new(json!(null));
        assert!(ev.received_at >= before);
    }
}
