//! SubscriberHandle - the sentry's side of one subscriber channel
//!
//! The sentry only ever holds the sending half. The receiving half is a
//! [`Subscription`] owned by the caller.

use std::fmt;
use std::sync::Arc;

use contracts::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::metrics::{MetricsSnapshot, SubscriberMetrics};

/// Identifier of a subscriber, unique within one sentry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

impl SubscriberId {
    /// Raw numeric id
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Result of a single non-blocking send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Queued for the subscriber
    Delivered,
    /// Queue full, notification dropped (newest)
    Dropped,
    /// Receiver dropped without unsubscribing
    Closed,
}

/// Handle to a registered subscriber
pub struct SubscriberHandle<T> {
    id: SubscriberId,
    kind: EventKind,
    /// Channel to the subscriber
    tx: mpsc::Sender<Arc<T>>,
    /// Shared metrics
    metrics: Arc<SubscriberMetrics>,
}

// Manual impl: `T` itself need not be `Clone`
impl<T> Clone for SubscriberHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            kind: self.kind,
            tx: self.tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T> SubscriberHandle<T> {
    /// Create a handle and its caller-owned subscription
    pub(crate) fn channel(
        id: SubscriberId,
        kind: EventKind,
        queue_capacity: usize,
    ) -> (Self, Subscription<T>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let handle = Self {
            id,
            kind,
            tx,
            metrics: Arc::new(SubscriberMetrics::new()),
        };
        let subscription = Subscription { id, kind, rx };
        (handle, subscription)
    }

    /// Subscriber id
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SubscriberMetrics> {
        &self.metrics
    }

    /// Notifications queued and not yet received
    pub fn queue_len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Metrics snapshot with the queue length read now
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.set_queue_len(self.queue_len());
        self.metrics.snapshot()
    }

    /// Send a notification to the subscriber (non-blocking)
    ///
    /// A full queue drops this notification; earlier ones stay queued.
    pub fn try_send(&self, payload: Arc<T>) -> SendStatus {
        match self.tx.try_send(payload) {
            Ok(()) => {
                self.metrics.inc_delivered_count();
                self.metrics.set_queue_len(self.queue_len());
                SendStatus::Delivered
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.inc_dropped_count();
                self.metrics.set_queue_len(self.tx.max_capacity());
                warn!(
                    kind = %self.kind,
                    subscriber_id = %self.id,
                    "Subscriber queue full, notification dropped"
                );
                SendStatus::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.metrics.inc_closed_count();
                debug!(
                    kind = %self.kind,
                    subscriber_id = %self.id,
                    "Subscriber receiver dropped without unsubscribing"
                );
                SendStatus::Closed
            }
        }
    }
}

/// Caller-owned receiving end of a subscriber channel.
///
/// Notifications arrive as `Arc<T>`: every subscriber of one dispatch shares
/// the same decoded value. After the subscription is removed from the
/// sentry, `recv` drains what is queued and then returns `None`.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriberId,
    kind: EventKind,
    rx: mpsc::Receiver<Arc<T>>,
}

impl<T> Subscription<T> {
    /// Subscriber id, used to unsubscribe
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Kind this subscription receives
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Wait for the next notification
    pub async fn recv(&mut self) -> Option<Arc<T>> {
        self.rx.recv().await
    }

    /// Take a queued notification without waiting
    pub fn try_recv(&mut self) -> Result<Arc<T>, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }

    /// Blocking receive for use outside the async runtime
    pub fn blocking_recv(&mut self) -> Option<Arc<T>> {
        self.rx.blocking_recv()
    }

    /// Number of queued notifications
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no notification is queued
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Unwrap into the underlying receiver
    pub fn into_inner(self) -> mpsc::Receiver<Arc<T>> {
        self.rx
    }
}
