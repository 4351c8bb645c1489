//! Per-dispatch delivery reporting

use contracts::EventKind;

use crate::handle::SendStatus;

/// Delivery counters for one dispatched notification.
///
/// `dropped` and `closed` signal slow or vanished subscribers back to the
/// caller; neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub kind: EventKind,
    /// Whether a callback was invoked
    pub callback: bool,
    /// Subscribers the notification was queued for
    pub delivered: usize,
    /// Subscribers whose queue was full
    pub dropped: usize,
    /// Subscribers whose receiver is gone
    pub closed: usize,
}

impl DeliveryReport {
    /// Empty report for `kind`
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            callback: false,
            delivered: 0,
            dropped: 0,
            closed: 0,
        }
    }

    /// Count one send
    pub fn record(&mut self, status: SendStatus) {
        match status {
            SendStatus::Delivered => self.delivered += 1,
            SendStatus::Dropped => self.dropped += 1,
            SendStatus::Closed => self.closed += 1,
        }
    }

    /// Number of subscribers attempted
    pub fn attempted(&self) -> usize {
        self.delivered + self.dropped + self.closed
    }

    /// Whether every subscriber received the notification
    pub fn is_complete(&self) -> bool {
        self.dropped == 0 && self.closed == 0
    }
}

/// What became of a handled notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Decoded and fanned out
    Delivered(DeliveryReport),
    /// Suppressed as a repeat of the last accepted index
    Duplicate { kind: EventKind, index: u64 },
    /// Type token not recognized; routed to the error callback
    Unrouted,
}
