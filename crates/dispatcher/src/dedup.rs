//! Watch index tracking for duplicate suppression
//!
//! Consul may fire the same watch twice with one index
//! (hashicorp/consul#571). The tracker remembers the last index accepted
//! per kind.

use std::sync::{Mutex, PoisonError};

use contracts::EventKind;

/// Last accepted index per kind
#[derive(Debug, Default)]
pub struct IndexTracker {
    last: Mutex<[Option<u64>; EventKind::ALL.len()]>,
}

impl IndexTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `index` for `kind` unless it repeats the last accepted one.
    ///
    /// Check and update happen atomically.
    pub fn accept(&self, kind: EventKind, index: u64) -> bool {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = &mut last[kind.index()];
        if *slot == Some(index) {
            return false;
        }
        *slot = Some(index);
        true
    }

    /// Last accepted index for `kind`
    pub fn last(&self, kind: EventKind) -> Option<u64> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner)[kind.index()]
    }
}
