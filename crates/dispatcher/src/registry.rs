//! Subscriber registry
//!
//! One [`Topic`] per event kind, each holding an optional callback and a
//! set of subscriber handles. The whole table sits behind the sentry's
//! single lock.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{EventKind, RequestContext};
use decoder::{
    ChecksWatch, EventWatch, KeyPrefixWatch, KeyWatch, NodesWatch, ServiceWatch, ServicesWatch,
    Watch,
};

use crate::handle::{SubscriberHandle, SubscriberId};
use crate::metrics::MetricsSnapshot;

/// Callback invoked synchronously with each decoded payload
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Callback invoked with the request context of an unrecognized notification
pub type ErrorCallback = Arc<dyn Fn(&RequestContext) + Send + Sync>;

/// Callback slot and subscriber set of one kind
pub struct Topic<T> {
    callback: Option<Callback<T>>,
    subscribers: HashMap<SubscriberId, SubscriberHandle<T>>,
}

impl<T> Default for Topic<T> {
    fn default() -> Self {
        Self {
            callback: None,
            subscribers: HashMap::new(),
        }
    }
}

impl<T> Topic<T> {
    pub fn callback(&self) -> Option<Callback<T>> {
        self.callback.clone()
    }

    /// Replace the callback; `None` clears it
    pub fn set_callback(&mut self, callback: Option<Callback<T>>) {
        self.callback = callback;
    }

    pub fn insert(&mut self, handle: SubscriberHandle<T>) {
        self.subscribers.insert(handle.id(), handle);
    }

    /// Remove a subscriber, returning whether it was present
    pub fn remove(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Clone the current subscriber handles
    pub fn subscribers(&self) -> Vec<SubscriberHandle<T>> {
        self.subscribers.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    fn stats(&self) -> impl Iterator<Item = (SubscriberId, MetricsSnapshot)> + '_ {
        self.subscribers
            .values()
            .map(|h| (h.id(), h.snapshot()))
    }
}

/// The full per-kind table
#[derive(Default)]
pub struct Topics {
    key: Topic<<KeyWatch as Watch>::Payload>,
    key_prefix: Topic<<KeyPrefixWatch as Watch>::Payload>,
    services: Topic<<ServicesWatch as Watch>::Payload>,
    nodes: Topic<<NodesWatch as Watch>::Payload>,
    service: Topic<<ServiceWatch as Watch>::Payload>,
    checks: Topic<<ChecksWatch as Watch>::Payload>,
    event: Topic<<EventWatch as Watch>::Payload>,
    error_callback: Option<ErrorCallback>,
}

/// Selects the typed topic of a watch in [`Topics`]
pub trait Routed: Watch {
    fn topic(topics: &Topics) -> &Topic<Self::Payload>;

    fn topic_mut(topics: &mut Topics) -> &mut Topic<Self::Payload>;
}

macro_rules! impl_routed {
    ($($watch:ty => $field:ident, $variant:ident);* $(;)?) => {
        $(
            impl Routed for $watch {
                fn topic(topics: &Topics) -> &Topic<Self::Payload> {
                    &topics.$field
                }

                fn topic_mut(topics: &mut Topics) -> &mut Topic<Self::Payload> {
                    &mut topics.$field
                }
            }
        )*

        impl Topics {
            /// Subscriber count of `kind`
            pub fn subscriber_count(&self, kind: EventKind) -> usize {
                match kind {
                    $(EventKind::$variant => self.$field.len(),)*
                }
            }

            /// Whether `kind` has a callback
            pub fn has_callback(&self, kind: EventKind) -> bool {
                match kind {
                    $(EventKind::$variant => self.$field.callback.is_some(),)*
                }
            }

            /// Metrics of every subscriber, all kinds
            pub fn stats(&self) -> Vec<(EventKind, SubscriberId, MetricsSnapshot)> {
                let mut stats = Vec::new();
                $(
                    stats.extend(
                        self.$field
                            .stats()
                            .map(|(id, snapshot)| (EventKind::$variant, id, snapshot)),
                    );
                )*
                stats
            }
        }
    };
}

impl_routed!(
    KeyWatch => key, Key;
    KeyPrefixWatch => key_prefix, KeyPrefix;
    ServicesWatch => services, Services;
    NodesWatch => nodes, Nodes;
    ServiceWatch => service, Service;
    ChecksWatch => checks, Checks;
    EventWatch => event, Event;
);

impl Topics {
    pub fn error_callback(&self) -> Option<ErrorCallback> {
        self.error_callback.clone()
    }

    pub fn set_error_callback(&mut self, callback: Option<ErrorCallback>) {
        self.error_callback = callback;
    }
}
