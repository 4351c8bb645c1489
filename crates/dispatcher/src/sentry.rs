//! Sentry - decodes watch notifications and fans them out
//!
//! Per kind: one optional callback, invoked first on the calling task, then
//! a non-blocking send to every subscriber queue. The registry lock is held
//! only to mutate or to snapshot; never while calling out or sending.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use contracts::{
    DeliveryConfig, DuplicatePolicy, EventKind, HealthCheck, KvPair, KvPairs, Node, Notification,
    RequestContext, SentryBlueprint, ServiceCatalog, ServiceEntry, UserEvent,
};
use decoder::{
    decode, resolve, ChecksWatch, EventWatch, KeyPrefixWatch, KeyWatch, NodesWatch, Resolved,
    ServiceWatch, ServicesWatch,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::dedup::IndexTracker;
use crate::error::DispatchError;
use crate::handle::{SubscriberHandle, SubscriberId, Subscription};
use crate::metrics::MetricsSnapshot;
use crate::registry::{Callback, ErrorCallback, Routed, Topics};
use crate::report::{DeliveryReport, Outcome};

/// Run `$body` with `$w` aliased to the watch marker of `$kind`
macro_rules! with_watch {
    ($kind:expr, $w:ident => $body:expr) => {
        match $kind {
            EventKind::Key => {
                type $w = KeyWatch;
                $body
            }
            EventKind::KeyPrefix => {
                type $w = KeyPrefixWatch;
                $body
            }
            EventKind::Services => {
                type $w = ServicesWatch;
                $body
            }
            EventKind::Nodes => {
                type $w = NodesWatch;
                $body
            }
            EventKind::Service => {
                type $w = ServiceWatch;
                $body
            }
            EventKind::Checks => {
                type $w = ChecksWatch;
                $body
            }
            EventKind::Event => {
                type $w = EventWatch;
                $body
            }
        }
    };
}

/// Notification dispatcher
///
/// Construct one per listener and share it as `Arc<Sentry>`; there is no
/// global instance.
pub struct Sentry {
    /// Listen address, consumed by the ingress only
    address: String,
    /// Route, consumed by the ingress only
    route: String,
    /// Request body cap, consumed by the ingress only
    max_body_bytes: Option<usize>,
    delivery: DeliveryConfig,
    topics: RwLock<Topics>,
    indexes: IndexTracker,
    next_id: AtomicU64,
}

impl Default for Sentry {
    fn default() -> Self {
        Self::new()
    }
}

impl Sentry {
    /// Create a sentry with default settings
    pub fn new() -> Self {
        Self::with_config(DeliveryConfig::default())
    }

    /// Create a sentry with custom delivery settings
    pub fn with_config(delivery: DeliveryConfig) -> Self {
        let server = contracts::ServerConfig::default();
        Self {
            address: server.address,
            route: server.route,
            max_body_bytes: server.max_body_bytes,
            delivery,
            topics: RwLock::new(Topics::default()),
            indexes: IndexTracker::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a sentry from a loaded blueprint
    pub fn from_blueprint(blueprint: &SentryBlueprint) -> Self {
        let mut sentry = Self::with_config(blueprint.delivery);
        sentry.set_address(blueprint.server.address.clone());
        sentry.set_route(blueprint.server.route.clone());
        sentry.set_max_body_bytes(blueprint.server.max_body_bytes);
        sentry
    }

    /// Set the listen address used by the ingress
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    /// Set the route used by the ingress
    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = route.into();
    }

    /// Cap request bodies read by the ingress; `None` reads them whole
    pub fn set_max_body_bytes(&mut self, limit: Option<usize>) {
        self.max_body_bytes = limit;
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn max_body_bytes(&self) -> Option<usize> {
        self.max_body_bytes
    }

    pub fn delivery(&self) -> DeliveryConfig {
        self.delivery
    }

    fn read(&self) -> RwLockReadGuard<'_, Topics> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Topics> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Registration =====

    /// Install, replace or clear (`None`) the callback of watch `W`
    pub fn set_callback<W: Routed>(&self, callback: Option<Callback<W::Payload>>) {
        let installed = callback.is_some();
        W::topic_mut(&mut self.write()).set_callback(callback);
        debug!(kind = %W::KIND, installed, "Callback updated");
    }

    /// Register a new subscriber channel for watch `W`
    pub fn subscribe<W: Routed>(&self) -> Subscription<W::Payload> {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (handle, subscription) =
            SubscriberHandle::channel(id, W::KIND, self.delivery.queue_capacity);

        let count = {
            let mut topics = self.write();
            let topic = W::topic_mut(&mut topics);
            topic.insert(handle);
            topic.len()
        };

        observability::record_subscriber_count(W::KIND.as_str(), count);
        debug!(kind = %W::KIND, subscriber_id = %id, subscribers = count, "Subscriber added");
        subscription
    }

    /// Remove a subscriber of watch `W`; returns whether it was registered.
    ///
    /// Removing an absent subscriber is a no-op.
    pub fn unsubscribe<W: Routed>(&self, id: SubscriberId) -> bool {
        let (removed, count) = {
            let mut topics = self.write();
            let topic = W::topic_mut(&mut topics);
            (topic.remove(id), topic.len())
        };

        if removed {
            observability::record_subscriber_count(W::KIND.as_str(), count);
            debug!(kind = %W::KIND, subscriber_id = %id, subscribers = count, "Subscriber removed");
        }
        removed
    }

    /// Install, replace or clear (`None`) the unknown-type callback
    pub fn set_error_callback(&self, callback: Option<ErrorCallback>) {
        self.write().set_error_callback(callback);
    }

    /// Install or replace the unknown-type callback
    pub fn set_error_func<F>(&self, f: F)
    where
        F: Fn(&RequestContext) + Send + Sync + 'static,
    {
        self.set_error_callback(Some(Arc::new(f)));
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.read().subscriber_count(kind)
    }

    pub fn has_callback(&self, kind: EventKind) -> bool {
        self.read().has_callback(kind)
    }

    /// Metrics of every registered subscriber
    pub fn metrics(&self) -> Vec<(EventKind, SubscriberId, MetricsSnapshot)> {
        self.read().stats()
    }

    // ===== Dispatch =====

    /// Decode `raw` as `kind` and deliver it.
    ///
    /// On decode failure neither the callback nor any subscriber is reached.
    #[instrument(name = "sentry_dispatch", skip(self, kind, raw), fields(kind = %kind, bytes = raw.len()))]
    pub fn dispatch(&self, kind: EventKind, raw: &[u8]) -> Result<DeliveryReport, DispatchError> {
        with_watch!(kind, W => self.dispatch_as::<W>(raw))
    }

    /// Typed form of [`Sentry::dispatch`]
    pub fn dispatch_as<W: Routed>(&self, raw: &[u8]) -> Result<DeliveryReport, DispatchError> {
        let payload = decode::<W>(raw).map_err(|e| {
            observability::record_decode_failure(W::KIND.as_str());
            warn!(kind = %W::KIND, error = %e, "Notification decode failed");
            e
        })?;
        Ok(self.publish::<W>(payload))
    }

    /// Deliver an already decoded payload of watch `W`
    pub fn publish<W: Routed>(&self, payload: W::Payload) -> DeliveryReport {
        let mut report = DeliveryReport::new(W::KIND);

        // Lock released before calling out, so the callback may re-register
        let callback = W::topic(&self.read()).callback();
        if let Some(callback) = callback {
            callback(&payload);
            report.callback = true;
        }

        let subscribers = W::topic(&self.read()).subscribers();
        if !subscribers.is_empty() {
            let payload = Arc::new(payload);
            for subscriber in &subscribers {
                report.record(subscriber.try_send(Arc::clone(&payload)));
            }
        }

        observability::record_delivery(
            W::KIND.as_str(),
            report.delivered,
            report.dropped,
            report.closed,
        );
        trace!(
            kind = %W::KIND,
            callback = report.callback,
            delivered = report.delivered,
            dropped = report.dropped,
            closed = report.closed,
            "Notification delivered"
        );
        report
    }

    /// Route a pushed notification.
    ///
    /// Unknown tokens go to the error callback (or are dropped) and never
    /// fail. Known tokens are checked against the duplicate policy, then
    /// dispatched.
    #[instrument(
        name = "sentry_handle",
        skip(self, notification),
        fields(token = %notification.context.type_token, index = ?notification.context.index)
    )]
    pub fn handle(&self, notification: &Notification) -> Result<Outcome, DispatchError> {
        match resolve(&notification.context.type_token) {
            Resolved::Known(kind) => {
                observability::record_notification_received(kind.as_str());
                with_watch!(kind, W => self.handle_as::<W>(notification))
            }
            Resolved::Unknown(_) => {
                self.report_unrouted(&notification.context);
                Ok(Outcome::Unrouted)
            }
        }
    }

    fn handle_as<W: Routed>(&self, notification: &Notification) -> Result<Outcome, DispatchError> {
        match self.delivery.duplicate_policy {
            DuplicatePolicy::AtLeastOnce => {
                self.dispatch_as::<W>(&notification.body).map(Outcome::Delivered)
            }
            DuplicatePolicy::SuppressRepeatedIndex => {
                let index = notification
                    .context
                    .index
                    .ok_or(DispatchError::MissingIndex { kind: W::KIND })?;

                // Decode before recording, so a bad body does not consume its index
                let payload = decode::<W>(&notification.body).map_err(|e| {
                    observability::record_decode_failure(W::KIND.as_str());
                    warn!(kind = %W::KIND, error = %e, "Notification decode failed");
                    e
                })?;

                if !self.indexes.accept(W::KIND, index) {
                    observability::record_duplicate(W::KIND.as_str());
                    debug!(kind = %W::KIND, index, "Duplicate notification suppressed");
                    return Ok(Outcome::Duplicate {
                        kind: W::KIND,
                        index,
                    });
                }
                Ok(Outcome::Delivered(self.publish::<W>(payload)))
            }
        }
    }

    fn report_unrouted(&self, context: &RequestContext) {
        observability::record_notification_unrouted();
        let callback = self.read().error_callback();
        match callback {
            Some(callback) => callback(context),
            None => debug!(
                token = %context.type_token,
                remote_addr = ?context.remote_addr,
                "Unknown notification type dropped"
            ),
        }
    }
}

/// Typed per-kind surface: `set_X_func`, `clear_X_func`, `X_channel`,
/// `delete_X_channel`
macro_rules! watch_accessors {
    ($($watch:ty, $payload:ty => $set:ident, $clear:ident, $channel:ident, $delete:ident;)*) => {
        impl Sentry {
            $(
                #[doc = concat!("Install or replace the `", stringify!($watch), "` callback")]
                pub fn $set<F>(&self, f: F)
                where
                    F: Fn(&$payload) + Send + Sync + 'static,
                {
                    self.set_callback::<$watch>(Some(Arc::new(f)));
                }

                #[doc = concat!("Clear the `", stringify!($watch), "` callback")]
                pub fn $clear(&self) {
                    self.set_callback::<$watch>(None);
                }

                #[doc = concat!("Subscribe a new `", stringify!($watch), "` channel")]
                pub fn $channel(&self) -> Subscription<$payload> {
                    self.subscribe::<$watch>()
                }

                #[doc = concat!("Unsubscribe a `", stringify!($watch), "` channel")]
                pub fn $delete(&self, subscription: &Subscription<$payload>) -> bool {
                    self.unsubscribe::<$watch>(subscription.id())
                }
            )*
        }
    };
}

watch_accessors! {
    KeyWatch, Option<KvPair> => set_key_func, clear_key_func, key_channel, delete_key_channel;
    KeyPrefixWatch, KvPairs => set_key_prefix_func, clear_key_prefix_func, key_prefix_channel, delete_key_prefix_channel;
    ServicesWatch, ServiceCatalog => set_services_func, clear_services_func, services_channel, delete_services_channel;
    NodesWatch, Vec<Node> => set_nodes_func, clear_nodes_func, nodes_channel, delete_nodes_channel;
    ServiceWatch, Vec<ServiceEntry> => set_service_func, clear_service_func, service_channel, delete_service_channel;
    ChecksWatch, Vec<HealthCheck> => set_checks_func, clear_checks_func, checks_channel, delete_checks_channel;
    EventWatch, Vec<UserEvent> => set_event_func, clear_event_func, event_channel, delete_event_channel;
}

impl std::fmt::Debug for Sentry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sentry")
            .field("address", &self.address)
            .field("route", &self.route)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a Sentry
#[derive(Debug, Clone, Default)]
pub struct SentryBuilder {
    blueprint: SentryBlueprint,
}

impl SentryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded blueprint
    pub fn from_blueprint(blueprint: SentryBlueprint) -> Self {
        Self { blueprint }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.blueprint.server.address = address.into();
        self
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.blueprint.server.route = route.into();
        self
    }

    pub fn max_body_bytes(mut self, limit: Option<usize>) -> Self {
        self.blueprint.server.max_body_bytes = limit;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.blueprint.delivery.queue_capacity = capacity;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.blueprint.delivery.duplicate_policy = policy;
        self
    }

    /// Build the sentry
    pub fn build(self) -> Sentry {
        info!(
            address = %self.blueprint.server.address,
            route = %self.blueprint.server.route,
            max_body_bytes = ?self.blueprint.server.max_body_bytes,
            queue_capacity = self.blueprint.delivery.queue_capacity,
            duplicate_policy = ?self.blueprint.delivery.duplicate_policy,
            "Sentry configured"
        );
        Sentry::from_blueprint(&self.blueprint)
    }
}
