//! Watch trait and per-kind markers
//!
//! Every kind gets a marker type whose associated `Payload` fixes the
//! decoded shape at compile time, so callbacks and channels stay typed.

use std::fmt;

use contracts::{EventKind, HealthCheck, KvPair, KvPairs, Node, ServiceCatalog, ServiceEntry, UserEvent};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{DecodeError, Result};
use crate::payload::Payload;

/// Binds an [`EventKind`] to its payload type.
pub trait Watch: Send + Sync + 'static {
    /// Decoded payload shape
    type Payload: DeserializeOwned + fmt::Debug + Send + Sync + 'static;

    /// Kind this marker stands for
    const KIND: EventKind;

    /// Value for a `null` body
    fn on_null() -> Self::Payload;

    /// Wrap a decoded payload into the untyped [`Payload`] union
    fn into_payload(payload: Self::Payload) -> Payload;
}

define_watch!(
    /// `key` watch: a single key/value entry, `None` once the key is deleted
    KeyWatch,
    EventKind::Key,
    Option<KvPair>,
    Key,
    None
);

define_watch!(
    /// `keyprefix` watch: every entry under a prefix
    KeyPrefixWatch,
    EventKind::KeyPrefix,
    KvPairs,
    KeyPrefix,
    Vec::new()
);

define_watch!(
    /// `services` watch: catalog of service names and tags
    ServicesWatch,
    EventKind::Services,
    ServiceCatalog,
    Services,
    ServiceCatalog::default()
);

define_watch!(
    /// `nodes` watch: catalog nodes
    NodesWatch,
    EventKind::Nodes,
    Vec<Node>,
    Nodes,
    Vec::new()
);

define_watch!(
    /// `service` watch: entries of one service
    ServiceWatch,
    EventKind::Service,
    Vec<ServiceEntry>,
    Service,
    Vec::new()
);

define_watch!(
    /// `checks` watch: health checks
    ChecksWatch,
    EventKind::Checks,
    Vec<HealthCheck>,
    Checks,
    Vec::new()
);

define_watch!(
    /// `event` watch: user events
    EventWatch,
    EventKind::Event,
    Vec<UserEvent>,
    Event,
    Vec::new()
);

/// Decode a raw body as the payload of watch `W`.
///
/// A `null` body yields the kind's empty value.
///
/// # Errors
/// [`DecodeError::Malformed`] on invalid JSON, wrong field types or truncated input
pub fn decode<W: Watch>(raw: &[u8]) -> Result<W::Payload> {
    let parsed: Option<W::Payload> = serde_json::from_slice(raw).map_err(|e| {
        trace!(kind = %W::KIND, error = %e, "payload decode failed");
        DecodeError::malformed(W::KIND, e)
    })?;

    Ok(parsed.unwrap_or_else(W::on_null))
}
