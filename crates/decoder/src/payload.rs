//! Untyped payload union

use contracts::{EventKind, HealthCheck, KvPair, KvPairs, Node, ServiceCatalog, ServiceEntry, UserEvent};
use serde::Serialize;

/// Decoded payload of any kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Key(Option<KvPair>),
    KeyPrefix(KvPairs),
    Services(ServiceCatalog),
    Nodes(Vec<Node>),
    Service(Vec<ServiceEntry>),
    Checks(Vec<HealthCheck>),
    Event(Vec<UserEvent>),
}

impl Payload {
    /// Kind of this payload
    pub fn kind(&self) -> EventKind {
        match self {
            Payload::Key(_) => EventKind::Key,
            Payload::KeyPrefix(_) => EventKind::KeyPrefix,
            Payload::Services(_) => EventKind::Services,
            Payload::Nodes(_) => EventKind::Nodes,
            Payload::Service(_) => EventKind::Service,
            Payload::Checks(_) => EventKind::Checks,
            Payload::Event(_) => EventKind::Event,
        }
    }

    /// Number of records carried (0 or 1 for a single key)
    pub fn len(&self) -> usize {
        match self {
            Payload::Key(kv) => usize::from(kv.is_some()),
            Payload::KeyPrefix(v) => v.len(),
            Payload::Services(m) => m.len(),
            Payload::Nodes(v) => v.len(),
            Payload::Service(v) => v.len(),
            Payload::Checks(v) => v.len(),
            Payload::Event(v) => v.len(),
        }
    }

    /// Whether the payload carries no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
