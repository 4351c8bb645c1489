//! EventKind - the closed set of watch types the sentry understands
//!
//! Each kind owns a lower-case token that a watch handler sends in the
//! `type` header. Token matching is case-insensitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Watch notification category.
///
/// # Examples
/// ```
/// use contracts::EventKind;
///
/// assert_eq!(EventKind::resolve("KeyPrefix"), Some(EventKind::KeyPrefix));
/// assert_eq!(EventKind::Checks.as_str(), "checks");
/// assert_eq!(EventKind::resolve("bogus"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Single key change
    Key,
    /// Change under a key prefix
    KeyPrefix,
    /// Service catalog (name -> tags)
    Services,
    /// Node list
    Nodes,
    /// Entries of a single service
    Service,
    /// Health checks
    Checks,
    /// User events
    Event,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 7] = [
        EventKind::Key,
        EventKind::KeyPrefix,
        EventKind::Services,
        EventKind::Nodes,
        EventKind::Service,
        EventKind::Checks,
        EventKind::Event,
    ];

    /// Canonical wire token
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Key => "key",
            EventKind::KeyPrefix => "keyprefix",
            EventKind::Services => "services",
            EventKind::Nodes => "nodes",
            EventKind::Service => "service",
            EventKind::Checks => "checks",
            EventKind::Event => "event",
        }
    }

    /// Case-insensitive token lookup. Unknown tokens yield `None`.
    pub fn resolve(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(token))
    }

    /// Position in [`EventKind::ALL`], usable as a table index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for tokens that name no [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type '{0}'")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        for token in ["KEY", "Key", "key"] {
            assert_eq!(EventKind::resolve(token), Some(EventKind::Key));
        }
        assert_eq!(EventKind::resolve("KEYPREFIX"), Some(EventKind::KeyPrefix));
    }

    #[test]
    fn test_tokens_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::resolve(kind.as_str()), Some(kind));
            assert_eq!(kind.to_string().parse::<EventKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(EventKind::resolve("bogus"), None);
        assert_eq!(EventKind::resolve(""), None);
        let err = "bogus".parse::<EventKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown event type 'bogus'");
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_serde_uses_token() {
        let json = serde_json::to_string(&EventKind::KeyPrefix).unwrap();
        assert_eq!(json, "\"keyprefix\"");
    }
}
