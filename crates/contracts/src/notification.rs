//! Notification - Ingress output
//!
//! One pushed watch notification: the request context plus the raw body.

use bytes::Bytes;
use std::net::SocketAddr;

/// Header carrying the notification type token
pub const TYPE_HEADER: &str = "type";

/// Header carrying the Consul watch index
pub const INDEX_HEADER: &str = "x-consul-index";

/// Request metadata that travels with a notification.
///
/// Handed to the error callback when the type token is not recognized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Type token exactly as received (not lower-cased)
    pub type_token: String,

    /// Peer address, if the transport knows it
    pub remote_addr: Option<SocketAddr>,

    /// Parsed watch index, if present and numeric
    pub index: Option<u64>,

    /// All request headers (lower-case names)
    pub headers: Vec<(String, String)>,
}

impl RequestContext {
    /// Create a context carrying only a type token
    pub fn new(type_token: impl Into<String>) -> Self {
        Self {
            type_token: type_token.into(),
            ..Default::default()
        }
    }

    /// Set the watch index
    pub fn with_index(mut self, index: u64) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the peer address
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A pushed notification awaiting dispatch
#[derive(Debug, Clone)]
pub struct Notification {
    pub context: RequestContext,

    /// Raw payload bytes (zero-copy)
    pub body: Bytes,
}

impl Notification {
    pub fn new(context: RequestContext, body: impl Into<Bytes>) -> Self {
        Self {
            context,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut ctx = RequestContext::new("bogus");
        ctx.headers.push(("x-consul-index".into(), "42".into()));
        assert_eq!(ctx.header("X-Consul-Index"), Some("42"));
        assert_eq!(ctx.header("type"), None);
    }

    #[test]
    fn test_builder_helpers() {
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let ctx = RequestContext::new("key").with_index(7).with_remote_addr(addr);
        assert_eq!(ctx.index, Some(7));
        assert_eq!(ctx.remote_addr, Some(addr));
        assert_eq!(ctx.type_token, "key");
    }
}
