//! SentryBlueprint - Config Loader output
//!
//! Describes a complete sentry deployment: listen address, route, delivery
//! policy and observability settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use crate::error::ListenAddrError;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete sentry configuration blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentryBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Subscriber delivery settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging and metrics settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener settings, consumed by the ingress only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:8080", "localhost:8080", ":8080")
    #[serde(default = "default_address")]
    pub address: String,

    /// Route the watch handler posts to
    #[serde(default = "default_route")]
    pub route: String,

    /// Request body cap in bytes (None = unlimited)
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            route: default_route(),
            max_body_bytes: None,
        }
    }
}

impl ServerConfig {
    /// Parse the listen address
    pub fn listen_addr(&self) -> Result<ListenAddr, ListenAddrError> {
        ListenAddr::parse(&self.address)
    }
}

/// Listen address split into host and port.
///
/// The host may be a name; it is resolved when the listener binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenAddr {
    /// Host name or IP literal, IPv6 without brackets
    pub host: String,
    pub port: u16,
}

impl ListenAddr {
    /// Parse `host:port`. `":port"` binds all interfaces; IPv6 literals
    /// must be bracketed (`"[::1]:8080"`).
    pub fn parse(address: &str) -> Result<Self, ListenAddrError> {
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| ListenAddrError::MissingPort(address.to_string()))?;
        let port = port
            .parse()
            .map_err(|_| ListenAddrError::InvalidPort(address.to_string()))?;

        let host = match host {
            "" => "0.0.0.0",
            host => match host.strip_prefix('[') {
                Some(bracketed) => bracketed
                    .strip_suffix(']')
                    .filter(|ip| ip.parse::<IpAddr>().is_ok())
                    .ok_or_else(|| ListenAddrError::InvalidHost(address.to_string()))?,
                None if host.contains(':') || host.contains(char::is_whitespace) => {
                    return Err(ListenAddrError::InvalidHost(address.to_string()))
                }
                None => host,
            },
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Whether the host only accepts local connections
    pub fn is_loopback(&self) -> bool {
        self.host.eq_ignore_ascii_case("localhost")
            || self.host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
    }
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

fn default_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_route() -> String {
    "/".to_string()
}

/// Subscriber delivery settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Per-subscriber queue capacity; a full queue drops the newest notification
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Handling of repeated watch fires
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}

/// Handling of notifications that Consul fires more than once
/// (hashicorp/consul#571).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Deliver every notification, duplicates included
    #[default]
    AtLeastOnce,
    /// Drop a notification whose `X-Consul-Index` repeats the last one
    /// accepted for the same kind
    SuppressRepeatedIndex,
}

/// Logging and metrics settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Default log level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human readable
    #[default]
    Pretty,
    /// Compact single line
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let bp = SentryBlueprint::default();
        assert_eq!(bp.server.address, "0.0.0.0:8080");
        assert_eq!(bp.server.route, "/");
        assert_eq!(bp.delivery.queue_capacity, 64);
        assert_eq!(bp.delivery.duplicate_policy, DuplicatePolicy::AtLeastOnce);
        assert_eq!(bp.observability.metrics_port, None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let bp: SentryBlueprint =
            serde_json::from_str(r#"{"delivery":{"duplicate_policy":"suppress_repeated_index"}}"#)
                .unwrap();
        assert_eq!(
            bp.delivery.duplicate_policy,
            DuplicatePolicy::SuppressRepeatedIndex
        );
        assert_eq!(bp.delivery.queue_capacity, 64);
        assert_eq!(bp.server.route, "/");
    }

    #[test]
    fn test_listen_addr_shorthand() {
        let mut server = ServerConfig::default();
        assert_eq!(server.listen_addr().unwrap().port, 8080);

        server.address = ":9090".to_string();
        let addr = server.listen_addr().unwrap();
        assert_eq!(addr.host, "0.0.0.0");
        assert_eq!(addr.port, 9090);
        assert!(!addr.is_loopback());
    }

    #[test]
    fn test_listen_addr_hostnames_and_ipv6() {
        let addr = ListenAddr::parse("localhost:8080").unwrap();
        assert_eq!(addr.host, "localhost");
        assert!(addr.is_loopback());
        assert_eq!(addr.to_string(), "localhost:8080");

        let addr = ListenAddr::parse("consul-sentry.internal:0").unwrap();
        assert_eq!(addr.host, "consul-sentry.internal");
        assert!(!addr.is_loopback());

        let addr = ListenAddr::parse("[::1]:8080").unwrap();
        assert_eq!(addr.host, "::1");
        assert!(addr.is_loopback());
        assert_eq!(addr.to_string(), "[::1]:8080");
    }

    #[test]
    fn test_listen_addr_rejects_malformed() {
        assert_eq!(
            ListenAddr::parse("localhost"),
            Err(ListenAddrError::MissingPort("localhost".to_string()))
        );
        assert!(matches!(
            ListenAddr::parse("localhost:http"),
            Err(ListenAddrError::InvalidPort(_))
        ));
        assert!(matches!(
            ListenAddr::parse("localhost:70000"),
            Err(ListenAddrError::InvalidPort(_))
        ));
        assert!(matches!(ListenAddr::parse("::1:80"), Err(ListenAddrError::InvalidHost(_))));
        assert!(matches!(ListenAddr::parse("[nope]:80"), Err(ListenAddrError::InvalidHost(_))));
        assert!(matches!(ListenAddr::parse("my host:80"), Err(ListenAddrError::InvalidHost(_))));
    }

    #[test]
    fn test_max_body_bytes_defaults_to_unlimited() {
        let bp: SentryBlueprint =
            serde_json::from_str(r#"{"server":{"max_body_bytes":1048576}}"#).unwrap();
        assert_eq!(bp.server.max_body_bytes, Some(1_048_576));
        assert_eq!(bp.server.address, "0.0.0.0:8080");
        assert_eq!(ServerConfig::default().max_body_bytes, None);
    }
}
