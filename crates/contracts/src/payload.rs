//! Watch payloads - decoder output
//!
//! Record shapes as emitted by Consul watch handlers. Field names are
//! PascalCase on the wire; byte fields are base64 strings and `null`
//! collections decode as empty. Missing fields take their default value.

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as, DefaultOnNull};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// Key/value entry (`key` watch, and each element of `keyprefix`)
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct KvPair {
    /// Full key path
    pub key: String,

    /// Raw value (base64 on the wire, `null` for keys without a value)
    #[serde_as(as = "DefaultOnNull<Base64>")]
    pub value: Vec<u8>,

    pub create_index: u64,

    pub modify_index: u64,

    pub lock_index: u64,

    pub flags: u64,

    /// Session holding the lock, empty if none
    pub session: String,
}

/// Entries under a key prefix
pub type KvPairs = Vec<KvPair>;

/// Service catalog: service name -> tags
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog(#[serde_as(as = "HashMap<_, DefaultOnNull>")] pub HashMap<String, Vec<String>>);

impl Deref for ServiceCatalog {
    type Target = HashMap<String, Vec<String>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ServiceCatalog {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<HashMap<String, Vec<String>>> for ServiceCatalog {
    fn from(map: HashMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

/// Catalog node
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Node {
    #[serde(rename = "ID")]
    pub id: String,

    /// Node name
    pub node: String,

    pub address: String,

    pub datacenter: String,

    #[serde_as(as = "DefaultOnNull")]
    pub tagged_addresses: HashMap<String, String>,

    #[serde_as(as = "DefaultOnNull")]
    pub meta: HashMap<String, String>,

    pub create_index: u64,

    pub modify_index: u64,
}

/// Service instance as registered on an agent
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AgentService {
    #[serde(rename = "ID")]
    pub id: String,

    /// Service name
    pub service: String,

    #[serde_as(as = "DefaultOnNull")]
    pub tags: Vec<String>,

    pub address: String,

    pub port: u16,

    pub enable_tag_override: bool,

    pub create_index: u64,

    pub modify_index: u64,
}

/// Health check result
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HealthCheck {
    pub node: String,

    #[serde(rename = "CheckID")]
    pub check_id: String,

    pub name: String,

    /// `passing`, `warning` or `critical`
    pub status: String,

    pub notes: String,

    pub output: String,

    #[serde(rename = "ServiceID")]
    pub service_id: String,

    pub service_name: String,

    #[serde_as(as = "DefaultOnNull")]
    pub service_tags: Vec<String>,
}

/// One entry of a `service` watch: node, service and its checks
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceEntry {
    pub node: Node,

    pub service: AgentService,

    #[serde_as(as = "DefaultOnNull")]
    pub checks: Vec<HealthCheck>,
}

/// User event fired through `consul event`
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserEvent {
    #[serde(rename = "ID")]
    pub id: String,

    pub name: String,

    /// Raw event payload (base64 on the wire)
    #[serde_as(as = "DefaultOnNull<Base64>")]
    pub payload: Vec<u8>,

    pub node_filter: String,

    pub service_filter: String,

    pub tag_filter: String,

    pub version: i32,

    /// Lamport time
    #[serde(rename = "LTime")]
    pub l_time: u64,
}
