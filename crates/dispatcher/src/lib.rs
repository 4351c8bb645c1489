//! # Dispatcher
//!
//! 通知分发模块。
//!
//! 负责：
//! - 按类型解码 Consul watch 通知
//! - 先调用回调，再 Fan-out 到所有订阅通道
//! - 隔离慢订阅者，不阻塞主链路

pub mod dedup;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod registry;
pub mod report;
pub mod sentry;

pub use contracts::{DuplicatePolicy, EventKind, Notification, RequestContext};
pub use decoder::{
    ChecksWatch, EventWatch, KeyPrefixWatch, KeyWatch, NodesWatch, ServiceWatch, ServicesWatch,
    Watch,
};
pub use dedup::IndexTracker;
pub use error::DispatchError;
pub use handle::{SendStatus, SubscriberHandle, SubscriberId, Subscription};
pub use metrics::{MetricsSnapshot, SubscriberMetrics};
pub use registry::{Callback, ErrorCallback, Routed};
pub use report::{DeliveryReport, Outcome};
pub use sentry::{Sentry, SentryBuilder};
