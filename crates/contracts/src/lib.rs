//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Wire model
//! - Payloads follow the JSON encoding Consul watch handlers emit
//!   (PascalCase fields, base64 byte fields)
//! - The notification type travels in the `type` request header, the
//!   watch index in `X-Consul-Index`

mod blueprint;
mod error;
mod event_kind;
mod notification;
mod payload;

pub use blueprint::*;
pub use error::*;
pub use event_kind::{EventKind, UnknownEventKind};
pub use notification::{Notification, RequestContext, INDEX_HEADER, TYPE_HEADER};
pub use payload::*;
