//! # Decoder
//!
//! Event type registry and payload decoding.
//!
//! Responsibilities:
//! - Resolve a `type` token to an [`EventKind`] (case-insensitive)
//! - Decode a raw JSON body into the payload shape of that kind
//! - Bind each kind to its payload type at compile time ([`Watch`])
//!
//! ## Usage Example
//!
//! ```
//! use decoder::{decode, resolve, KeyWatch, Resolved};
//! use contracts::EventKind;
//!
//! assert_eq!(resolve("KEY"), Resolved::Known(EventKind::Key));
//!
//! let kv = decode::<KeyWatch>(br#"{"Key":"foo/bar/baz","Value":"aGV5"}"#).unwrap();
//! assert_eq!(kv.map(|kv| kv.key).as_deref(), Some("foo/bar/baz"));
//!
//! // A deleted key arrives as `null`
//! assert_eq!(decode::<KeyWatch>(b"null").unwrap(), None);
//! ```

#[macro_use]
mod macros;

mod error;
mod payload;
mod registry;
mod watch;

// Re-exports
pub use contracts::EventKind;
pub use error::{DecodeError, Result};
pub use payload::Payload;
pub use registry::{decode_any, decoder_for, resolve, DecoderFn, Resolved};
pub use watch::{
    decode, ChecksWatch, EventWatch, KeyPrefixWatch, KeyWatch, NodesWatch, ServiceWatch,
    ServicesWatch, Watch,
};
