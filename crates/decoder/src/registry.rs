//! Event type registry
//!
//! Static token -> (kind, decoder) mapping.

use contracts::EventKind;

use crate::error::Result;
use crate::payload::Payload;
use crate::watch::{
    decode, ChecksWatch, EventWatch, KeyPrefixWatch, KeyWatch, NodesWatch, ServiceWatch,
    ServicesWatch, Watch,
};

/// Outcome of resolving a `type` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Token names a supported kind
    Known(EventKind),
    /// Token names nothing; carries the token as received
    Unknown(String),
}

/// Untyped decoder entry point for one kind
pub type DecoderFn = fn(&[u8]) -> Result<Payload>;

/// Resolve a token, ignoring case.
///
/// An unrecognized token is a distinct outcome, not an error.
pub fn resolve(token: &str) -> Resolved {
    match EventKind::resolve(token) {
        Some(kind) => Resolved::Known(kind),
        None => Resolved::Unknown(token.to_string()),
    }
}

/// Decoder registered for `kind`
pub fn decoder_for(kind: EventKind) -> DecoderFn {
    match kind {
        EventKind::Key => decode_untyped::<KeyWatch>,
        EventKind::KeyPrefix => decode_untyped::<KeyPrefixWatch>,
        EventKind::Services => decode_untyped::<ServicesWatch>,
        EventKind::Nodes => decode_untyped::<NodesWatch>,
        EventKind::Service => decode_untyped::<ServiceWatch>,
        EventKind::Checks => decode_untyped::<ChecksWatch>,
        EventKind::Event => decode_untyped::<EventWatch>,
    }
}

/// Decode `raw` as the payload shape of `kind`
pub fn decode_any(kind: EventKind, raw: &[u8]) -> Result<Payload> {
    decoder_for(kind)(raw)
}

fn decode_untyped<W: Watch>(raw: &[u8]) -> Result<Payload> {
    decode::<W>(raw).map(W::into_payload)
}
