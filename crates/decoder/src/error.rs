//! Decoder error types

use contracts::EventKind;
use thiserror::Error;

/// Payload decoding failure
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not valid JSON for the kind's payload shape
    #[error("malformed {kind} payload: {source}")]
    Malformed {
        /// Kind the body was decoded as
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// Create a malformed-payload error
    pub fn malformed(kind: EventKind, source: serde_json::Error) -> Self {
        Self::Malformed { kind, source }
    }

    /// Kind the failed body was decoded as
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Malformed { kind, .. } => *kind,
        }
    }
}

/// Decoder Result type alias
pub type Result<T> = std::result::Result<T, DecodeError>;
