//! Dispatcher error types

use contracts::EventKind;
use decoder::DecodeError;
use thiserror::Error;

/// Errors returned to the caller of a dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Body does not match the payload shape of its kind
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Duplicate suppression is on but the notification carries no index
    #[error("missing watch index for {kind} notification")]
    MissingIndex { kind: EventKind },
}

impl DispatchError {
    /// Kind of the notification that failed
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Decode(e) => e.kind(),
            Self::MissingIndex { kind } => *kind,
        }
    }
}
