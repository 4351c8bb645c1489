//! Ingress error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contracts::ListenAddrError;
use dispatcher::DispatchError;
use thiserror::Error;

/// Errors starting or running the listener
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("invalid listen address: {0}")]
    InvalidAddress(#[from] ListenAddrError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Reasons a notification request is answered with an error status
#[derive(Debug, Error)]
pub enum IngressRejection {
    /// Body could not be read
    #[error("error reading request body: {0}")]
    UnreadableBody(String),

    /// Body exceeds the configured cap
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("empty request body")]
    EmptyBody,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl IngressRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnreadableBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::EmptyBody => StatusCode::BAD_REQUEST,
            Self::Dispatch(DispatchError::Decode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Dispatch(DispatchError::MissingIndex { .. }) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for IngressRejection {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
