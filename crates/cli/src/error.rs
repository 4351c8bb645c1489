//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Watch type token not recognized
    #[error("Unknown watch type '{token}' (expected one of: {expected})")]
    UnknownType { token: String, expected: String },

    /// Listener failed to start or stopped with an error
    #[error("Ingress failed: {0}")]
    Serve(#[from] ingress::IngressError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn unknown_type(token: impl Into<String>) -> Self {
        let expected = contracts::EventKind::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self::UnknownType {
            token: token.into(),
            expected,
        }
    }
}
