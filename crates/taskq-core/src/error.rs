//! Core domain errors.

use thiserror::Error;

/// Core domain errors for taskq.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Error kind string outside the closed taxonomy.
    #[error("Unknown error kind: {0}")]
    UnknownErrorKind(String),

    /// Invalid state transition.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Value does not have the canonical `[kind, message, details]` layout.
    #[error("Malformed transport form: {0}")]
    MalformedTransportForm(String),
}
