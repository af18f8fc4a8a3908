//! Crate-level error type.

use thiserror::Error;

use crate::net::TransportError;

/// Errors that abort a reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The admin socket could not be reached or failed mid-exchange.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The requested server does not appear in the statistics dump.
    #[error("member record missing: no server named '{host}' in statistics dump")]
    MemberNotFound { host: String },

    /// The member row is shorter than the pinned column table requires.
    #[error("malformed statistics record for '{host}': expected at least {expected} fields, got {actual}")]
    MalformedRecord {
        host: String,
        expected: usize,
        actual: usize,
    },

    /// Desired state other than `enabled` or `disabled`.
    #[error("unknown state specified: '{0}'")]
    UnknownState(String),

    /// Weight expression outside the accepted syntax or range.
    #[error("invalid weight '{value}': {reason}")]
    InvalidWeight { value: String, reason: String },
}

impl ReconcileError {
    /// True for errors detected before any socket activity.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ReconcileError::UnknownState(_) | ReconcileError::InvalidWeight { .. }
        )
    }
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
