//! Error types for the chat ledger.

use thiserror::Error;

use crate::ledger::core::ids::MessageId;

/// Ledger error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The message does not exist, or it was deleted.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LedgerError {
    /// Whether a transport should report this as a missing resource (e.g. HTTP 404).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::MessageNotFound(_))
    }

    /// Check if this error is retryable.
    ///
    /// The ledger performs no I/O, so nothing it reports goes away on retry.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

/// Convenience result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
