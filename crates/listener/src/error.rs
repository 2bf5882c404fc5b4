//! Listener error types.

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur while handling a notification message.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The message is not a valid order-created notification.
    #[error("Undecodable message: {0}")]
    Decode(#[from] serde_json::Error),

    /// The order service refused or failed to record the order.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl ListenerError {
    /// Returns true if redelivering the same message cannot succeed.
    ///
    /// Store failures are the only errors that may clear on a retry.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ListenerError::Domain(DomainError::Store(_)))
    }
}

/// Result type for listener operations.
pub type Result<T> = std::result::Result<T, ListenerError>;
