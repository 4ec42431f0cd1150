//! Domain error types.

use thiserror::Error;

/// Failure reported by a [`crate::store::QrSessionStore`].
///
/// The message carries the backend's own error text unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Backend(String),

    #[error("Corrupt session record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum QrError {
    #[error("sessionType is required")]
    MissingSessionType,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QrError {
    /// True when the caller sent bad input, as opposed to a storage fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QrError::MissingSessionType)
    }
}
