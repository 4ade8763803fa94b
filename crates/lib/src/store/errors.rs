//! Error types for store operations.

use thiserror::Error;

/// Structured error types for the store lifecycle.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// An explicit reload failed. Recoverable: the last good in-memory
    /// document is still served.
    #[error("reload of '{path}' failed: {reason}")]
    Reload { path: String, reason: String },

    /// The atomic write failed. Nothing reached the disk, but the in-memory
    /// document keeps the mutation, so memory and disk diverge until a later
    /// write or reload succeeds.
    #[error("commit to '{path}' failed: {source}")]
    Commit {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A strict-mode accessor found a value it cannot coerce.
    #[error("value at '{key}' is not coercible to {target}: found {found}")]
    Coercion {
        key: String,
        target: &'static str,
        found: &'static str,
    },
}

impl StoreError {
    /// Check if this error is a recoverable reload failure.
    pub fn is_reload(&self) -> bool {
        matches!(self, StoreError::Reload { .. })
    }

    /// Check if this error is a failed write.
    pub fn is_commit(&self) -> bool {
        matches!(self, StoreError::Commit { .. })
    }

    /// Check if this error is a strict-mode coercion failure.
    pub fn is_coercion(&self) -> bool {
        matches!(self, StoreError::Coercion { .. })
    }

    /// Get the key involved, for coercion errors.
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreError::Coercion { key, .. } => Some(key),
            _ => None,
        }
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
