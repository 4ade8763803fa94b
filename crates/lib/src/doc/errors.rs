//! Error types for document operations.

use thiserror::Error;

/// Structured error types for document mutations.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocError {
    /// An insert needed to descend through `path`, but the node there is not
    /// a mapping. The document is left unchanged.
    #[error("structural conflict at '{path}': cannot descend into {found}")]
    StructuralConflict { path: String, found: &'static str },
}

impl DocError {
    /// Check if this error is a structural conflict.
    pub fn is_structural_conflict(&self) -> bool {
        matches!(self, DocError::StructuralConflict { .. })
    }

    /// Get the path at which the error occurred.
    pub fn path(&self) -> &str {
        match self {
            DocError::StructuralConflict { path, .. } => path,
        }
    }
}

// Conversion from DocError to the main Error type
impl From<DocError> for crate::Error {
    fn from(err: DocError) -> Self {
        crate::Error::Doc(err)
    }
}
