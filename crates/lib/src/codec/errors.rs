//! Error types for codec operations.

use thiserror::Error;

/// Structured error types for decoding raw text into a document.
///
/// Every variant produced while scanning the source carries the 1-based line
/// number it was detected on.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Indentation does not fit the surrounding structure.
    #[error("line {line}: {reason}")]
    Indentation { line: usize, reason: String },

    /// The same key appears twice within one mapping block.
    #[error("line {line}: duplicate key '{key}'")]
    DuplicateKey { line: usize, key: String },

    /// A quoted string is missing its closing quote.
    #[error("line {line}: unterminated quoted string")]
    UnterminatedString { line: usize },

    /// A data line carries neither a `key:` entry nor a list item.
    #[error("line {line}: expected 'key: value', 'key:' or '- item'")]
    MissingKey { line: usize },

    /// List items and mapping entries are mixed within one block.
    #[error("line {line}: cannot mix list items and mapping entries in one block")]
    MixedBlock { line: usize },

    /// Any other syntax problem, with the offending line.
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    /// The source is not valid UTF-8.
    #[error("source is not valid UTF-8: {reason}")]
    Encoding { reason: String },
}

impl ParseError {
    /// Get the 1-based source line this error was detected on, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Indentation { line, .. }
            | ParseError::DuplicateKey { line, .. }
            | ParseError::UnterminatedString { line }
            | ParseError::MissingKey { line }
            | ParseError::MixedBlock { line }
            | ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Encoding { .. } => None,
        }
    }

    /// Check if this error is a duplicate-key failure.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, ParseError::DuplicateKey { .. })
    }

    /// Check if this error is an indentation failure.
    pub fn is_indentation(&self) -> bool {
        matches!(self, ParseError::Indentation { .. })
    }
}

// Conversion from ParseError to the main Error type
impl From<ParseError> for crate::Error {
    fn from(err: ParseError) -> Self {
        crate::Error::Parse(err)
    }
}
