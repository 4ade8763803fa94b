//!
//! Strata: hierarchical key-value storage backed by human-editable
//! structured-text files.
//!
//! Clients read and write values addressed by dot-separated keys
//! (`"server.http.port"`) without caring which textual format backs the file.
//!
//! ## Core Concepts
//!
//! * **Documents (`doc::Document`)**: The in-memory tree for one backing file,
//!   an insertion-ordered mapping of scalars, lists and nested mappings,
//!   addressed by dotted keys (`doc::path::KeyBuf`).
//! * **Codecs (`codec::Format`)**: Turn raw file text into a `Document` and
//!   back. The native indentation dialect is implemented here; JSON and TOML
//!   delegate to `serde_json` and `toml`.
//! * **Reload policy (`reload::ReloadMode`)**: Decides, per access, whether
//!   the in-memory document is stale relative to the file and must be
//!   re-parsed: never, always, or rate-limited.
//! * **Comment preservation (`editor`)**: The capture/serialize/reconcile/
//!   commit cycle that keeps header, footer and inline comments intact
//!   across writes, with an atomic file replace at the end.
//! * **Stores (`store::Store`)**: One document + one file + one lock; the
//!   public read/write surface with typed, coercing accessors
//!   (`store::FromValue`).
//!
//! ## Usage
//!
//! ```no_run
//! use strata::Store;
//!
//! let store = Store::open("app.strata")?;
//! store.set("server.port", 8080)?;
//! let port = store.get_or_set_default("server.port", 8080)?;
//! assert_eq!(port, 8080);
//! # Ok::<(), strata::Error>(())
//! ```

pub mod codec;
pub mod constants;
pub mod doc;
pub mod editor;
pub mod reload;
pub mod store;

/// Re-exports of the types most callers need.
pub use codec::Format;
pub use doc::{Document, List, Value};
pub use doc::path::{Key, KeyBuf};
pub use reload::ReloadMode;
pub use store::{FromValue, Store, StoreBuilder};

/// Result type used throughout the strata library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the strata library.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed dotted key
    #[error(transparent)]
    Path(doc::path::PathError),

    /// Structural document errors from the doc module
    #[error(transparent)]
    Doc(doc::DocError),

    /// Decode failures from the codec module
    #[error(transparent)]
    Parse(codec::ParseError),

    /// Lifecycle errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Path(_) => "path",
            Error::Doc(_) => "doc",
            Error::Parse(_) => "codec",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error is a malformed dotted key.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Error::Path(_))
    }

    /// Check if this error is a structural conflict (an insert blocked by an
    /// incompatible existing node).
    pub fn is_structural_conflict(&self) -> bool {
        matches!(self, Error::Doc(err) if err.is_structural_conflict())
    }

    /// Check if this error is a decode failure.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Check if this error is a recoverable reload failure.
    pub fn is_reload_error(&self) -> bool {
        matches!(self, Error::Store(err) if err.is_reload())
    }

    /// Check if this error is a failed write (the distinct signal for
    /// memory/disk divergence).
    pub fn is_commit_error(&self) -> bool {
        matches!(self, Error::Store(err) if err.is_commit())
    }

    /// Check if this error is a strict-mode coercion failure.
    pub fn is_coercion_error(&self) -> bool {
        matches!(self, Error::Store(err) if err.is_coercion())
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store::StoreError::Commit { .. }) => true,
            _ => false,
        }
    }
}
