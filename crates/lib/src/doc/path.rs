//! Dotted-key types for hierarchical document access.
//!
//! A key such as `"server.http.port"` addresses a node nested inside a
//! [`Document`](crate::Document). The [`Key`]/[`KeyBuf`] pair follows the same
//! borrowed/owned pattern as `std::path::Path`/`PathBuf`: `Key` is unsized and
//! always used behind a reference, `KeyBuf` owns its storage.
//!
//! Keys are validated, not normalized: an empty key or an empty segment
//! (`"a..b"`, `".a"`, `"a."`) is rejected with [`PathError`] instead of being
//! silently cleaned up, since a key that does not address what the caller
//! wrote is worse than an error.

use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use thiserror::Error;

/// Segment separator within a dotted key.
pub const SEPARATOR: char = '.';

/// Error type for dotted-key validation failures.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The key contained no segments at all.
    #[error("empty key")]
    Empty,

    /// One of the dot-separated segments was empty.
    #[error("empty segment in key '{raw}'")]
    EmptySegment { raw: String },
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}

/// A borrowed, validated dotted key.
///
/// This type is unsized and must always be used behind a reference, like
/// `str`. Obtain one by dereferencing a [`KeyBuf`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Key {
    inner: str,
}

/// An owned, validated dotted key.
///
/// # Examples
///
/// ```
/// use strata::doc::path::KeyBuf;
///
/// let key = KeyBuf::parse("server.http.port")?;
/// assert_eq!(key.segments().collect::<Vec<_>>(), vec!["server", "http", "port"]);
/// assert_eq!(key.leaf(), "port");
/// assert_eq!(key.parent().unwrap().as_str(), "server.http");
/// # Ok::<(), strata::doc::path::PathError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyBuf {
    inner: String,
}

impl KeyBuf {
    /// Parses a dotted key, rejecting empty keys and empty segments.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, PathError> {
        let raw = raw.as_ref();
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        if raw.split(SEPARATOR).any(str::is_empty) {
            return Err(PathError::EmptySegment {
                raw: raw.to_string(),
            });
        }
        Ok(KeyBuf {
            inner: raw.to_string(),
        })
    }

    /// Builds a key by joining segments with the separator (the inverse of
    /// [`Key::segments`]). Fails if no segment is given or any segment is
    /// empty or contains the separator.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = String::new();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() || segment.contains(SEPARATOR) {
                return Err(PathError::EmptySegment {
                    raw: segment.to_string(),
                });
            }
            if !inner.is_empty() {
                inner.push(SEPARATOR);
            }
            inner.push_str(segment);
        }
        if inner.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(KeyBuf { inner })
    }

    /// Extends this key with one more segment.
    ///
    /// Used when enumerating document keys; the segment is taken as-is.
    pub(crate) fn child(&self, segment: &str) -> KeyBuf {
        let mut inner = self.inner.clone();
        inner.push(SEPARATOR);
        inner.push_str(segment);
        KeyBuf { inner }
    }

    /// Builds a single-segment key. The segment is taken as-is.
    pub(crate) fn from_segment(segment: &str) -> KeyBuf {
        KeyBuf {
            inner: segment.to_string(),
        }
    }

    /// Returns the parent key, or `None` for a single-segment key.
    pub fn parent(&self) -> Option<KeyBuf> {
        self.inner.rfind(SEPARATOR).map(|last| KeyBuf {
            inner: self.inner[..last].to_string(),
        })
    }
}

impl Key {
    /// Creates a `Key` from a string without validation.
    ///
    /// # Safety
    /// The caller must ensure the string is a valid key: non-empty, with no
    /// empty segments. `Key` has the same memory layout as `str`, which is
    /// what makes the cast sound.
    unsafe fn from_str_unchecked(s: &str) -> &Key {
        // SAFETY: Key is a repr-transparent wrapper around str
        unsafe { &*(s as *const str as *const Key) }
    }

    /// Returns an iterator over the key's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split(SEPARATOR)
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.inner.split(SEPARATOR).count()
    }

    /// Keys are never empty; present for iterator-style completeness.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the final segment.
    pub fn leaf(&self) -> &str {
        self.inner
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or(&self.inner)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Converts this `Key` to an owned [`KeyBuf`].
    pub fn to_key_buf(&self) -> KeyBuf {
        KeyBuf {
            inner: self.inner.to_string(),
        }
    }
}

impl Deref for KeyBuf {
    type Target = Key;

    fn deref(&self) -> &Self::Target {
        // Safe because KeyBuf only ever holds validated key strings
        unsafe { Key::from_str_unchecked(self.inner.as_str()) }
    }
}

impl AsRef<Key> for KeyBuf {
    fn as_ref(&self) -> &Key {
        self.deref()
    }
}

impl AsRef<Key> for Key {
    fn as_ref(&self) -> &Key {
        self
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for KeyBuf {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Borrow<Key> for KeyBuf {
    fn borrow(&self) -> &Key {
        self.deref()
    }
}

impl FromStr for KeyBuf {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyBuf::parse(s)
    }
}

impl fmt::Display for KeyBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.inner)
    }
}
