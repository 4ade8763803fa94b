//! Hierarchical document model.
//!
//! This module provides the in-memory tree backing one store file. The
//! [`Document`] type is an insertion-ordered mapping from string segments to
//! [`Value`]s; nested mappings give the tree its depth, and dotted keys
//! ([`KeyBuf`]) address nodes at any depth.
//!
//! # Usage
//!
//! ```
//! use strata::doc::{Document, path::KeyBuf};
//!
//! let mut doc = Document::new();
//! doc.insert(&KeyBuf::parse("server.host")?, "localhost")?;
//! doc.insert(&KeyBuf::parse("server.port")?, 8080)?;
//!
//! let port = doc.get(&KeyBuf::parse("server.port")?);
//! assert_eq!(port.and_then(|v| v.as_int()), Some(8080));
//! # Ok::<(), strata::Error>(())
//! ```

use std::{collections::BTreeSet, fmt};

use indexmap::IndexMap;

pub mod errors;
pub mod list;
pub mod path;
pub mod value;

pub use errors::DocError;
pub use list::List;
pub use path::{Key, KeyBuf};
pub use value::Value;

/// The in-memory tree for one backing file.
///
/// A `Document` preserves the declaration order of its entries; that order is
/// significant when the document is serialized back to text. Child keys are
/// unique within one mapping.
///
/// Dotted-key operations walk the tree segment by segment. [`Document::insert`]
/// creates intermediate mappings as needed but refuses to descend through a
/// scalar or list (see [`DocError::StructuralConflict`]). [`Document::remove`]
/// deletes the addressed entry only; ancestors emptied by a removal are kept,
/// so structure (and any comments attached to it on disk) survives.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Document {
    entries: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if this document has no direct children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the direct children in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the direct child for `segment`, without walking.
    pub fn child(&self, segment: &str) -> Option<&Value> {
        self.entries.get(segment)
    }

    /// Returns the direct child for `segment` mutably, without walking.
    pub fn child_mut(&mut self, segment: &str) -> Option<&mut Value> {
        self.entries.get_mut(segment)
    }

    /// Returns true if a direct child exists for `segment`.
    pub fn contains_child(&self, segment: &str) -> bool {
        self.entries.contains_key(segment)
    }

    /// Inserts a direct child, returning the previous value if any.
    pub fn insert_child(&mut self, segment: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(segment.into(), value.into())
    }

    /// Removes a direct child, preserving the order of the remaining entries.
    pub fn remove_child(&mut self, segment: &str) -> Option<Value> {
        self.entries.shift_remove(segment)
    }

    /// Gets a value by dotted key.
    ///
    /// Walks the key segment by segment and returns `None` at the first
    /// missing segment. List elements can be addressed by numeric segments
    /// (`"servers.0.host"`). No coercion is applied.
    pub fn get(&self, key: impl AsRef<Key>) -> Option<&Value> {
        let mut segments = key.as_ref().segments();
        let first = segments.next()?;
        let mut current = self.entries.get(first)?;

        for segment in segments {
            match current {
                Value::Map(map) => current = map.entries.get(segment)?,
                Value::List(list) => {
                    let index: usize = segment.parse().ok()?;
                    current = list.get(index)?;
                }
                _ => return None,
            }
        }

        Some(current)
    }

    /// Gets a mutable reference to a value by dotted key.
    ///
    /// Only mapping nodes are descended; list elements are not addressable
    /// mutably through keys.
    pub fn get_mut(&mut self, key: impl AsRef<Key>) -> Option<&mut Value> {
        let segments: Vec<&str> = key.as_ref().segments().collect();
        let mut current = self;

        for segment in &segments[..segments.len() - 1] {
            match current.entries.get_mut(*segment) {
                Some(Value::Map(map)) => current = map,
                _ => return None,
            }
        }

        current.entries.get_mut(*segments.last().unwrap())
    }

    /// Returns true if the dotted key resolves to a value.
    pub fn contains_key(&self, key: impl AsRef<Key>) -> bool {
        self.get(key).is_some()
    }

    /// Sets a value at a dotted key, creating intermediate mappings as needed.
    ///
    /// The final segment overwrites whatever is present; intermediate segments
    /// must be mappings (or absent). If an intermediate segment resolves to a
    /// scalar or a list the insert fails with
    /// [`DocError::StructuralConflict`] and the document is left untouched:
    /// a list is never created implicitly, and data is never silently
    /// clobbered mid-path.
    pub fn insert(
        &mut self,
        key: impl AsRef<Key>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, DocError> {
        let segments: Vec<&str> = key.as_ref().segments().collect();

        // Reject conflicts up front so a failed insert leaves the tree untouched.
        let mut probe = &*self;
        for (i, segment) in segments[..segments.len() - 1].iter().enumerate() {
            match probe.entries.get(*segment) {
                Some(Value::Map(map)) => probe = map,
                Some(other) => {
                    return Err(DocError::StructuralConflict {
                        path: segments[..=i].join("."),
                        found: other.kind_name(),
                    });
                }
                None => break,
            }
        }

        let mut current = self;
        for segment in &segments[..segments.len() - 1] {
            current = match current
                .entries
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Map(Document::new()))
            {
                Value::Map(map) => map,
                _ => unreachable!("conflicting segments rejected above"),
            };
        }

        Ok(current
            .entries
            .insert(segments.last().unwrap().to_string(), value.into()))
    }

    /// Removes the value at a dotted key, returning it if present.
    ///
    /// Removing an absent key is a no-op, not an error. Ancestor mappings
    /// emptied by the removal are kept in place.
    pub fn remove(&mut self, key: impl AsRef<Key>) -> Option<Value> {
        let segments: Vec<&str> = key.as_ref().segments().collect();
        let mut current = self;

        for segment in &segments[..segments.len() - 1] {
            match current.entries.get_mut(*segment) {
                Some(Value::Map(map)) => current = map,
                _ => return None,
            }
        }

        current.entries.shift_remove(*segments.last().unwrap())
    }

    /// Enumerates resolvable keys.
    ///
    /// With `prefix`, enumeration starts below that key (an empty set is
    /// returned if the prefix is absent or not a mapping) and every returned
    /// key is re-qualified with the prefix. Recursive mode yields every
    /// descendant mapping and leaf; non-recursive mode yields only the
    /// immediate children. Lists count as leaves.
    pub fn keys(&self, prefix: Option<&Key>, recursive: bool) -> BTreeSet<KeyBuf> {
        let mut out = BTreeSet::new();
        match prefix {
            None => self.collect_keys(None, recursive, &mut out),
            Some(prefix) => {
                if let Some(Value::Map(map)) = self.get(prefix) {
                    map.collect_keys(Some(&prefix.to_key_buf()), recursive, &mut out);
                }
            }
        }
        out
    }

    fn collect_keys(&self, base: Option<&KeyBuf>, recursive: bool, out: &mut BTreeSet<KeyBuf>) {
        for (segment, value) in self.iter() {
            let key = match base {
                Some(base) => base.child(segment),
                None => KeyBuf::from_segment(segment),
            };
            if recursive && let Value::Map(map) = value {
                out.insert(key.clone());
                map.collect_keys(Some(&key), true, out);
            } else {
                out.insert(key);
            }
        }
    }

    /// Recursively unions `other` into this document.
    ///
    /// On a key collision between two mappings the merge recurses. Between
    /// two non-mappings the existing value is kept unless `overwrite` is set.
    /// A collision between a mapping and a non-mapping always keeps this
    /// document's shape and logs the conflict; merge is bulk and
    /// best-effort, unlike the fail-fast [`Document::insert`].
    pub fn merge(&mut self, other: &Document, overwrite: bool) {
        for (segment, theirs) in other.iter() {
            match self.entries.get_mut(segment) {
                None => {
                    self.entries.insert(segment.to_string(), theirs.clone());
                }
                Some(Value::Map(ours)) => match theirs {
                    Value::Map(theirs) => ours.merge(theirs, overwrite),
                    _ => tracing::warn!(
                        key = segment,
                        found = theirs.kind_name(),
                        "merge shape conflict; keeping existing mapping"
                    ),
                },
                Some(ours) => match theirs {
                    Value::Map(_) => tracing::warn!(
                        key = segment,
                        found = ours.kind_name(),
                        "merge shape conflict; keeping existing value"
                    ),
                    _ => {
                        if overwrite {
                            *ours = theirs.clone();
                        }
                    }
                },
            }
        }
    }
}

// Builder pattern methods
impl Document {
    /// Builder method to set a value at a dotted key and return self.
    ///
    /// Invalid keys and structural conflicts are silently ignored; this is a
    /// construction convenience, use [`Document::insert`] to observe errors.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Ok(key) = KeyBuf::parse(key) {
            let _ = self.insert(&key, value);
        }
        self
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut doc = Document::new();
        for (segment, value) in iter {
            doc.insert_child(segment, value);
        }
        doc
    }
}
