//! Reload policy and on-disk staleness detection.
//!
//! Every store access first decides whether the in-memory document is stale
//! relative to the backing file. [`ReloadMode`] is the per-store policy;
//! [`FileSnapshot`] is the signature of the file as last parsed, compared
//! against a freshly captured signature to detect outside edits.
//!
//! A reload that fails (file missing, unreadable, unparsable) keeps the last
//! good document: stale-but-available beats failing reads.

use std::{fs, io, path::Path, time::SystemTime};

/// When a store re-reads its backing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReloadMode {
    /// Never reload automatically; only an explicit
    /// [`Store::reload`](crate::Store::reload) re-reads the file.
    Manual,
    /// Compare the on-disk signature before every read and write.
    Automatic,
    /// Like `Automatic`, but the signature check runs at most once per
    /// [`RELOAD_CHECK_INTERVAL`](crate::constants::RELOAD_CHECK_INTERVAL),
    /// so tight access loops do not hit the disk on every call.
    #[default]
    Intelligent,
}

/// The on-disk signature of a backing file at the last successful reload.
///
/// Captured from the file's modification timestamp and length; if the medium
/// reports no usable timestamp, a BLAKE3 hash of the content stands in. A
/// missing file is itself a valid (absent) signature, so deletion is detected
/// like any other change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    signature: Option<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Signature {
    Modified { mtime: SystemTime, len: u64 },
    Digest(blake3::Hash),
}

impl FileSnapshot {
    /// Captures the current signature of `path`.
    pub fn capture(path: &Path) -> io::Result<FileSnapshot> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(FileSnapshot { signature: None });
            }
            Err(err) => return Err(err),
        };
        let signature = match metadata.modified() {
            Ok(mtime) => Signature::Modified {
                mtime,
                len: metadata.len(),
            },
            Err(_) => Signature::Digest(blake3::hash(&fs::read(path)?)),
        };
        Ok(FileSnapshot {
            signature: Some(signature),
        })
    }

    /// Returns true if the file existed when the snapshot was taken.
    pub fn exists(&self) -> bool {
        self.signature.is_some()
    }
}
