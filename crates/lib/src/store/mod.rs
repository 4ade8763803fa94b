//! The store: one document, one backing file, one lock.
//!
//! A [`Store`] owns exactly one [`Document`] and the snapshot of the file it
//! was parsed from. Every operation first applies the reload policy (is the
//! in-memory document stale?), then reads or mutates the document, and for
//! mutations runs encode, comment reconcile, and atomic commit before
//! returning. The whole read-modify-write cycle happens under one per-store
//! mutex, so concurrent threads on the same store cannot interleave halfway.
//!
//! The document itself is shared as `Arc<Document>` and replaced by pointer
//! swap on reload, never mutated in place while visible to readers: a reader
//! clones the `Arc` under the lock and walks the tree lock-free afterwards.
//!
//! Failure semantics (see `DESIGN.md` for the reasoning):
//! - automatic reload failures are logged and the last good document is
//!   served; the explicit [`Store::reload`] surfaces [`StoreError::Reload`];
//! - a failed commit surfaces [`StoreError::Commit`] and leaves the
//!   in-memory document mutated; the caller observes failed writes through
//!   the error, not through rollback.

use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path as FsPath, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};

use crate::{
    codec::Format,
    constants::RELOAD_CHECK_INTERVAL,
    doc::{Document, KeyBuf, Value},
    editor,
    reload::{FileSnapshot, ReloadMode},
};

pub mod builder;
pub mod errors;
pub mod typed;

pub use builder::StoreBuilder;
pub use errors::StoreError;
pub use typed::FromValue;

/// A hierarchical key-value store backed by one structured-text file.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    format: Format,
    reload_mode: ReloadMode,
    preserve_comments: bool,
    state: Mutex<State>,
}

#[derive(Debug)]
pub(crate) struct State {
    pub(crate) doc: Arc<Document>,
    snapshot: FileSnapshot,
    last_check: Option<Instant>,
}

impl Store {
    /// Starts building a store for the given path.
    pub fn builder(path: impl Into<PathBuf>) -> StoreBuilder {
        StoreBuilder::new(path)
    }

    /// Starts building a store for `name` inside `dir`.
    pub fn builder_in(dir: impl Into<PathBuf>, name: &str) -> StoreBuilder {
        StoreBuilder::new(dir.into().join(name))
    }

    /// Opens a store with all defaults (format inferred from the extension,
    /// [`ReloadMode::Intelligent`], comments preserved).
    pub fn open(path: impl Into<PathBuf>) -> crate::Result<Store> {
        Store::builder(path).open()
    }

    pub(crate) fn open_with(
        path: PathBuf,
        format: Format,
        reload_mode: ReloadMode,
        preserve_comments: bool,
        seed: Option<Vec<u8>>,
    ) -> crate::Result<Store> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let exists = match fs::metadata(&path) {
            Ok(_) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => return Err(err.into()),
        };
        if !exists {
            let initial = match &seed {
                Some(bytes) => bytes.clone(),
                None => format.encode(&Document::new()).into_bytes(),
            };
            editor::commit(&path, &initial)?;
            tracing::debug!(path = %path.display(), %format, seeded = seed.is_some(), "created backing file");
        }

        let raw = fs::read(&path)?;
        // A parse failure during construction is fatal, unlike during reloads.
        let doc = format.decode(&raw)?;
        let snapshot = FileSnapshot::capture(&path)?;

        Ok(Store {
            path,
            format,
            reload_mode,
            preserve_comments,
            state: Mutex::new(State {
                doc: Arc::new(doc),
                snapshot,
                last_check: Some(Instant::now()),
            }),
        })
    }

    /// The backing file path.
    pub fn path(&self) -> &FsPath {
        &self.path
    }

    /// The backing file format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// The reload mode this store was built with.
    pub fn reload_mode(&self) -> ReloadMode {
        self.reload_mode
    }

    /// Whether writes run the comment-preserving cycle.
    pub fn preserves_comments(&self) -> bool {
        self.preserve_comments && self.format.supports_comments()
    }

    /// Returns a point-in-time snapshot of the document, with the reload
    /// policy applied. The snapshot is immutable; later writes to the store
    /// do not show through it.
    pub fn document(&self) -> Arc<Document> {
        self.lock_fresh().doc.clone()
    }

    /// Returns true if the dotted key resolves to a value.
    pub fn contains_key(&self, key: &str) -> crate::Result<bool> {
        let key = KeyBuf::parse(key)?;
        Ok(self.document().contains_key(&key))
    }

    /// Gets the raw value at a dotted key, uncoerced.
    pub fn get_value(&self, key: &str) -> crate::Result<Option<Value>> {
        let key = KeyBuf::parse(key)?;
        Ok(self.document().get(&key).cloned())
    }

    /// Sets a value at a dotted key and persists the document.
    ///
    /// Intermediate mappings are created as needed; an intermediate scalar or
    /// list fails with a structural conflict before anything is written.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> crate::Result<()> {
        let key = KeyBuf::parse(key)?;
        let mut state = self.lock_fresh();
        Arc::make_mut(&mut state.doc).insert(&key, value)?;
        self.persist_locked(&mut state)
    }

    /// Sets a value only if the key is absent. Present keys are left alone
    /// and nothing is written.
    pub fn set_default(&self, key: &str, value: impl Into<Value>) -> crate::Result<()> {
        let key = KeyBuf::parse(key)?;
        let mut state = self.lock_fresh();
        if state.doc.contains_key(&key) {
            return Ok(());
        }
        Arc::make_mut(&mut state.doc).insert(&key, value)?;
        self.persist_locked(&mut state)
    }

    /// Removes the value at a dotted key and persists the document.
    ///
    /// Removing an absent key is a no-op that touches neither memory nor
    /// disk. Ancestor mappings emptied by the removal stay in place.
    pub fn remove(&self, key: &str) -> crate::Result<Option<Value>> {
        let key = KeyBuf::parse(key)?;
        let mut state = self.lock_fresh();
        if !state.doc.contains_key(&key) {
            return Ok(None);
        }
        let old = Arc::make_mut(&mut state.doc).remove(&key);
        self.persist_locked(&mut state)?;
        Ok(old)
    }

    /// Enumerates all keys (recursive) or only the top-level keys.
    pub fn keys(&self, recursive: bool) -> BTreeSet<KeyBuf> {
        self.document().keys(None, recursive)
    }

    /// Enumerates keys below `prefix`, each re-qualified with the prefix.
    pub fn keys_under(&self, prefix: &str, recursive: bool) -> crate::Result<BTreeSet<KeyBuf>> {
        let prefix = KeyBuf::parse(prefix)?;
        Ok(self.document().keys(Some(&prefix), recursive))
    }

    /// Unions `other` into the document and persists. Best-effort: shape
    /// conflicts keep this store's structure and are logged, see
    /// [`Document::merge`].
    pub fn merge_from(&self, other: &Document, overwrite: bool) -> crate::Result<()> {
        let mut state = self.lock_fresh();
        Arc::make_mut(&mut state.doc).merge(other, overwrite);
        self.persist_locked(&mut state)
    }

    /// Re-reads the backing file unconditionally, replacing the in-memory
    /// document. Unlike the automatic reload paths this surfaces the failure
    /// instead of logging it; the last good document stays in place either
    /// way.
    pub fn reload(&self) -> crate::Result<()> {
        let mut state = self.state.lock().unwrap();
        let snapshot = FileSnapshot::capture(&self.path).map_err(|err| StoreError::Reload {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        })?;
        let doc = self.read_document().map_err(|err| StoreError::Reload {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        })?;
        state.doc = Arc::new(doc);
        state.snapshot = snapshot;
        state.last_check = Some(Instant::now());
        Ok(())
    }

    /// Header comment lines currently on disk.
    pub fn header(&self) -> crate::Result<Vec<String>> {
        let raw = self.read_raw()?;
        Ok(editor::capture(&raw).header)
    }

    /// Replaces the header comment block, leaving the data body untouched.
    /// Lines should carry their own `#` prefix.
    pub fn set_header(&self, lines: &[String]) -> crate::Result<()> {
        let mut state = self.state.lock().unwrap();
        let raw = self.read_raw()?;
        let mut captured = editor::capture(&raw);
        captured.header = lines.to_vec();
        editor::commit(&self.path, editor::render(&captured).as_bytes()).map_err(|err| {
            StoreError::Commit {
                path: self.path.display().to_string(),
                source: err,
            }
        })?;
        self.refresh_snapshot(&mut state);
        Ok(())
    }

    // ---- internals ----

    /// Locks the state and applies the reload policy first, so every caller
    /// observes a policy-fresh document.
    pub(crate) fn lock_fresh(&self) -> MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        self.reload_if_needed(&mut state);
        state
    }

    fn reload_if_needed(&self, state: &mut State) {
        match self.reload_mode {
            ReloadMode::Manual => {}
            ReloadMode::Automatic => self.check_disk(state),
            ReloadMode::Intelligent => {
                let due = state
                    .last_check
                    .is_none_or(|at| at.elapsed() >= RELOAD_CHECK_INTERVAL);
                if due {
                    self.check_disk(state);
                    state.last_check = Some(Instant::now());
                }
            }
        }
    }

    /// One signature check; swaps in a re-parsed document when the file
    /// changed. Failures keep the last good document.
    fn check_disk(&self, state: &mut State) {
        let current = match FileSnapshot::capture(&self.path) {
            Ok(current) => current,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "signature check failed; serving last good document");
                return;
            }
        };
        if current == state.snapshot {
            return;
        }
        match self.read_document() {
            Ok(doc) => {
                tracing::debug!(path = %self.path.display(), "backing file changed on disk; reloaded");
                state.doc = Arc::new(doc);
                state.snapshot = current;
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "reload failed; serving last good document");
            }
        }
    }

    fn read_document(&self) -> crate::Result<Document> {
        let raw = fs::read(&self.path)?;
        Ok(self.format.decode(&raw)?)
    }

    fn read_raw(&self) -> crate::Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Encode, reconcile comments if enabled, commit atomically, then refresh
    /// the snapshot so the store's own write is not mistaken for an outside
    /// edit.
    pub(crate) fn persist_locked(&self, state: &mut State) -> crate::Result<()> {
        let body = self.format.encode(&state.doc);
        let text = if self.preserves_comments() {
            let raw = match fs::read_to_string(&self.path) {
                Ok(raw) => raw,
                Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
                // The capture step failed, so the cycle aborts before
                // anything is written.
                Err(err) => {
                    return Err(StoreError::Commit {
                        path: self.path.display().to_string(),
                        source: err,
                    }
                    .into());
                }
            };
            editor::reconcile(&editor::capture(&raw), &body)
        } else {
            body
        };

        editor::commit(&self.path, text.as_bytes()).map_err(|err| StoreError::Commit {
            path: self.path.display().to_string(),
            source: err,
        })?;
        self.refresh_snapshot(state);
        Ok(())
    }

    fn refresh_snapshot(&self, state: &mut State) {
        match FileSnapshot::capture(&self.path) {
            Ok(snapshot) => state.snapshot = snapshot,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "signature refresh after commit failed");
            }
        }
    }
}
