//! Fluent construction surface for [`Store`].
//!
//! ```no_run
//! use strata::{ReloadMode, Store};
//!
//! let store = Store::builder("config/app.strata")
//!     .seed(&b"# defaults\nport: 8080\n"[..])
//!     .reload(ReloadMode::Automatic)
//!     .preserve_comments(true)
//!     .open()?;
//! # Ok::<(), strata::Error>(())
//! ```

use std::{fs, path::PathBuf};

use crate::{codec::Format, reload::ReloadMode};

use super::Store;

/// Builds a [`Store`] from a target path plus optional seed data, reload
/// mode, comment-preservation flag and explicit format.
#[derive(Debug)]
pub struct StoreBuilder {
    path: PathBuf,
    seed: Option<Seed>,
    reload: ReloadMode,
    preserve_comments: bool,
    format: Option<Format>,
}

#[derive(Debug)]
enum Seed {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl StoreBuilder {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        StoreBuilder {
            path: path.into(),
            seed: None,
            reload: ReloadMode::default(),
            preserve_comments: true,
            format: None,
        }
    }

    /// Imports the given bytes verbatim if the backing file does not exist
    /// yet. Ignored when the file is already present.
    pub fn seed(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.seed = Some(Seed::Bytes(bytes.into()));
        self
    }

    /// Like [`StoreBuilder::seed`], reading the bytes from another file at
    /// open time.
    pub fn seed_from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed = Some(Seed::File(path.into()));
        self
    }

    /// Sets the reload mode (default is [`ReloadMode::Intelligent`]).
    pub fn reload(mut self, mode: ReloadMode) -> Self {
        self.reload = mode;
        self
    }

    /// Enables or disables the comment-preserving write cycle (default on).
    /// Only effective for formats that carry comments.
    pub fn preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    /// Forces a format instead of inferring one from the file extension.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Opens the store: creates and seeds the backing file if missing, then
    /// parses it. A parse failure here is fatal; an unreadable store is
    /// never constructed.
    pub fn open(self) -> crate::Result<Store> {
        let mut path = self.path;
        let format = match self.format {
            Some(format) => format,
            None => Format::from_path(&path).unwrap_or_default(),
        };
        if path.extension().is_none() {
            path.set_extension(format.extension());
        }
        let seed = match self.seed {
            None => None,
            Some(Seed::Bytes(bytes)) => Some(bytes),
            Some(Seed::File(source)) => Some(fs::read(source)?),
        };
        Store::open_with(path, format, self.reload, self.preserve_comments, seed)
    }
}
