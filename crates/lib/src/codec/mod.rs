//! Structured-text codecs.
//!
//! A codec turns raw file bytes into a [`Document`] and back. The native
//! indentation dialect is implemented in [`text`]; JSON and TOML are
//! structurally simple and delegate to `serde_json` and `toml`, converted
//! into the same document model. [`Format`] selects the codec and infers it
//! from file extensions.
//!
//! Codecs are comment-blind: comments are skipped on decode and never emitted
//! on encode. Comment preservation is layered on top by
//! [`editor`](crate::editor).

use std::fmt;
use std::path::Path as FsPath;

use crate::{constants::TEXT_EXTENSION, doc::Document};

pub mod errors;
pub mod json;
pub mod text;
pub mod toml;

pub use errors::ParseError;

/// The backing file formats a store can read and write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// The native indentation dialect; this system's YAML-shaped format.
    #[default]
    Strata,
    /// JSON via `serde_json`.
    Json,
    /// TOML via the `toml` crate.
    Toml,
}

impl Format {
    /// Infers a format from a file extension (without the dot).
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension {
            ext if ext.eq_ignore_ascii_case(TEXT_EXTENSION) => Some(Format::Strata),
            ext if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Some(Format::Strata)
            }
            ext if ext.eq_ignore_ascii_case("json") => Some(Format::Json),
            ext if ext.eq_ignore_ascii_case("toml") => Some(Format::Toml),
            _ => None,
        }
    }

    /// Infers a format from a file path's extension.
    pub fn from_path(path: &FsPath) -> Option<Format> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// The canonical file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Strata => TEXT_EXTENSION,
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }

    /// Whether the format is line-oriented with `#` comments, i.e. whether
    /// the comment-preserving editor can operate on files of this format.
    pub fn supports_comments(self) -> bool {
        matches!(self, Format::Strata | Format::Toml)
    }

    /// Decodes raw file bytes into a document.
    pub fn decode(self, raw: &[u8]) -> Result<Document, ParseError> {
        let text = std::str::from_utf8(raw).map_err(|err| ParseError::Encoding {
            reason: err.to_string(),
        })?;
        match self {
            Format::Strata => text::decode(text),
            Format::Json => json::decode(text),
            Format::Toml => toml::decode(text),
        }
    }

    /// Encodes a document as text in this format.
    pub fn encode(self, doc: &Document) -> String {
        match self {
            Format::Strata => text::encode(doc),
            Format::Json => json::encode(doc),
            Format::Toml => toml::encode(doc),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Strata => "strata",
            Format::Json => "json",
            Format::Toml => "toml",
        };
        write!(f, "{name}")
    }
}
