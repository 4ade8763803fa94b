use std::path::PathBuf;

use strata::{Document, KeyBuf, Store, Value};
use tempfile::TempDir;

/// Creates a scratch directory that lives for the duration of one test.
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("create scratch dir")
}

/// Writes a file into the scratch directory and returns its path.
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture file");
    path
}

/// Opens a store with default settings on a file inside the scratch dir.
pub fn open_store(dir: &TempDir, name: &str) -> Store {
    Store::open(dir.path().join(name)).expect("open store")
}

/// Parses a dotted key, panicking on malformed input.
pub fn key(raw: &str) -> KeyBuf {
    KeyBuf::parse(raw).expect("valid key")
}

/// A document exercising every representable value kind.
pub fn sample_document() -> Document {
    Document::new()
        .with("name", "demo")
        .with("server.host", "localhost")
        .with("server.port", 8080)
        .with("server.tls", false)
        .with("ratio", 0.25)
        .with("gap", Value::Null)
        .with("tags", vec!["alpha", "beta"])
}
