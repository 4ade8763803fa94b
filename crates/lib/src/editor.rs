//! Comment-preserving write cycle.
//!
//! Codecs are comment-blind, so a plain encode-and-write would erase every
//! comment a human left in the file. This module implements the four-step
//! cycle that keeps them:
//!
//! 1. **Capture** ([`capture`]): split the current raw lines into a header
//!    (leading comment/blank lines), the data body, and a footer (trailing
//!    comment/blank lines), remembering the line-ending flavor.
//! 2. **Serialize**: the caller encodes the in-memory document into a fresh,
//!    comment-free body.
//! 3. **Reconcile** ([`reconcile`]): header + fresh body + footer. A fresh
//!    line whose content matches a captured data line is replaced by the
//!    original line verbatim, which carries its trailing inline comment and
//!    the comment block directly above it. Lines that changed, and comments
//!    attached to keys that no longer exist, fall away.
//! 4. **Commit** ([`commit`]): write to a temp file next to the target and
//!    atomically rename over it, so a crash mid-write cannot truncate.
//!
//! The reconcile step is a line-diffing heuristic: an inline comment on a key
//! whose serialized line *changed* is not carried over. The approximation is
//! isolated behind this module so an exact solution could replace it without
//! touching the document or codec contracts.
//!
//! [`commit`] is also used for comment-free writes; atomicity is not optional.

use std::{
    io::{self, Write},
    path::Path,
};

use tempfile::NamedTempFile;

use crate::codec::text::strip_inline_comment;

/// Comment fragments captured from one on-disk file.
#[derive(Debug, Clone, Default)]
pub struct Captured {
    /// Comment/blank lines before the first data line.
    pub header: Vec<String>,
    /// Everything from the first to the last data line, inclusive.
    pub body: Vec<String>,
    /// Comment/blank lines after the last data line.
    pub footer: Vec<String>,
    eol: Eol,
    trailing_newline: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Eol {
    #[default]
    Lf,
    CrLf,
}

impl Eol {
    fn as_str(self) -> &'static str {
        match self {
            Eol::Lf => "\n",
            Eol::CrLf => "\r\n",
        }
    }
}

fn is_data_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with(crate::constants::COMMENT_CHAR)
}

/// Step 1: splits raw file text into header, body and footer.
pub fn capture(raw: &str) -> Captured {
    let eol = if raw.contains("\r\n") { Eol::CrLf } else { Eol::Lf };
    let trailing_newline = raw.is_empty() || raw.ends_with('\n');
    let lines: Vec<String> = raw.lines().map(str::to_string).collect();

    match lines.iter().position(|l| is_data_line(l)) {
        None => Captured {
            header: lines,
            body: Vec::new(),
            footer: Vec::new(),
            eol,
            trailing_newline,
        },
        Some(first) => {
            let last = lines
                .iter()
                .rposition(|l| is_data_line(l))
                .expect("a data line was found above");
            Captured {
                header: lines[..first].to_vec(),
                body: lines[first..=last].to_vec(),
                footer: lines[last + 1..].to_vec(),
                eol,
                trailing_newline,
            }
        }
    }
}

/// One captured data line available for verbatim reuse, together with the
/// comment block that sat directly above it.
struct Reusable {
    stripped: String,
    lead: Vec<String>,
    line: String,
    used: bool,
}

/// Re-renders captured fragments without touching the data body.
///
/// Used when only the surrounding comments are edited (e.g. replacing the
/// header) and the body must stay exactly as it was on disk.
pub fn render(captured: &Captured) -> String {
    let lines: Vec<&str> = captured
        .header
        .iter()
        .chain(&captured.body)
        .chain(&captured.footer)
        .map(String::as_str)
        .collect();
    join_lines(&lines, captured.eol, captured.trailing_newline)
}

fn join_lines(lines: &[&str], eol: Eol, trailing_newline: bool) -> String {
    let mut text = lines.join(eol.as_str());
    if trailing_newline && !text.is_empty() {
        text.push_str(eol.as_str());
    }
    text
}

/// Step 3: surrounds a freshly serialized body with the captured comments.
pub fn reconcile(captured: &Captured, fresh_body: &str) -> String {
    let mut pool: Vec<Reusable> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    for line in &captured.body {
        if is_data_line(line) {
            pool.push(Reusable {
                stripped: strip_inline_comment(line).to_string(),
                lead: std::mem::take(&mut pending),
                line: line.clone(),
                used: false,
            });
        } else {
            pending.push(line.clone());
        }
    }

    let mut out: Vec<String> = captured.header.clone();
    for fresh in fresh_body.lines() {
        match pool
            .iter_mut()
            .find(|entry| !entry.used && entry.stripped == fresh)
        {
            Some(entry) => {
                entry.used = true;
                out.extend(entry.lead.iter().cloned());
                out.push(entry.line.clone());
            }
            None => out.push(fresh.to_string()),
        }
    }
    out.extend(captured.footer.iter().cloned());

    let lines: Vec<&str> = out.iter().map(String::as_str).collect();
    join_lines(&lines, captured.eol, captured.trailing_newline)
}

/// Step 4: atomically replaces `path` with `contents`.
///
/// The temp file lives in the target's directory so the final rename stays on
/// one filesystem.
pub fn commit(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
