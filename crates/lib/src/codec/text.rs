//! The native indentation-based text dialect.
//!
//! One value or block-opening key per line. Nesting is expressed purely by
//! indentation, two spaces per level:
//!
//! ```text
//! # server settings
//! server:
//!   host: localhost
//!   port: 8080
//! features:
//!   - metrics
//!   - tracing
//! ```
//!
//! `key: value` lines carry scalars, bare `key:` lines open a nested block
//! (mapping or list, decided by the first child line), `- item` lines are
//! list entries, and a bare `-` opens a nested block inside a list. Empty
//! branches are spelled inline as `{}` and `[]` so they survive round-trips.
//! `#` opens a comment when preceded by whitespace; the codec itself is
//! comment-blind and simply skips them (comment preservation lives in
//! [`editor`](crate::editor)).
//!
//! Decoding follows a tokenize-then-fold shape: the source is first flattened
//! into (depth, key, payload) lines, then folded into nested values with the
//! indentation depth as the nesting signal.

use crate::{
    constants::{COMMENT_CHAR, INDENT_WIDTH},
    doc::{Document, List, Value},
};

use super::errors::ParseError;

/// One significant source line.
struct Line {
    number: usize,
    depth: usize,
    kind: LineKind,
}

enum LineKind {
    /// `key: value`, `key:`, `key: {}` or `key: []`
    Entry { key: String, payload: Payload },
    /// `- value`, `-`, `- {}` or `- []`
    Item(Payload),
}

enum Payload {
    Scalar(Value),
    /// Bare opener; the children decide between mapping and list.
    Open,
    EmptyMap,
    EmptyList,
}

/// Decodes dialect text into a document.
pub fn decode(text: &str) -> Result<Document, ParseError> {
    let lines = tokenize(text)?;
    let mut idx = 0;
    fold_map(&lines, &mut idx, 0)
}

/// Encodes a document as dialect text, depth-first in declaration order.
pub fn encode(doc: &Document) -> String {
    let mut out = String::new();
    write_map(&mut out, doc, 0);
    out
}

// ---- tokenizing ----

fn tokenize(text: &str) -> Result<Vec<Line>, ParseError> {
    let mut lines = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let number = index + 1;
        let rest = raw_line.trim_start_matches(' ');
        if rest.starts_with('\t') {
            return Err(ParseError::Indentation {
                line: number,
                reason: "tab indentation is not supported".to_string(),
            });
        }
        if rest.is_empty() || rest.starts_with(COMMENT_CHAR) {
            continue;
        }
        let indent = raw_line.len() - rest.len();
        if indent % INDENT_WIDTH != 0 {
            return Err(ParseError::Indentation {
                line: number,
                reason: format!("indent of {indent} spaces is not a multiple of {INDENT_WIDTH}"),
            });
        }
        let depth = indent / INDENT_WIDTH;

        let content = strip_inline_comment(rest);
        let kind = if content == "-" {
            LineKind::Item(Payload::Open)
        } else if let Some(item) = content.strip_prefix("- ") {
            LineKind::Item(parse_payload(item.trim(), number)?)
        } else {
            let (key, rest) = parse_key(content, number)?;
            let rest = rest.trim();
            let payload = if rest.is_empty() {
                Payload::Open
            } else {
                parse_payload(rest, number)?
            };
            LineKind::Entry { key, payload }
        };
        lines.push(Line {
            number,
            depth,
            kind,
        });
    }
    Ok(lines)
}

/// Splits `content` into its key and the remainder after the colon.
fn parse_key(content: &str, line: usize) -> Result<(String, &str), ParseError> {
    if content.starts_with('"') {
        let (key, end) = parse_quoted(content, line)?;
        let rest = content[end..].trim_start();
        match rest.strip_prefix(':') {
            Some(rest) => Ok((key, rest)),
            None => Err(ParseError::MissingKey { line }),
        }
    } else {
        let Some(colon) = content.find(':') else {
            return Err(ParseError::MissingKey { line });
        };
        let key = content[..colon].trim_end();
        if key.is_empty() {
            return Err(ParseError::MissingKey { line });
        }
        Ok((key.to_string(), &content[colon + 1..]))
    }
}

fn parse_payload(payload: &str, line: usize) -> Result<Payload, ParseError> {
    Ok(match payload {
        "" => Payload::Open,
        "{}" => Payload::EmptyMap,
        "[]" => Payload::EmptyList,
        _ => Payload::Scalar(parse_scalar(payload, line)?),
    })
}

fn parse_scalar(payload: &str, line: usize) -> Result<Value, ParseError> {
    if payload.starts_with('"') {
        let (text, end) = parse_quoted(payload, line)?;
        if !payload[end..].trim().is_empty() {
            return Err(ParseError::Syntax {
                line,
                reason: "trailing characters after quoted string".to_string(),
            });
        }
        return Ok(Value::Text(text));
    }
    Ok(match payload {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = payload.parse::<i64>() {
                Value::Int(n)
            } else if let Ok(x) = payload.parse::<f64>() {
                Value::Float(x)
            } else {
                Value::Text(payload.to_string())
            }
        }
    })
}

/// Reads a `"…"` literal starting at byte 0 of `s`; returns the unescaped
/// content and the byte offset just past the closing quote.
fn parse_quoted(s: &str, line: usize) -> Result<(String, usize), ParseError> {
    let mut out = String::new();
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            match c {
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                other => {
                    return Err(ParseError::Syntax {
                        line,
                        reason: format!("unknown escape '\\{other}'"),
                    });
                }
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Ok((out, i + 1));
        } else {
            out.push(c);
        }
    }
    Err(ParseError::UnterminatedString { line })
}

/// Cuts a trailing `#` comment off one line, quote-aware.
///
/// A `#` only opens a comment at the start of the line or after whitespace,
/// and never inside a quoted string.
pub(crate) fn strip_inline_comment(s: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut prev_is_space = true;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            prev_is_space = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == COMMENT_CHAR && !in_quotes && prev_is_space => {
                return s[..i].trim_end();
            }
            _ => {}
        }
        prev_is_space = c.is_whitespace();
    }
    s.trim_end()
}

// ---- folding ----

fn fold_map(lines: &[Line], idx: &mut usize, depth: usize) -> Result<Document, ParseError> {
    let mut doc = Document::new();
    while let Some(line) = lines.get(*idx) {
        if line.depth < depth {
            break;
        }
        if line.depth > depth {
            return Err(ParseError::Indentation {
                line: line.number,
                reason: format!("unexpected indent to depth {}", line.depth),
            });
        }
        match &line.kind {
            LineKind::Item(_) => return Err(ParseError::MixedBlock { line: line.number }),
            LineKind::Entry { key, payload } => {
                if doc.contains_child(key) {
                    return Err(ParseError::DuplicateKey {
                        line: line.number,
                        key: key.clone(),
                    });
                }
                let key = key.clone();
                let value = fold_value(lines, idx, depth, payload)?;
                doc.insert_child(key, value);
            }
        }
    }
    Ok(doc)
}

fn fold_list(lines: &[Line], idx: &mut usize, depth: usize) -> Result<List, ParseError> {
    let mut list = List::new();
    while let Some(line) = lines.get(*idx) {
        if line.depth < depth {
            break;
        }
        if line.depth > depth {
            return Err(ParseError::Indentation {
                line: line.number,
                reason: format!("unexpected indent to depth {}", line.depth),
            });
        }
        match &line.kind {
            LineKind::Entry { .. } => return Err(ParseError::MixedBlock { line: line.number }),
            LineKind::Item(payload) => {
                let value = fold_value(lines, idx, depth, payload)?;
                list.push(value);
            }
        }
    }
    Ok(list)
}

/// Consumes the line at `*idx` (already classified into `payload`) plus any
/// block it opens, and produces its value.
fn fold_value(
    lines: &[Line],
    idx: &mut usize,
    depth: usize,
    payload: &Payload,
) -> Result<Value, ParseError> {
    *idx += 1;
    match payload {
        Payload::Scalar(value) => {
            guard_no_children(lines, *idx, depth)?;
            Ok(value.clone())
        }
        Payload::EmptyMap => {
            guard_no_children(lines, *idx, depth)?;
            Ok(Value::Map(Document::new()))
        }
        Payload::EmptyList => {
            guard_no_children(lines, *idx, depth)?;
            Ok(Value::List(List::new()))
        }
        Payload::Open => match lines.get(*idx) {
            Some(child) if child.depth > depth => {
                if child.depth != depth + 1 {
                    return Err(ParseError::Indentation {
                        line: child.number,
                        reason: format!(
                            "indent jumped from depth {} to {}",
                            depth, child.depth
                        ),
                    });
                }
                match child.kind {
                    LineKind::Item(_) => Ok(Value::List(fold_list(lines, idx, depth + 1)?)),
                    LineKind::Entry { .. } => Ok(Value::Map(fold_map(lines, idx, depth + 1)?)),
                }
            }
            // A bare opener with nothing below it reads as an empty mapping.
            _ => Ok(Value::Map(Document::new())),
        },
    }
}

fn guard_no_children(lines: &[Line], idx: usize, depth: usize) -> Result<(), ParseError> {
    if let Some(next) = lines.get(idx)
        && next.depth > depth
    {
        return Err(ParseError::Indentation {
            line: next.number,
            reason: "unexpected indented block under a scalar value".to_string(),
        });
    }
    Ok(())
}

// ---- encoding ----

fn write_map(out: &mut String, doc: &Document, depth: usize) {
    for (key, value) in doc.iter() {
        push_indent(out, depth);
        out.push_str(&key_repr(key));
        match value {
            Value::Map(map) if map.is_empty() => out.push_str(": {}\n"),
            Value::Map(map) => {
                out.push_str(":\n");
                write_map(out, map, depth + 1);
            }
            Value::List(list) if list.is_empty() => out.push_str(": []\n"),
            Value::List(list) => {
                out.push_str(":\n");
                write_list(out, list, depth + 1);
            }
            scalar => {
                out.push_str(": ");
                out.push_str(&scalar_repr(scalar));
                out.push('\n');
            }
        }
    }
}

fn write_list(out: &mut String, list: &List, depth: usize) {
    for item in list {
        push_indent(out, depth);
        match item {
            Value::Map(map) if map.is_empty() => out.push_str("- {}\n"),
            Value::Map(map) => {
                out.push_str("-\n");
                write_map(out, map, depth + 1);
            }
            Value::List(inner) if inner.is_empty() => out.push_str("- []\n"),
            Value::List(inner) => {
                out.push_str("-\n");
                write_list(out, inner, depth + 1);
            }
            scalar => {
                out.push_str("- ");
                out.push_str(&scalar_repr(scalar));
                out.push('\n');
            }
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth * INDENT_WIDTH {
        out.push(' ');
    }
}

fn scalar_repr(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        // Debug keeps the decimal point on whole floats, so they re-parse as floats
        Value::Float(x) => format!("{x:?}"),
        Value::Text(s) => {
            if needs_quoting(s) {
                quote(s)
            } else {
                s.clone()
            }
        }
        Value::List(_) | Value::Map(_) => unreachable!("branches are emitted as blocks"),
    }
}

fn key_repr(key: &str) -> String {
    let reserved = |c: char| matches!(c, ':' | '#' | '"' | '\\' | '\n' | '\r' | '\t' | '.');
    if key.is_empty() || key != key.trim() || key.starts_with('-') || key.chars().any(reserved) {
        quote(key)
    } else {
        key.to_string()
    }
}

/// A text scalar must be quoted whenever its bare spelling would decode as
/// something else: another scalar kind, an empty-branch literal, a comment,
/// a list marker, or a key.
fn needs_quoting(s: &str) -> bool {
    let reserved = |c: char| matches!(c, ':' | '#' | '"' | '\\' | '\n' | '\r' | '\t' | '.');
    s.is_empty()
        || s != s.trim()
        || matches!(s, "null" | "true" | "false" | "{}" | "[]")
        || s.parse::<f64>().is_ok()
        || s.starts_with('-')
        || s.chars().any(reserved)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
