//! TOML backing format, delegated to the `toml` crate.
//!
//! Declaration order is preserved through the crate's `preserve_order`
//! feature. TOML has no null literal; [`Value::Null`] is emitted as an empty
//! string, which is the lossy-by-format tradeoff recorded in DESIGN.md.

use crate::doc::{Document, List, Value};

use super::errors::ParseError;

/// Decodes a TOML document.
pub fn decode(text: &str) -> Result<Document, ParseError> {
    let table: toml::Table = toml::from_str(text).map_err(|err| {
        let line = err
            .span()
            .and_then(|span| text.get(..span.start))
            .map(|prefix| prefix.matches('\n').count() + 1)
            .unwrap_or(1);
        ParseError::Syntax {
            line,
            reason: err.message().to_string(),
        }
    })?;
    Ok(from_table(table))
}

/// Encodes a document as TOML.
pub fn encode(doc: &Document) -> String {
    let value = toml::Value::Table(to_table(doc));
    match toml::to_string_pretty(&value) {
        Ok(out) => out,
        Err(err) => {
            tracing::warn!(%err, "toml serialization failed");
            String::new()
        }
    }
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::Text(s),
        toml::Value::Integer(n) => Value::Int(n),
        toml::Value::Float(x) => Value::Float(x),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::Text(dt.to_string()),
        toml::Value::Array(items) => {
            Value::List(items.into_iter().map(from_toml).collect::<List>())
        }
        toml::Value::Table(table) => Value::Map(from_table(table)),
    }
}

fn from_table(table: toml::Table) -> Document {
    table
        .into_iter()
        .map(|(key, value)| (key, from_toml(value)))
        .collect()
}

fn to_toml(value: &Value) -> toml::Value {
    match value {
        Value::Null => toml::Value::String(String::new()),
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Int(n) => toml::Value::Integer(*n),
        Value::Float(x) => toml::Value::Float(*x),
        Value::Text(s) => toml::Value::String(s.clone()),
        Value::List(list) => toml::Value::Array(list.iter().map(to_toml).collect()),
        Value::Map(map) => toml::Value::Table(to_table(map)),
    }
}

fn to_table(doc: &Document) -> toml::Table {
    doc.iter()
        .map(|(key, value)| (key.to_string(), to_toml(value)))
        .collect()
}
