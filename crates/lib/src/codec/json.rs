//! JSON backing format, delegated to `serde_json`.
//!
//! Declaration order is preserved through `serde_json`'s `preserve_order`
//! feature. JSON has no comment syntax, so the comment-preserving editor
//! never runs for this format.

use crate::doc::{Document, List, Value};

use super::errors::ParseError;

/// Decodes a JSON object into a document.
pub fn decode(text: &str) -> Result<Document, ParseError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|err| ParseError::Syntax {
        line: err.line(),
        reason: err.to_string(),
    })?;
    match value {
        serde_json::Value::Object(map) => Ok(from_json_object(map)),
        other => Err(ParseError::Syntax {
            line: 1,
            reason: format!("top level must be an object, found {other}"),
        }),
    }
}

/// Encodes a document as pretty-printed JSON.
pub fn encode(doc: &Document) -> String {
    let value = serde_json::Value::Object(to_json_object(doc));
    match serde_json::to_string_pretty(&value) {
        Ok(mut out) => {
            out.push('\n');
            out
        }
        Err(err) => {
            tracing::warn!(%err, "json serialization failed");
            String::new()
        }
    }
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => match n.as_f64() {
                Some(x) => Value::Float(x),
                None => Value::Null,
            },
        },
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(from_json).collect::<List>())
        }
        serde_json::Value::Object(map) => Value::Map(from_json_object(map)),
    }
}

fn from_json_object(map: serde_json::Map<String, serde_json::Value>) -> Document {
    map.into_iter()
        .map(|(key, value)| (key, from_json(value)))
        .collect()
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => (*b).into(),
        Value::Int(n) => (*n).into(),
        // NaN and infinities have no JSON spelling
        Value::Float(x) => serde_json::Number::from_f64(*x)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => s.clone().into(),
        Value::List(list) => serde_json::Value::Array(list.iter().map(to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(to_json_object(map)),
    }
}

fn to_json_object(doc: &Document) -> serde_json::Map<String, serde_json::Value> {
    doc.iter()
        .map(|(key, value)| (key.to_string(), to_json(value)))
        .collect()
}
