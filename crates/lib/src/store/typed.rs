//! Typed accessor layer.
//!
//! All cross-type coercion between stored scalars and caller-facing Rust
//! types is centralized here, behind the [`FromValue`] trait. The default
//! accessors are lenient: a missing key yields the type's zero value, a
//! failed coercion silently falls back (that contract is inherited from the
//! system this store replaces, and callers depend on it). The strict variant
//! [`Store::get_strict`] turns a failed coercion into
//! [`StoreError::Coercion`] instead, for callers where a silent default could
//! mask corrupted data.
//!
//! Coercion table, applied per target:
//! - `bool`: `Bool`, or `Text` spelling `true`/`false` (case-insensitive)
//! - `i64`: `Int`, `Float` (truncated), or parseable `Text`
//! - `f64`: `Float`, `Int`, or parseable `Text`
//! - `String`: `Text`, or the display form of any other non-null scalar
//! - `Vec<T>`: a `List`; elements that fail to coerce are skipped, they do
//!   not fail the whole call

use std::sync::Arc;

use crate::doc::{KeyBuf, List, Value};

use super::{Store, errors::StoreError};

/// Conversion between stored values and caller-facing Rust types, including
/// the lenient textual coercions the accessor layer applies.
pub trait FromValue: Sized {
    /// Name of the target type, for strict-mode diagnostics.
    fn target_name() -> &'static str;

    /// Best-effort coercion from a stored value.
    fn from_value(value: &Value) -> Option<Self>;

    /// The value stored when this type is written (e.g. by
    /// [`Store::get_or_set_default`]).
    fn into_value(self) -> Value;
}

impl FromValue for bool {
    fn target_name() -> &'static str {
        "bool"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for i64 {
    fn target_name() -> &'static str {
        "int"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(*n),
            Value::Float(x) => Some(*x as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl FromValue for f64 {
    fn target_name() -> &'static str {
        "float"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for String {
    fn target_name() -> &'static str {
        "text"
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Some(value.to_string()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl FromValue for Value {
    fn target_name() -> &'static str {
        "value"
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn into_value(self) -> Value {
        self
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn target_name() -> &'static str {
        "list"
    }

    fn from_value(value: &Value) -> Option<Self> {
        let list = value.as_list()?;
        // elements that fail to coerce are skipped, not fatal
        Some(list.iter().filter_map(T::from_value).collect())
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(FromValue::into_value).collect::<List>())
    }
}

impl Store {
    /// Gets a value coerced to `T`, or `None` if the key is absent or the
    /// stored value cannot be coerced (the silent-fallback contract).
    pub fn get_coerced<T: FromValue>(&self, key: &str) -> crate::Result<Option<T>> {
        let value = self.get_value(key)?;
        Ok(value.as_ref().and_then(T::from_value))
    }

    /// Strict variant of [`Store::get_coerced`]: an absent key is `None`, but
    /// a present value that fails to coerce is a [`StoreError::Coercion`].
    pub fn get_strict<T: FromValue>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(value) => match T::from_value(&value) {
                Some(coerced) => Ok(Some(coerced)),
                None => Err(StoreError::Coercion {
                    key: key.to_string(),
                    target: T::target_name(),
                    found: value.kind_name(),
                }
                .into()),
            },
        }
    }

    /// Gets a string, or `""` if the key is absent or not coercible.
    pub fn get_string(&self, key: &str) -> crate::Result<String> {
        Ok(self.get_coerced(key)?.unwrap_or_default())
    }

    /// Gets an integer, or `0` if the key is absent or not coercible.
    pub fn get_int(&self, key: &str) -> crate::Result<i64> {
        Ok(self.get_coerced(key)?.unwrap_or_default())
    }

    /// Gets a float, or `0.0` if the key is absent or not coercible.
    pub fn get_float(&self, key: &str) -> crate::Result<f64> {
        Ok(self.get_coerced(key)?.unwrap_or_default())
    }

    /// Gets a boolean, or `false` if the key is absent or not coercible.
    pub fn get_bool(&self, key: &str) -> crate::Result<bool> {
        Ok(self.get_coerced(key)?.unwrap_or_default())
    }

    /// Gets a typed list; absent or non-list values yield an empty vec, and
    /// elements that fail to coerce are skipped.
    pub fn get_list<T: FromValue>(&self, key: &str) -> crate::Result<Vec<T>> {
        Ok(self.get_coerced(key)?.unwrap_or_default())
    }

    /// Gets a list of strings. See [`Store::get_list`].
    pub fn get_string_list(&self, key: &str) -> crate::Result<Vec<String>> {
        self.get_list(key)
    }

    /// Gets a list of integers. See [`Store::get_list`].
    pub fn get_int_list(&self, key: &str) -> crate::Result<Vec<i64>> {
        self.get_list(key)
    }

    /// Gets the value at `key` coerced to `T`; if the key is absent, stores
    /// `default` first and returns it.
    ///
    /// A miss is persisted, not just reported: after this call
    /// `contains_key(key)` is true. A present value that fails to coerce
    /// returns `default` without writing anything.
    pub fn get_or_set_default<T: FromValue + Clone>(
        &self,
        key: &str,
        default: T,
    ) -> crate::Result<T> {
        let key = KeyBuf::parse(key)?;
        let mut state = self.lock_fresh();
        match state.doc.get(&key) {
            Some(value) => Ok(T::from_value(value).unwrap_or(default)),
            None => {
                Arc::make_mut(&mut state.doc).insert(&key, default.clone().into_value())?;
                self.persist_locked(&mut state)?;
                Ok(default)
            }
        }
    }
}
