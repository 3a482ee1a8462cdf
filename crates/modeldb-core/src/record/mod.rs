//! Catalog records.
//!
//! A [`Record`] is one JSON object describing one product. Key order is
//! significant: canonical fields come first in [`CANONICAL_KEYS`] order and
//! unknown fields follow in the order they were encountered.

pub mod normalize;
pub mod path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

pub use normalize::normalize;
pub use path::{derive_path, CanonicalLocation};

/// Canonical field order for normalized record files.
pub const CANONICAL_KEYS: [&str; 13] = [
    "checked",
    "name",
    "number",
    "difficulty",
    "sheets",
    "link",
    "category",
    "type",
    "status",
    "instructionsLink",
    "360View",
    "description",
    "productimage",
];

/// One catalog entry, backed by an insertion-ordered JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Parses a record file's content.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidJson`] if the text is not JSON.
    /// - [`CoreError::NotAnObject`] if the JSON is an array, scalar or null.
    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| CoreError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wraps an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotAnObject`] unless `value` is an object.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(CoreError::NotAnObject),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the field as a string slice when it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in their stored order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Structural equality that also requires identical key order.
    pub fn same_layout(&self, other: &Record) -> bool {
        self.keys().eq(other.keys()) && self == other
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Serializes with 4-space indentation, preserving key order.
    pub fn to_pretty_json(&self) -> String {
        to_pretty_json(&self.fields)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Pretty-prints any serializable value with 4-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    // Serializing a JSON value tree into a Vec cannot fail.
    if value.serialize(&mut ser).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
