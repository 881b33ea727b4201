use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untyped value exchanged with a [`Field`](crate::Field).
///
/// Collection elements and object payloads are JSON values regardless of
/// the codec the field stores them with. The raw codec keeps only text, so
/// raw elements written as numbers or booleans read back as strings
/// (`1` comes back as `"1"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// No result (e.g. from `set` or `delete`).
    Unit,
    Bool(bool),
    Int(i64),
    Text(String),
    /// Object field contents; `None` when absent.
    Object(Option<Value>),
    List(Vec<Value>),
    Hash(BTreeMap<String, Value>),
    Set(Vec<Value>),
    /// Sorted set members in rank order, as read.
    SortedSet(Vec<Value>),
    /// Sorted set `(member, score)` pairs, as written.
    Scored(Vec<(Value, f64)>),
}

impl FieldValue {
    /// Plain JSON form, as mirrored into host attributes.
    pub fn into_json(self) -> Value {
        match self {
            FieldValue::Unit => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Int(n) => Value::from(n),
            FieldValue::Text(s) => Value::String(s),
            FieldValue::Object(v) => v.unwrap_or(Value::Null),
            FieldValue::List(items) | FieldValue::Set(items) | FieldValue::SortedSet(items) => {
                Value::Array(items)
            }
            FieldValue::Hash(map) => Value::Object(map.into_iter().collect()),
            FieldValue::Scored(pairs) => Value::Array(
                pairs
                    .into_iter()
                    .map(|(member, score)| Value::Array(vec![member, Value::from(score)]))
                    .collect(),
            ),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}
