use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Untyped field element.
///
/// Human-readable formats (JSON, the raw codec) see the wrapped
/// [`serde_json::Value`] unchanged. Binary formats see the same tagged
/// layout that [`Codec::Binary`](crate::Codec::Binary) stores, which
/// `bincode` can decode without knowing the shape up front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DynamicValue(pub Value);

impl DynamicValue {
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for DynamicValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<DynamicValue> for Value {
    fn from(value: DynamicValue) -> Self {
        value.0
    }
}

/// Self-describing value tree stored by the binary codec.
#[derive(Serialize, Deserialize)]
pub(crate) enum Tagged {
    Null,
    Bool(bool),
    U64(u64),
    I64(i64),
    F64(f64),
    String(String),
    Array(Vec<Tagged>),
    Object(Vec<(String, Tagged)>),
}

impl From<&Value> for Tagged {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Tagged::Null,
            Value::Bool(b) => Tagged::Bool(*b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Tagged::U64(u)
                } else if let Some(i) = n.as_i64() {
                    Tagged::I64(i)
                } else {
                    Tagged::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Tagged::String(s.clone()),
            Value::Array(items) => Tagged::Array(items.iter().map(Tagged::from).collect()),
            Value::Object(map) => Tagged::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Tagged::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Tagged> for Value {
    fn from(tagged: Tagged) -> Self {
        match tagged {
            Tagged::Null => Value::Null,
            Tagged::Bool(b) => Value::Bool(b),
            Tagged::U64(u) => Value::Number(Number::from(u)),
            Tagged::I64(i) => Value::Number(Number::from(i)),
            // Non-finite floats have no JSON form.
            Tagged::F64(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            Tagged::String(s) => Value::String(s),
            Tagged::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Tagged::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            self.0.serialize(serializer)
        } else {
            Tagged::from(&self.0).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            Value::deserialize(deserializer).map(Self)
        } else {
            Tagged::deserialize(deserializer).map(|t| Self(Value::from(t)))
        }
    }
}
