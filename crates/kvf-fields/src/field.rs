use kvf_codec::DynamicValue;
use serde_json::Value;

use crate::collection::{HashField, ListField, SetField, SortedSetField};
use crate::error::{FieldError, FieldResult};
use crate::ops::{FieldBinding, FieldOps};
use crate::scalar::{Counter, ObjectField, StringField};
use crate::spec::FieldKind;
use crate::value::FieldValue;

fn wrap(items: Vec<DynamicValue>) -> Vec<Value> {
    items.into_iter().map(Value::from).collect()
}

fn unwrap(items: Vec<Value>) -> Vec<DynamicValue> {
    items.into_iter().map(DynamicValue).collect()
}

/// A bound field of any kind.
///
/// Dispatches the uniform operations to the kind's handle and exchanges
/// values as [`FieldValue`]. Collection reads materialize the view.
#[derive(Clone, Debug)]
pub enum Field {
    Counter(Counter),
    String(StringField),
    Object(ObjectField<DynamicValue>),
    List(ListField<DynamicValue>),
    Hash(HashField<DynamicValue>),
    Set(SetField<DynamicValue>),
    SortedSet(SortedSetField<DynamicValue>),
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Counter(_) => FieldKind::Counter,
            Field::String(_) => FieldKind::String,
            Field::Object(_) => FieldKind::Object,
            Field::List(_) => FieldKind::List,
            Field::Hash(_) => FieldKind::Hash,
            Field::Set(_) => FieldKind::Set,
            Field::SortedSet(_) => FieldKind::SortedSet,
        }
    }

    fn binding(&self) -> &FieldBinding {
        match self {
            Field::Counter(f) => f.binding(),
            Field::String(f) => f.binding(),
            Field::Object(f) => f.binding(),
            Field::List(f) => f.binding(),
            Field::Hash(f) => f.binding(),
            Field::Set(f) => f.binding(),
            Field::SortedSet(f) => f.binding(),
        }
    }

    pub fn name(&self) -> &str {
        self.binding().name()
    }

    pub fn key(&self) -> String {
        self.binding().key()
    }

    pub fn exists(&self) -> FieldResult<bool> {
        Ok(self.binding().client().exists(&self.key())?)
    }

    /// Remove the backend key; a no-op when absent.
    pub fn delete(&self) -> FieldResult<()> {
        self.binding().client().delete(&self.key())?;
        Ok(())
    }

    /// Read the current value, with the kind's zero value when absent.
    ///
    /// Elements of raw-codec collections come back as strings.
    pub fn get(&self) -> FieldResult<FieldValue> {
        Ok(match self {
            Field::Counter(f) => FieldValue::Int(f.get()?),
            Field::String(f) => FieldValue::Text(f.get()?),
            Field::Object(f) => FieldValue::Object(f.get()?.map(Value::from)),
            Field::List(f) => FieldValue::List(wrap(f.get()?.items()?)),
            Field::Hash(f) => FieldValue::Hash(
                f.get()?
                    .items()?
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
            Field::Set(f) => FieldValue::Set(wrap(f.get()?.members()?)),
            Field::SortedSet(f) => FieldValue::SortedSet(wrap(f.get()?.items()?)),
        })
    }

    /// Write `value`, which must match the field's kind.
    ///
    /// Sorted sets take [`FieldValue::Scored`]; a plain list of members is
    /// accepted too and scores them by position.
    pub fn set(&self, value: FieldValue) -> FieldResult<()> {
        match (self, value) {
            (Field::Counter(f), FieldValue::Int(n)) => f.set(n),
            (Field::String(f), FieldValue::Text(s)) => f.set(s),
            (Field::Object(f), FieldValue::Object(Some(v))) => f.set(DynamicValue(v)),
            (Field::Object(f), FieldValue::Object(None)) => f.delete(),
            (Field::List(f), FieldValue::List(items)) => f.set(unwrap(items)),
            (Field::Hash(f), FieldValue::Hash(map)) => {
                f.set(map.into_iter().map(|(k, v)| (k, DynamicValue(v))).collect())
            }
            (Field::Set(f), FieldValue::Set(items) | FieldValue::List(items)) => {
                f.set(unwrap(items))
            }
            (Field::SortedSet(f), FieldValue::Scored(pairs)) => f.set(
                pairs
                    .into_iter()
                    .map(|(member, score)| (DynamicValue(member), score))
                    .collect(),
            ),
            (Field::SortedSet(f), FieldValue::SortedSet(items) | FieldValue::List(items)) => f
                .set(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(rank, member)| (DynamicValue(member), rank as f64))
                        .collect(),
                ),
            (field, _) => Err(FieldError::InvalidValue {
                field: field.name().to_string(),
                expected: field.kind(),
            }),
        }
    }

    pub fn as_counter(&self) -> FieldResult<&Counter> {
        match self {
            Field::Counter(f) => Ok(f),
            other => Err(other.mismatch(FieldKind::Counter)),
        }
    }

    pub fn as_string(&self) -> FieldResult<&StringField> {
        match self {
            Field::String(f) => Ok(f),
            other => Err(other.mismatch(FieldKind::String)),
        }
    }

    pub fn as_object(&self) -> FieldResult<&ObjectField<DynamicValue>> {
        match self {
            Field::Object(f) => Ok(f),
            other => Err(other.mismatch(FieldKind::Object)),
        }
    }

    fn mismatch(&self, expected: FieldKind) -> FieldError {
        FieldError::KindMismatch {
            field: self.name().to_string(),
            expected,
            actual: self.kind(),
        }
    }
}
