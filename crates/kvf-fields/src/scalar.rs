//! Counter, string, and object fields.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::FieldResult;
use crate::ops::{FieldBinding, FieldOps};

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// Integer counter with atomic increment and decrement.
///
/// Reading an absent counter returns `0` without writing anything.
#[derive(Clone, Debug)]
pub struct Counter {
    binding: FieldBinding,
}

impl Counter {
    pub(crate) fn new(binding: FieldBinding) -> Self {
        Self { binding }
    }

    /// Atomically add one and return the new value.
    pub fn incr(&self) -> FieldResult<i64> {
        Ok(self.binding.client().incr(&self.key())?)
    }

    /// Atomically subtract one and return the new value.
    pub fn decr(&self) -> FieldResult<i64> {
        Ok(self.binding.client().decr(&self.key())?)
    }
}

impl FieldOps for Counter {
    type Value = i64;
    type Output = i64;

    fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    fn get(&self) -> FieldResult<i64> {
        Ok(self.binding.client().get::<i64>(&self.key())?.unwrap_or(0))
    }

    /// Seed the counter; later `incr`/`decr` continue from `value`.
    fn set(&self, value: i64) -> FieldResult<()> {
        self.binding.client().set(&self.key(), &value)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

/// Text field that reads as `""` when absent.
///
/// The first read of an absent string stores `""`, so `exists()` is `true`
/// afterwards. The read and the write are separate round trips.
#[derive(Clone, Debug)]
pub struct StringField {
    binding: FieldBinding,
}

impl StringField {
    pub(crate) fn new(binding: FieldBinding) -> Self {
        Self { binding }
    }

    /// Append `fragment` and return the full new text.
    pub fn append(&self, fragment: &str) -> FieldResult<String> {
        Ok(self.binding.client().append(&self.key(), fragment)?)
    }

    /// Atomically replace the text and return the previous text.
    pub fn getset(&self, value: &str) -> FieldResult<Option<String>> {
        Ok(self
            .binding
            .client()
            .getset(&self.key(), &value.to_string())?)
    }
}

impl FieldOps for StringField {
    type Value = String;
    type Output = String;

    fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    fn get(&self) -> FieldResult<String> {
        let key = self.key();
        let client = self.binding.client();
        match client.get::<String>(&key)? {
            Some(text) => Ok(text),
            None => {
                client.set(&key, "")?;
                debug!(%key, "vivified empty string");
                Ok(String::new())
            }
        }
    }

    fn set(&self, value: String) -> FieldResult<()> {
        self.binding.client().set(&self.key(), &value)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Arbitrary serializable value stored through the field's codec.
#[derive(Debug)]
pub struct ObjectField<T> {
    binding: FieldBinding,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for ObjectField<T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            _value: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> ObjectField<T> {
    pub(crate) fn new(binding: FieldBinding) -> Self {
        Self {
            binding,
            _value: PhantomData,
        }
    }

    /// Atomically store `value` and return the previous value.
    ///
    /// Lets a consumer take over whatever a producer last stored without
    /// losing a concurrent write.
    pub fn getset(&self, value: &T) -> FieldResult<Option<T>> {
        Ok(self.binding.client().getset(&self.key(), value)?)
    }
}

impl<T: Serialize + DeserializeOwned> FieldOps for ObjectField<T> {
    type Value = T;
    type Output = Option<T>;

    fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    fn get(&self) -> FieldResult<Option<T>> {
        Ok(self.binding.client().get(&self.key())?)
    }

    fn set(&self, value: T) -> FieldResult<()> {
        self.binding.client().set(&self.key(), &value)?;
        Ok(())
    }
}
