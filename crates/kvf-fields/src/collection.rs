//! List, hash, set, and sorted set fields.
//!
//! `get` returns a live view; `set` replaces the whole collection by
//! encoding every element, deleting the key, and writing the elements
//! again.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use kvf_store::{StoreClient, StoreResult};

use crate::error::FieldResult;
use crate::ops::{FieldBinding, FieldOps};
use crate::view::{HashView, ListView, SetView, SortedSetView};

fn encode_all<'a, T: Serialize + 'a>(
    client: &StoreClient,
    values: impl IntoIterator<Item = &'a T>,
) -> StoreResult<Vec<Vec<u8>>> {
    values.into_iter().map(|value| client.encode(value)).collect()
}

macro_rules! collection_struct {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name<T> {
            binding: FieldBinding,
            _value: PhantomData<fn() -> T>,
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self {
                    binding: self.binding.clone(),
                    _value: PhantomData,
                }
            }
        }

        impl<T> $name<T> {
            pub(crate) fn new(binding: FieldBinding) -> Self {
                Self {
                    binding,
                    _value: PhantomData,
                }
            }
        }
    };
}

collection_struct!(
    /// Ordered list of values.
    ListField
);
collection_struct!(
    /// Mapping from field names to values.
    HashField
);
collection_struct!(
    /// Set of distinct values.
    SetField
);
collection_struct!(
    /// Values ordered by a floating-point score.
    SortedSetField
);

impl<T: Serialize + DeserializeOwned> FieldOps for ListField<T> {
    type Value = Vec<T>;
    type Output = ListView<T>;

    fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    fn get(&self) -> FieldResult<ListView<T>> {
        Ok(ListView::new(self.key(), self.binding.client().clone()))
    }

    fn set(&self, values: Vec<T>) -> FieldResult<()> {
        let encoded = encode_all(self.binding.client(), &values)?;
        self.binding
            .replace(encoded, |backend, key, data| backend.rpush(key, &data).map(drop))
    }
}

impl<T: Serialize + DeserializeOwned> FieldOps for HashField<T> {
    type Value = BTreeMap<String, T>;
    type Output = HashView<T>;

    fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    fn get(&self) -> FieldResult<HashView<T>> {
        Ok(HashView::new(self.key(), self.binding.client().clone()))
    }

    fn set(&self, values: BTreeMap<String, T>) -> FieldResult<()> {
        let client = self.binding.client();
        let encoded = values
            .iter()
            .map(|(field, value)| -> StoreResult<(String, Vec<u8>)> {
                Ok((field.clone(), client.encode(value)?))
            })
            .collect::<StoreResult<Vec<_>>>()?;
        self.binding.replace(encoded, |backend, key, (field, data)| {
            backend.hset(key, &field, &data).map(drop)
        })
    }
}

impl<T: Serialize + DeserializeOwned> FieldOps for SetField<T> {
    type Value = Vec<T>;
    type Output = SetView<T>;

    fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    fn get(&self) -> FieldResult<SetView<T>> {
        Ok(SetView::new(self.key(), self.binding.client().clone()))
    }

    fn set(&self, members: Vec<T>) -> FieldResult<()> {
        let encoded = encode_all(self.binding.client(), &members)?;
        self.binding
            .replace(encoded, |backend, key, data| backend.sadd(key, &data).map(drop))
    }
}

impl<T: Serialize + DeserializeOwned> FieldOps for SortedSetField<T> {
    type Value = Vec<(T, f64)>;
    type Output = SortedSetView<T>;

    fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    fn get(&self) -> FieldResult<SortedSetView<T>> {
        Ok(SortedSetView::new(self.key(), self.binding.client().clone()))
    }

    fn set(&self, pairs: Vec<(T, f64)>) -> FieldResult<()> {
        let client = self.binding.client();
        let encoded = pairs
            .iter()
            .map(|(member, score)| -> StoreResult<(Vec<u8>, f64)> {
                Ok((client.encode(member)?, *score))
            })
            .collect::<StoreResult<Vec<_>>>()?;
        self.binding.replace(encoded, |backend, key, (data, score)| {
            backend.zadd(key, &data, score).map(drop)
        })
    }
}
