//! Live views over collection fields.
//!
//! A view holds a key and a client, never the data. Every read goes back to
//! the backend, and writes go straight through.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use kvf_store::StoreClient;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::FieldResult;

macro_rules! view_struct {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name<T> {
            key: String,
            client: StoreClient,
            _value: PhantomData<fn() -> T>,
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self {
                    key: self.key.clone(),
                    client: self.client.clone(),
                    _value: PhantomData,
                }
            }
        }

        impl<T> $name<T> {
            pub(crate) fn new(key: String, client: StoreClient) -> Self {
                Self {
                    key,
                    client,
                    _value: PhantomData,
                }
            }

            /// Backend key this view reads.
            pub fn key(&self) -> &str {
                &self.key
            }
        }
    };
}

view_struct!(
    /// Ordered list view.
    ListView
);
view_struct!(
    /// Field-name to value mapping view.
    HashView
);
view_struct!(
    /// Unordered set view. Members are returned in encoded-byte order.
    SetView
);
view_struct!(
    /// Sorted set view, lowest score first.
    SortedSetView
);

impl<T: Serialize + DeserializeOwned> ListView<T> {
    /// All elements, in order.
    pub fn items(&self) -> FieldResult<Vec<T>> {
        self.range(0, -1)
    }

    /// Elements `start..=stop`; negative indices count from the end.
    pub fn range(&self, start: isize, stop: isize) -> FieldResult<Vec<T>> {
        Ok(self.client.lrange(&self.key, start, stop)?)
    }

    pub fn len(&self) -> FieldResult<usize> {
        Ok(self.client.llen(&self.key)?)
    }

    pub fn is_empty(&self) -> FieldResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Append to the end; returns the new length.
    pub fn push(&self, value: &T) -> FieldResult<usize> {
        Ok(self.client.rpush(&self.key, value)?)
    }

    /// Prepend to the front; returns the new length.
    pub fn push_front(&self, value: &T) -> FieldResult<usize> {
        Ok(self.client.lpush(&self.key, value)?)
    }
}

impl<T: Serialize + DeserializeOwned> HashView<T> {
    pub fn items(&self) -> FieldResult<BTreeMap<String, T>> {
        Ok(self.client.hgetall(&self.key)?)
    }

    pub fn get(&self, field: &str) -> FieldResult<Option<T>> {
        Ok(self.client.hget(&self.key, field)?)
    }

    /// Returns `true` if `field` was not present before.
    pub fn insert(&self, field: &str, value: &T) -> FieldResult<bool> {
        Ok(self.client.hset(&self.key, field, value)?)
    }

    pub fn len(&self) -> FieldResult<usize> {
        Ok(self.client.backend().hgetall(&self.key)?.len())
    }

    pub fn is_empty(&self) -> FieldResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Serialize + DeserializeOwned> SetView<T> {
    pub fn members(&self) -> FieldResult<Vec<T>> {
        Ok(self.client.smembers(&self.key)?)
    }

    /// Returns `true` if `member` was not present before.
    pub fn add(&self, member: &T) -> FieldResult<bool> {
        Ok(self.client.sadd(&self.key, member)?)
    }

    pub fn len(&self) -> FieldResult<usize> {
        Ok(self.client.backend().smembers(&self.key)?.len())
    }

    pub fn is_empty(&self) -> FieldResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Serialize + DeserializeOwned> SortedSetView<T> {
    /// All members by ascending score.
    pub fn items(&self) -> FieldResult<Vec<T>> {
        self.range(0, -1)
    }

    /// Members ranked `start..=stop`; negative ranks count from the end.
    pub fn range(&self, start: isize, stop: isize) -> FieldResult<Vec<T>> {
        Ok(self.client.zrange(&self.key, start, stop)?)
    }

    /// Add `member` or update its score. Returns `true` if it is new.
    pub fn add(&self, member: &T, score: f64) -> FieldResult<bool> {
        Ok(self.client.zadd(&self.key, member, score)?)
    }

    pub fn len(&self) -> FieldResult<usize> {
        Ok(self.client.backend().zrange(&self.key, 0, -1)?.len())
    }

    pub fn is_empty(&self) -> FieldResult<bool> {
        Ok(self.len()? == 0)
    }
}
