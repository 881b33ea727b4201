use std::collections::BTreeMap;
use std::sync::Arc;

use kvf_codec::{Codec, CodecError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvBackend;

/// Shared backend handle paired with the codec used for values.
///
/// Cloning is cheap: every clone talks to the same backend. Construct one
/// client at process start and derive per-field clients with
/// [`StoreClient::with_codec`].
#[derive(Clone)]
pub struct StoreClient {
    backend: Arc<dyn KvBackend>,
    codec: Codec,
}

impl StoreClient {
    /// Wrap a backend. Values use [`Codec::Raw`] until re-parameterized.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            codec: Codec::Raw,
        }
    }

    /// A client over the same backend that encodes values with `codec`.
    pub fn with_codec(&self, codec: Codec) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            codec,
        }
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn backend(&self) -> &Arc<dyn KvBackend> {
        &self.backend
    }

    /// Encode a value with this client's codec without touching the
    /// backend.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> StoreResult<Vec<u8>> {
        Ok(self.codec.encode(value)?)
    }

    fn decode_all<T: DeserializeOwned>(&self, items: Vec<Vec<u8>>) -> StoreResult<Vec<T>> {
        items
            .iter()
            .map(|item| self.codec.decode(item).map_err(StoreError::from))
            .collect()
    }

    // ---- Scalars ----

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.backend.get(key)? {
            Some(data) => Ok(Some(self.codec.decode(&data)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let data = self.codec.encode(value)?;
        self.backend.set(key, &data)?;
        debug!(%key, codec = %self.codec, bytes = data.len(), "set");
        Ok(())
    }

    /// Atomically store `value` and return the previous decoded value.
    pub fn getset<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        value: &T,
    ) -> StoreResult<Option<T>> {
        let data = self.codec.encode(value)?;
        let previous = self.backend.getset(key, &data)?;
        debug!(%key, had_previous = previous.is_some(), "getset");
        match previous {
            Some(old) => Ok(Some(self.codec.decode(&old)?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, key: &str) -> StoreResult<bool> {
        self.backend.exists(key)
    }

    /// Remove `key`. Returns `true` if it existed; absent keys are a no-op.
    pub fn delete(&self, key: &str) -> StoreResult<bool> {
        let existed = self.backend.delete(key)?;
        debug!(%key, existed, "delete");
        Ok(existed)
    }

    // ---- Counters and text ----

    pub fn incr(&self, key: &str) -> StoreResult<i64> {
        self.backend.incr(key)
    }

    pub fn decr(&self, key: &str) -> StoreResult<i64> {
        self.backend.decr(key)
    }

    /// Append text to the value at `key` and return the new text.
    pub fn append(&self, key: &str, fragment: &str) -> StoreResult<String> {
        let data = self.backend.append(key, fragment.as_bytes())?;
        String::from_utf8(data).map_err(|e| {
            StoreError::from(CodecError::Serialization(format!(
                "value at {key} is not UTF-8: {e}"
            )))
        })
    }

    // ---- Lists ----

    pub fn lpush<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<usize> {
        let data = self.codec.encode(value)?;
        self.backend.lpush(key, &data)
    }

    pub fn rpush<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<usize> {
        let data = self.codec.encode(value)?;
        self.backend.rpush(key, &data)
    }

    pub fn lrange<T: DeserializeOwned>(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> StoreResult<Vec<T>> {
        let items = self.backend.lrange(key, start, stop)?;
        self.decode_all(items)
    }

    pub fn llen(&self, key: &str) -> StoreResult<usize> {
        self.backend.llen(key)
    }

    // ---- Hashes ----

    pub fn hset<T: Serialize + ?Sized>(
        &self,
        key: &str,
        field: &str,
        value: &T,
    ) -> StoreResult<bool> {
        let data = self.codec.encode(value)?;
        self.backend.hset(key, field, &data)
    }

    pub fn hget<T: DeserializeOwned>(&self, key: &str, field: &str) -> StoreResult<Option<T>> {
        match self.backend.hget(key, field)? {
            Some(data) => Ok(Some(self.codec.decode(&data)?)),
            None => Ok(None),
        }
    }

    pub fn hgetall<T: DeserializeOwned>(&self, key: &str) -> StoreResult<BTreeMap<String, T>> {
        self.backend
            .hgetall(key)?
            .into_iter()
            .map(|(field, data)| -> StoreResult<(String, T)> {
                Ok((field, self.codec.decode(&data)?))
            })
            .collect()
    }

    // ---- Sets ----

    pub fn sadd<T: Serialize + ?Sized>(&self, key: &str, member: &T) -> StoreResult<bool> {
        let data = self.codec.encode(member)?;
        self.backend.sadd(key, &data)
    }

    pub fn smembers<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Vec<T>> {
        let items = self.backend.smembers(key)?;
        self.decode_all(items)
    }

    // ---- Sorted sets ----

    pub fn zadd<T: Serialize + ?Sized>(
        &self,
        key: &str,
        member: &T,
        score: f64,
    ) -> StoreResult<bool> {
        let data = self.codec.encode(member)?;
        self.backend.zadd(key, &data, score)
    }

    pub fn zrange<T: DeserializeOwned>(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> StoreResult<Vec<T>> {
        let items = self.backend.zrange(key, start, stop)?;
        self.decode_all(items)
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
