//! Redis backend over a synchronous connection.
//!
//! Only compiled with the `redis` feature. Connection parameters come from
//! the host process; this module just opens the URL it is given.

use std::collections::HashMap;
use std::sync::Mutex;

use redis::{Commands, RedisError};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvBackend;

/// [`KvBackend`] backed by a single Redis connection.
///
/// Calls are serialized on the connection. Connection errors are returned
/// as [`StoreError::Unavailable`] without retrying.
pub struct RedisBackend {
    conn: Mutex<redis::Connection>,
}

impl RedisBackend {
    /// Connect to a Redis URL such as `redis://localhost:6379/0`.
    pub fn open(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Unavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection()
            .map_err(|e| StoreError::Unavailable(format!("failed to connect to redis: {e}")))?;
        debug!(%url, "redis backend connected");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn run<T>(
        &self,
        key: &str,
        expected: &'static str,
        op: impl FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        op(&mut conn).map_err(|e| map_redis_error(key, expected, e))
    }
}

fn map_redis_error(key: &str, expected: &'static str, err: RedisError) -> StoreError {
    if err.code() == Some("WRONGTYPE") {
        return StoreError::WrongType {
            key: key.to_string(),
            expected,
        };
    }
    if err.to_string().contains("not an integer") {
        return StoreError::NotAnInteger {
            key: key.to_string(),
        };
    }
    StoreError::Unavailable(err.to_string())
}

impl KvBackend for RedisBackend {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.run(key, "string", |c| c.get(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.run(key, "string", |c| c.set(key, value))
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        self.run(key, "any", |c| c.exists(key))
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let removed: usize = self.run(key, "any", |c| c.del(key))?;
        Ok(removed > 0)
    }

    fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.run(key, "string", |c| c.incr(key, delta))
    }

    fn append(&self, key: &str, fragment: &[u8]) -> StoreResult<Vec<u8>> {
        let (value,): (Vec<u8>,) = self.run(key, "string", |c| {
            redis::pipe()
                .atomic()
                .append(key, fragment)
                .ignore()
                .get(key)
                .query(c)
        })?;
        Ok(value)
    }

    fn lpush(&self, key: &str, value: &[u8]) -> StoreResult<usize> {
        self.run(key, "list", |c| c.lpush(key, value))
    }

    fn rpush(&self, key: &str, value: &[u8]) -> StoreResult<usize> {
        self.run(key, "list", |c| c.rpush(key, value))
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>> {
        self.run(key, "list", |c| c.lrange(key, start, stop))
    }

    fn llen(&self, key: &str) -> StoreResult<usize> {
        self.run(key, "list", |c| c.llen(key))
    }

    fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<bool> {
        let added: usize = self.run(key, "hash", |c| c.hset(key, field, value))?;
        Ok(added > 0)
    }

    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>> {
        self.run(key, "hash", |c| c.hget(key, field))
    }

    fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let map: HashMap<String, Vec<u8>> = self.run(key, "hash", |c| c.hgetall(key))?;
        let mut entries: Vec<(String, Vec<u8>)> = map.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }

    fn sadd(&self, key: &str, member: &[u8]) -> StoreResult<bool> {
        let added: usize = self.run(key, "set", |c| c.sadd(key, member))?;
        Ok(added > 0)
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        let mut members: Vec<Vec<u8>> = self.run(key, "set", |c| c.smembers(key))?;
        members.sort();
        Ok(members)
    }

    fn zadd(&self, key: &str, member: &[u8], score: f64) -> StoreResult<bool> {
        let added: usize = self.run(key, "zset", |c| c.zadd(key, member, score))?;
        Ok(added > 0)
    }

    fn zrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>> {
        self.run(key, "zset", |c| c.zrange(key, start, stop))
    }

    fn getset(&self, key: &str, value: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.run(key, "string", |c| c.getset(key, value))
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend").finish_non_exhaustive()
    }
}
