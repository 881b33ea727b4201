use crate::error::StoreResult;

/// Primitive operations of a key-value backend.
///
/// Every method is a single blocking round trip. Implementations must be
/// thread-safe; one backend is shared by every field in the process.
///
/// Absent keys are never an error: reads return `None` or an empty
/// collection, and writes create the structure they need. Range indices are
/// inclusive, and negative indices count from the end (`-1` is the last
/// element).
pub trait KvBackend: Send + Sync {
    /// `GET`
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// `SET`: overwrites whatever the key held.
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// `EXISTS`
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// `DEL`. Returns `true` if the key existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// `INCRBY`/`DECRBY`: an absent key starts at 0.
    fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64>;

    /// `APPEND`: returns the full value after appending.
    fn append(&self, key: &str, fragment: &[u8]) -> StoreResult<Vec<u8>>;

    /// `LPUSH`: returns the new list length.
    fn lpush(&self, key: &str, value: &[u8]) -> StoreResult<usize>;

    /// `RPUSH`: returns the new list length.
    fn rpush(&self, key: &str, value: &[u8]) -> StoreResult<usize>;

    /// `LRANGE`
    fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>>;

    /// `LLEN`
    fn llen(&self, key: &str) -> StoreResult<usize>;

    /// `HSET`: returns `true` if the field is new.
    fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<bool>;

    /// `HGET`
    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>>;

    /// `HGETALL`, ordered by field name.
    fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// `SADD`: returns `true` if the member is new.
    fn sadd(&self, key: &str, member: &[u8]) -> StoreResult<bool>;

    /// `SMEMBERS`
    fn smembers(&self, key: &str) -> StoreResult<Vec<Vec<u8>>>;

    /// `ZADD`: returns `true` if the member is new. Re-adding a member
    /// updates its score.
    fn zadd(&self, key: &str, member: &[u8], score: f64) -> StoreResult<bool>;

    /// `ZRANGE` by rank, lowest score first.
    fn zrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>>;

    /// `GETSET`: stores `value` and returns the previous value atomically.
    fn getset(&self, key: &str, value: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// `INCR`
    fn incr(&self, key: &str) -> StoreResult<i64> {
        self.incr_by(key, 1)
    }

    /// `DECR`
    fn decr(&self, key: &str) -> StoreResult<i64> {
        self.incr_by(key, -1)
    }
}
