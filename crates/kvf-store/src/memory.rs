use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvBackend;

/// A value held by the in-memory backend.
#[derive(Clone, Debug)]
enum Entry {
    Bytes(Vec<u8>),
    List(VecDeque<Vec<u8>>),
    Hash(BTreeMap<String, Vec<u8>>),
    Set(BTreeSet<Vec<u8>>),
    /// Kept sorted by `(score, member)`.
    SortedSet(Vec<(f64, Vec<u8>)>),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Bytes(_) => "string",
            Entry::List(_) => "list",
            Entry::Hash(_) => "hash",
            Entry::Set(_) => "set",
            Entry::SortedSet(_) => "zset",
        }
    }
}

fn wrong_type(key: &str, expected: &'static str) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
        expected,
    }
}

/// Resolve inclusive, possibly negative, range indices against `len`.
fn range_bounds(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// In-memory, HashMap-based key-value backend.
///
/// Intended for tests and embedding. Entries live behind a `RwLock`; each
/// trait method takes the lock once, so every primitive is atomic with
/// respect to other callers, as it is on a real backend.
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Sorted list of all keys.
    pub fn keys(&self) -> Vec<String> {
        let map = self.entries.read().expect("lock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KvBackend for InMemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(None),
            Some(Entry::Bytes(data)) => Ok(Some(data.clone())),
            Some(_) => Err(wrong_type(key, "string")),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(key.to_string(), Entry::Bytes(value.to_vec()));
        Ok(())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }

    fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut map = self.entries.write().expect("lock poisoned");
        let current = match map.get(key) {
            None => 0,
            Some(Entry::Bytes(data)) => std::str::from_utf8(data)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| StoreError::NotAnInteger {
                    key: key.to_string(),
                })?,
            Some(_) => return Err(wrong_type(key, "string")),
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::NotAnInteger {
                key: key.to_string(),
            })?;
        map.insert(key.to_string(), Entry::Bytes(next.to_string().into_bytes()));
        Ok(next)
    }

    fn append(&self, key: &str, fragment: &[u8]) -> StoreResult<Vec<u8>> {
        let mut map = self.entries.write().expect("lock poisoned");
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::Bytes(Vec::new()));
        match entry {
            Entry::Bytes(data) => {
                data.extend_from_slice(fragment);
                Ok(data.clone())
            }
            _ => Err(wrong_type(key, "string")),
        }
    }

    fn lpush(&self, key: &str, value: &[u8]) -> StoreResult<usize> {
        let mut map = self.entries.write().expect("lock poisoned");
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()));
        match entry {
            Entry::List(list) => {
                list.push_front(value.to_vec());
                Ok(list.len())
            }
            _ => Err(wrong_type(key, "list")),
        }
    }

    fn rpush(&self, key: &str, value: &[u8]) -> StoreResult<usize> {
        let mut map = self.entries.write().expect("lock poisoned");
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()));
        match entry {
            Entry::List(list) => {
                list.push_back(value.to_vec());
                Ok(list.len())
            }
            _ => Err(wrong_type(key, "list")),
        }
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::List(list)) => Ok(match range_bounds(list.len(), start, stop) {
                Some((from, to)) => list.range(from..=to).cloned().collect(),
                None => Vec::new(),
            }),
            Some(_) => Err(wrong_type(key, "list")),
        }
    }

    fn llen(&self, key: &str) -> StoreResult<usize> {
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(0),
            Some(Entry::List(list)) => Ok(list.len()),
            Some(_) => Err(wrong_type(key, "list")),
        }
    }

    fn hset(&self, key: &str, field: &str, value: &[u8]) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()));
        match entry {
            Entry::Hash(hash) => Ok(hash.insert(field.to_string(), value.to_vec()).is_none()),
            _ => Err(wrong_type(key, "hash")),
        }
    }

    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(None),
            Some(Entry::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(_) => Err(wrong_type(key, "hash")),
        }
    }

    fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Hash(hash)) => Ok(hash
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Some(_) => Err(wrong_type(key, "hash")),
        }
    }

    fn sadd(&self, key: &str, member: &[u8]) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()));
        match entry {
            Entry::Set(set) => Ok(set.insert(member.to_vec())),
            _ => Err(wrong_type(key, "set")),
        }
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key, "set")),
        }
    }

    fn zadd(&self, key: &str, member: &[u8], score: f64) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Entry::SortedSet(Vec::new()));
        let Entry::SortedSet(zset) = entry else {
            return Err(wrong_type(key, "zset"));
        };
        let existing = zset.iter().position(|(_, m)| m.as_slice() == member);
        let is_new = match existing {
            Some(index) => {
                zset[index].0 = score;
                false
            }
            None => {
                zset.push((score, member.to_vec()));
                true
            }
        };
        zset.sort_by(|(sa, ma), (sb, mb)| sa.total_cmp(sb).then_with(|| ma.cmp(mb)));
        Ok(is_new)
    }

    fn zrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        match map.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::SortedSet(zset)) => Ok(match range_bounds(zset.len(), start, stop) {
                Some((from, to)) => zset[from..=to].iter().map(|(_, m)| m.clone()).collect(),
                None => Vec::new(),
            }),
            Some(_) => Err(wrong_type(key, "zset")),
        }
    }

    fn getset(&self, key: &str, value: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let mut map = self.entries.write().expect("lock poisoned");
        if let Some(entry) = map.get(key) {
            if !matches!(entry, Entry::Bytes(_)) {
                return Err(wrong_type(key, "string"));
            }
        }
        let previous = map.insert(key.to_string(), Entry::Bytes(value.to_vec()));
        Ok(previous.and_then(|entry| match entry {
            Entry::Bytes(data) => Some(data),
            _ => None,
        }))
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let map = self.entries.read().expect("lock poisoned");
        let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
        for entry in map.values() {
            *kinds.entry(entry.kind()).or_default() += 1;
        }
        f.debug_struct("InMemoryBackend")
            .field("key_count", &map.len())
            .field("kinds", &kinds)
            .finish()
    }
}
