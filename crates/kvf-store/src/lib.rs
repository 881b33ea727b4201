//! Key-value backend access for kvfield.
//!
//! The backend is treated as an opaque remote KV service exposing scalar,
//! counter, list, hash, set, and sorted-set primitives. Each primitive is one
//! blocking round trip; this crate adds no caching, retries, or timeouts.
//!
//! # Layers
//!
//! - [`KvBackend`] -- object-safe trait over raw bytes, one method per
//!   backend command
//! - [`InMemoryBackend`] -- `HashMap`-based backend for tests and embedding
//! - `RedisBackend` -- Redis over a synchronous connection (feature `redis`)
//! - [`StoreClient`] -- shared backend handle plus a [`Codec`], with typed
//!   helpers that encode and decode values
//!
//! # Atomicity
//!
//! Single primitives (`incr`, `decr`, `append`, `getset`, ...) are atomic at
//! the backend. Anything built from several calls is not.

pub mod client;
pub mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_backend;
pub mod traits;

pub use client::StoreClient;
pub use error::{StoreError, StoreResult};
pub use kvf_codec::Codec;
pub use memory::InMemoryBackend;
#[cfg(feature = "redis")]
pub use redis_backend::RedisBackend;
pub use traits::KvBackend;
