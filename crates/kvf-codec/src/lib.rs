//! Value codecs for kvfield.
//!
//! A [`Codec`] turns field values into the bytes stored at a backend key and
//! back. The codec is chosen per field at registration time and never
//! changes for that field:
//!
//! - [`Codec::Raw`] -- scalar text passthrough (strings, numbers, booleans)
//! - [`Codec::Binary`] -- opaque `bincode` bytes, private to kvfield
//! - [`Codec::Json`] -- JSON text, readable by other systems
//!
//! Reading a key with a different codec than the one that wrote it is a
//! caller error. It usually surfaces as [`CodecError::Serialization`], but
//! not always.
//!
//! [`DynamicValue`] is the element type of the untyped field API. It keeps
//! the natural JSON shape under text codecs and a self-describing layout
//! under [`Codec::Binary`], which `bincode` needs to decode it.

pub mod codec;
pub mod dynamic;
pub mod error;

pub use codec::Codec;
pub use dynamic::DynamicValue;
pub use error::{CodecError, CodecResult};
