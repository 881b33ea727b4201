//! Typed fields persisted in a key-value backend.
//!
//! A [`FieldSpec`] describes one registered field: its name, [`FieldKind`],
//! [`Scope`], and [`Codec`](kvf_codec::Codec). Binding a spec to a
//! [`KeyNamespace`](kvf_types::KeyNamespace) and a
//! [`StoreClient`](kvf_store::StoreClient) yields a handle whose operations
//! go straight to the backend. Nothing is cached between calls.
//!
//! # Kinds
//!
//! | Kind | Handle | Zero value |
//! |---|---|---|
//! | Counter | [`Counter`] | `0` |
//! | String | [`StringField`] | `""`, written on first read |
//! | Object | [`ObjectField`] | `None` |
//! | List | [`ListField`] -> [`ListView`] | empty |
//! | Hash | [`HashField`] -> [`HashView`] | empty |
//! | Set | [`SetField`] -> [`SetView`] | empty |
//! | SortedSet | [`SortedSetField`] -> [`SortedSetView`] | empty |
//!
//! Every handle implements [`FieldOps`]. [`Field`] is the untyped sum over
//! all seven, exchanging values as [`FieldValue`].
//!
//! Replacing a collection deletes the key and then writes each element, and
//! the first read of a string writes `""`. Neither sequence is atomic.

pub mod collection;
pub mod error;
pub mod field;
pub mod ops;
pub mod scalar;
pub mod spec;
pub mod value;
pub mod view;

pub use collection::{HashField, ListField, SetField, SortedSetField};
pub use error::{FieldError, FieldResult};
pub use field::Field;
pub use ops::{FieldBinding, FieldOps};
pub use scalar::{Counter, ObjectField, StringField};
pub use spec::{FieldKind, FieldSpec, Scope};
pub use value::FieldValue;
pub use view::{HashView, ListView, SetView, SortedSetView};
