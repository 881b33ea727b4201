//! Foundation types for kvfield.
//!
//! Every backend key touched by kvfield is derived from the types in this
//! crate. A host model type has a [`ModelIdentity`]; a live instance adds a
//! [`PrimaryKey`]. Together they select a [`KeyNamespace`], and a field name
//! appended to the namespace gives the fully-qualified backend key.
//!
//! # Key format
//!
//! ```text
//! <group>:<collection>:<field>          class scope
//! <group>:<collection>:<pk>:<field>     instance scope
//! ```
//!
//! No escaping is performed. Identity parts and field names must not contain
//! the [`DELIMITER`]; the constructors here reject them.

pub mod error;
pub mod identity;
pub mod namespace;

pub use error::{TypeError, TypeResult};
pub use identity::{ModelIdentity, PrimaryKey};
pub use namespace::{
    class_namespace, field_key, instance_namespace, validate_field_name, KeyNamespace, DELIMITER,
};
