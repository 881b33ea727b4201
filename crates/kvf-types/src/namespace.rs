//! Backend key derivation.
//!
//! Keys are plain concatenations joined by [`DELIMITER`]. Nothing is escaped,
//! so the inputs are validated when identities, primary keys, and field
//! specs are constructed rather than here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeResult;
use crate::identity::{validate_part, ModelIdentity, PrimaryKey};

/// Separator between namespace segments and the field name.
pub const DELIMITER: char = ':';

/// The scope a field key is resolved in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyNamespace {
    /// Shared by every instance of a model type.
    Class(ModelIdentity),
    /// Private to one instance, identified by its primary key.
    Instance(ModelIdentity, PrimaryKey),
}

impl KeyNamespace {
    pub fn class(identity: ModelIdentity) -> Self {
        Self::Class(identity)
    }

    pub fn instance(identity: ModelIdentity, pk: PrimaryKey) -> Self {
        Self::Instance(identity, pk)
    }

    /// The model identity this namespace belongs to.
    pub fn identity(&self) -> &ModelIdentity {
        match self {
            Self::Class(identity) | Self::Instance(identity, _) => identity,
        }
    }

    /// The primary key, for instance namespaces.
    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        match self {
            Self::Class(_) => None,
            Self::Instance(_, pk) => Some(pk),
        }
    }

    /// Returns `true` for class-scoped namespaces.
    pub fn is_class(&self) -> bool {
        matches!(self, Self::Class(_))
    }

    /// Fully-qualified backend key for `field` in this namespace.
    pub fn key(&self, field: &str) -> String {
        field_key(&self.to_string(), field)
    }
}

impl fmt::Display for KeyNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(identity) => write!(f, "{identity}"),
            Self::Instance(identity, pk) => write!(f, "{identity}{DELIMITER}{pk}"),
        }
    }
}

/// Namespace string shared by all instances of a model type.
pub fn class_namespace(identity: &ModelIdentity) -> String {
    identity.to_string()
}

/// Namespace string for one instance of a model type.
pub fn instance_namespace(identity: &ModelIdentity, pk: &PrimaryKey) -> String {
    format!("{identity}{DELIMITER}{pk}")
}

/// Join a namespace and a field name into a backend key.
pub fn field_key(namespace: &str, name: &str) -> String {
    format!("{namespace}{DELIMITER}{name}")
}

/// Validate a field name before it is registered.
///
/// Field names must be non-empty and must not contain [`DELIMITER`].
pub fn validate_field_name(name: &str) -> TypeResult<()> {
    validate_part(name, "field name")
}
