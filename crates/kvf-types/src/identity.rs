use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::namespace::DELIMITER;

/// Reject empty values and values that would break key derivation.
pub(crate) fn validate_part(value: &str, what: &str) -> TypeResult<()> {
    if value.is_empty() {
        return Err(TypeError::invalid(value, format!("{what} must not be empty")));
    }
    if value.contains(DELIMITER) {
        return Err(TypeError::invalid(
            value,
            format!("{what} must not contain {DELIMITER:?}"),
        ));
    }
    Ok(())
}

/// Identity of a host model type, e.g. `fakemeta:myobject`.
///
/// Two distinct host types must never share a `ModelIdentity`; if they do,
/// their fields alias the same backend keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelIdentity {
    group: String,
    collection: String,
}

impl ModelIdentity {
    /// Build an identity from its group (application label) and collection
    /// (model name).
    pub fn new(group: impl Into<String>, collection: impl Into<String>) -> TypeResult<Self> {
        let group = group.into();
        let collection = collection.into();
        validate_part(&group, "identity group")?;
        validate_part(&collection, "identity collection")?;
        Ok(Self { group, collection })
    }

    /// The group half (application label).
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The collection half (model name).
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for ModelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DELIMITER}{}", self.group, self.collection)
    }
}

impl FromStr for ModelIdentity {
    type Err = TypeError;

    /// Parse the `group:collection` form.
    fn from_str(s: &str) -> TypeResult<Self> {
        match s.split_once(DELIMITER) {
            Some((group, collection)) => Self::new(group, collection),
            None => Err(TypeError::invalid(s, "expected <group>:<collection>")),
        }
    }
}

/// Primary key of a host instance, in its string form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimaryKey(String);

impl PrimaryKey {
    /// Build a primary key from any displayable value.
    pub fn new(value: impl fmt::Display) -> TypeResult<Self> {
        let value = value.to_string();
        validate_part(&value, "primary key")?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for PrimaryKey {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for PrimaryKey {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u32> for PrimaryKey {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}
