use kvf_codec::Codec;
use serde::{Deserialize, Serialize};

use crate::error::RegistryResult;

/// What happens when a field name is registered twice on one model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The later registration replaces the earlier one.
    #[default]
    Overwrite,
    /// The later registration fails with `DuplicateFieldName`.
    Reject,
}

/// Configuration for a [`Registrar`](crate::Registrar).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Behaviour on duplicate field names.
    pub duplicate_policy: DuplicatePolicy,
    /// Codec for object and collection fields added through the
    /// `add_*` entry points.
    pub default_codec: Codec,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Overwrite,
            default_codec: Codec::Binary,
        }
    }
}

impl RegistryConfig {
    /// A configuration that rejects duplicate field names.
    pub fn strict() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> RegistryResult<Self> {
        Ok(toml::from_str(source)?)
    }
}
