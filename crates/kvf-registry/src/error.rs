use kvf_fields::FieldError;
use kvf_types::TypeError;
use thiserror::Error;

use crate::model::HostError;

/// Errors from registering or using fields on a model.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A field with this name is already registered and the policy rejects
    /// overwriting it.
    #[error("field {field} is already registered on {model}")]
    DuplicateFieldName { model: String, field: String },

    #[error("no field {field} registered on {model}")]
    UnknownField { model: String, field: String },

    #[error("no accessor named {accessor}")]
    UnknownAccessor { accessor: String },

    /// The accessor needs a model instance but was called on the class.
    #[error("accessor {accessor} requires a model instance")]
    InstanceRequired { accessor: String },

    #[error("accessor {accessor} requires an argument")]
    MissingArgument { accessor: String },

    #[error("field {field} is not mirrored into a model attribute")]
    NotPersisted { field: String },

    /// The host model failed to accept the mirrored value or to save.
    #[error("model error while saving {field}: {source}")]
    Host {
        field: String,
        #[source]
        source: HostError,
    },

    #[error("invalid registry config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
