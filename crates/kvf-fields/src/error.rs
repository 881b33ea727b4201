//! Error types for field operations.

use kvf_codec::Codec;
use kvf_store::StoreError;
use kvf_types::TypeError;
use thiserror::Error;

use crate::spec::{FieldKind, Scope};

/// Errors that can occur while binding or using a field.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The field was accessed through the wrong scope: a class-scoped field
    /// through an instance, or an instance-scoped field without one.
    #[error("field {field} is {scope}-scoped")]
    UnboundAccess { field: String, scope: Scope },

    /// A typed handle was requested for a field of another kind.
    #[error("field {field} is a {actual} field, not a {expected} field")]
    KindMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    /// An untyped value does not fit the field's kind.
    #[error("value for field {field} must be a {expected} value")]
    InvalidValue { field: String, expected: FieldKind },

    /// Counter and string fields store plain text and only accept the raw
    /// codec.
    #[error("{kind} fields cannot use the {codec} codec")]
    UnsupportedCodec { kind: FieldKind, codec: Codec },

    /// Invalid field name or namespace.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Backend or codec failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for field operations.
pub type FieldResult<T> = Result<T, FieldError>;
