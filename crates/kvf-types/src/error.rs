use thiserror::Error;

/// Errors produced while building identities and namespaces.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A model identity, primary key, or field name is empty or contains the
    /// key delimiter.
    #[error("invalid identity {value:?}: {reason}")]
    InvalidIdentity { value: String, reason: String },
}

impl TypeError {
    pub(crate) fn invalid(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
