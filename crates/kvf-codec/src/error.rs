use thiserror::Error;

/// Errors from encoding or decoding field values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The raw codec only stores scalar text values.
    #[error("raw codec cannot store {0} values")]
    UnsupportedType(String),

    /// Serialization or deserialization failure, usually a codec mismatch
    /// between the writer and the reader of a key.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
