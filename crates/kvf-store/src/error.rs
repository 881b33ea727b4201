use kvf_codec::CodecError;

/// Errors from backend operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or failed the request.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The key holds a different kind of value than the operation expects.
    #[error("wrong type at {key}: expected {expected}")]
    WrongType { key: String, expected: &'static str },

    /// `incr`/`decr` on a value that is not a 64-bit integer.
    #[error("value at {key} is not an integer or is out of range")]
    NotAnInteger { key: String },

    /// Encoding or decoding a value failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
