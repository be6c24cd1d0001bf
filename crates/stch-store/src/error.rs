//! Error types for object store framing.

use stch_object::ObjectError;
use stch_types::TypeError;

/// Errors from object store encoding and decoding.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum StoreError {
    /// The stream does not start with the store header.
    #[error("invalid store header: expected {}, found {}", hex::encode(.expected), hex::encode(.actual))]
    InvalidHeader { expected: Vec<u8>, actual: Vec<u8> },

    /// The entry count is zero, so there is no root.
    #[error("store has no entries")]
    Empty,

    /// A top-level entry could not be decoded.
    #[error("malformed entry {index}: {reason}")]
    MalformedEntry { index: usize, reason: String },

    /// An object failed to encode, decode, or resolve.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// Framing failure below the object layer.
    #[error(transparent)]
    Wire(#[from] TypeError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
