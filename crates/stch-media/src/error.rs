//! Error types for the pixel codec.

use stch_object::ObjectError;
use stch_types::TypeError;
use thiserror::Error;

/// Errors from the pixel codec and form helpers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MediaError {
    #[error("cannot encode negative integer {0}")]
    NegativeInteger(i64),

    #[error("integer {0} does not fit in 32 bits")]
    IntegerTooLarge(i64),

    #[error("{0} pixels exceed the run-length limit")]
    TooManyPixels(usize),

    #[error("run of {run} words at offset {offset} overflows the remaining {remaining} pixels")]
    RunOverflow {
        offset: usize,
        run: usize,
        remaining: usize,
    },

    #[error("{pixels} pixels do not fill a {width}x{height} image")]
    DimensionMismatch {
        width: i64,
        height: i64,
        pixels: usize,
    },

    #[error("image dimension {0} is out of range")]
    InvalidDimension(i64),

    #[error("unsupported form depth {0}")]
    UnsupportedDepth(i16),

    #[error("value is not a form with byte-array bits")]
    NotAForm,

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Wire(#[from] TypeError),
}

pub type MediaResult<T> = Result<T, MediaError>;
