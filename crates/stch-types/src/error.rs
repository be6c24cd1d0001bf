//! Error types for wire-level primitives.

use thiserror::Error;

/// Errors produced by the wire primitives and dialect parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The stream ended inside a value.
    #[error("unexpected end of stream at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A value does not fit its wire width.
    #[error("{what} {value} exceeds the maximum of {max}")]
    ValueTooLarge {
        what: &'static str,
        value: u64,
        max: u64,
    },

    /// A dialect name that is neither Scratch 1.4 nor BYOB 3.1.1.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),
}

pub type TypeResult<T> = Result<T, TypeError>;
