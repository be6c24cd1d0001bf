//! Errors raised while building, reading and writing object graphs.

use stch_types::TypeError;
use thiserror::Error;

use crate::graph::NodeId;

/// Errors produced while building, reading, or writing objects.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObjectError {
    /// No constructor is registered for the class id read from the stream.
    #[error("unknown class id {id} at offset {offset}")]
    UnknownClassId { id: u8, offset: usize },

    /// A second constructor was registered for the same class id.
    #[error("class id {0} is already registered")]
    DuplicateClassId(u8),

    /// Ids 0 and 99 cannot carry a class.
    #[error("class id {0} is reserved")]
    ReservedClassId(u8),

    /// A body was read into a template of a different class.
    #[error("class id mismatch: expected one of {expected:?}, got {actual}")]
    ClassIdMismatch { expected: Vec<u8>, actual: u8 },

    /// A field was read before the resolution pass filled it in.
    #[error("reference to position {0} has not been resolved")]
    UnresolvedReference(u32),

    /// A back-reference points past the end of the store.
    #[error("reference to position {position} is outside the table of {len} entries")]
    DanglingReference { position: u32, len: usize },

    /// A body failed its per-class validation.
    #[error("malformed {class} body: {reason}")]
    MalformedBody { class: &'static str, reason: String },

    /// A record's version byte does not match the active dialect.
    #[error("record {class_id} schema version mismatch: expected {expected}, got {actual}")]
    SchemaVersionMismatch {
        class_id: u8,
        expected: u8,
        actual: u8,
    },

    /// A record's field count byte does not match its applicable fields.
    #[error("record {class_id} field count mismatch: expected {expected}, got {actual}")]
    FieldCountMismatch {
        class_id: u8,
        expected: usize,
        actual: usize,
    },

    /// Fields need a name.
    #[error("field name must not be empty")]
    EmptyFieldName,

    /// A record declared the same field twice.
    #[error("field `{0}` is already declared")]
    DuplicateFieldName(String),

    /// The count byte cannot describe more fields.
    #[error("record cannot hold more than 255 fields")]
    TooManyFields,

    /// Lookup of an undeclared field.
    #[error("no field named `{0}`")]
    UnknownField(String),

    /// A node id from another graph, or past the end of this one.
    #[error("node {0} is not part of this graph")]
    UnknownNode(NodeId),

    /// The value is not of the expected kind.
    #[error("value is not a {0}")]
    WrongKind(&'static str),

    /// Short read or out-of-range write in the wire layer.
    #[error(transparent)]
    Wire(#[from] TypeError),
}

impl ObjectError {
    pub(crate) fn malformed(class: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            class,
            reason: reason.into(),
        }
    }
}

pub type ObjectResult<T> = Result<T, ObjectError>;
