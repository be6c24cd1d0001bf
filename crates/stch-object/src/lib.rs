//! Object model for the stch codec.
//!
//! Values in a project stream form an arbitrary graph: objects are shared,
//! cycles are common, and every reference-type object is written exactly
//! once. This crate models that graph as an arena ([`ObjectGraph`]) of
//! [`Object`]s addressed by [`NodeId`], with inline primitives carried
//! directly in [`Value`].
//!
//! # Key Types
//!
//! - [`Value`] - inline primitive or handle to a graph node
//! - [`Field`] - a value or a pending back-reference
//! - [`ReferenceTable`] - identity-keyed 1-based positions
//! - [`ClassRegistry`] - class id to constructor mapping
//! - [`UserRecord`] / [`RecordSchema`] - schema-driven user classes
//!
//! # Design Rules
//!
//! 1. Object identity is node identity. Equal content does not make two
//!    nodes the same object.
//! 2. Inline values never get a table position unless they are a root.
//! 3. Decoding never resolves a back-reference before the whole stream has
//!    been read.

pub mod codec;
pub mod collection;
pub mod decimal;
pub mod error;
pub mod field;
pub mod fixed;
pub mod graph;
pub mod object;
pub mod record;
pub mod registry;
pub mod table;
pub mod value;

pub use codec::{Decoder, Encoder, MAX_DEPTH};
pub use collection::{Collection, CollectionKind, Dictionary, DictionaryKind};
pub use decimal::Decimal;
pub use error::{ObjectError, ObjectResult};
pub use field::Field;
pub use fixed::{Bytes, BytesKind, Color, Form, Point, Rectangle, Text, TextKind};
pub use graph::{NodeId, ObjectGraph};
pub use object::Object;
pub use record::{DefaultFn, FieldSlot, FieldSpec, RecordSchema, UserRecord, MAX_FIELDS};
pub use registry::{ClassRegistry, Constructor, Template};
pub use table::ReferenceTable;
pub use value::Value;
