//! Foundation types for the stch project-file codec.
//!
//! Every other stch crate depends on `stch-types`. It carries the pieces of
//! the binary format that have no notion of objects yet: which dialect a
//! stream belongs to, the fixed class identifier table, and the big-endian
//! primitives every body is framed with.
//!
//! # Key Types
//!
//! - [`Dialect`] - Scratch 1.4 or BYOB 3.1.1, with their project headers
//! - [`ClassVersion`] - per-dialect schema version of a user record
//! - [`WireWriter`] / [`WireReader`] - big-endian framing over `bytes`
//! - [`class_id`] - the fixed class identifier table

pub mod class_id;
pub mod dialect;
pub mod error;
pub mod wire;

pub use dialect::{ClassVersion, Dialect};
pub use error::{TypeError, TypeResult};
pub use wire::{WireReader, WireWriter, MAX_POSITION};
