//! Object store container for the stch codec.
//!
//! A store flattens a root value and any number of orphans into a header,
//! an entry count, and one body per reference-table entry. Back-references
//! inside bodies point at 1-based entry positions, so the same graph with
//! its sharing and cycles comes back out of [`ObjectStore::decode`].
//!
//! # Design Rules
//!
//! 1. The root always occupies position 1, even when it is an inline value.
//! 2. Orphans follow everything reachable from the root, in the order given.
//! 3. Decoding reads every entry before resolving any back-reference.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{ObjectStore, HEADER};
