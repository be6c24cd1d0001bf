//! Object store framing: header, entry count, then one body per entry.
//!
//! Encoding walks the root and then each orphan. Decoding reads every
//! entry, resolves back-references in one pass, and recovers the orphans
//! as whatever follows the root's reachable prefix.

use stch_object::{ClassRegistry, Encoder, Field, ObjectGraph, ReferenceTable, Value};
use stch_types::{Dialect, WireReader, WireWriter};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Magic bytes opening every object store.
pub const HEADER: &[u8; 10] = b"ObjS\x01Stch\x01";

/// A root value, its orphans, and the graph they live in.
///
/// Orphans are values that should be written even though nothing
/// reachable from the root refers to them.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectStore {
    graph: ObjectGraph,
    root: Value,
    orphans: Vec<Value>,
}

impl ObjectStore {
    pub fn new(graph: ObjectGraph, root: Value) -> Self {
        Self::with_orphans(graph, root, Vec::new())
    }

    pub fn with_orphans(graph: ObjectGraph, root: Value, orphans: Vec<Value>) -> Self {
        Self {
            graph,
            root,
            orphans,
        }
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ObjectGraph {
        &mut self.graph
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn set_root(&mut self, root: Value) {
        self.root = root;
    }

    pub fn orphans(&self) -> &[Value] {
        &self.orphans
    }

    pub fn add_orphan(&mut self, orphan: Value) {
        self.orphans.push(orphan);
    }

    pub fn into_parts(self) -> (ObjectGraph, Value, Vec<Value>) {
        (self.graph, self.root, self.orphans)
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    /// Positions for every entry that will be written, in stream order.
    pub fn reference_table(&self, dialect: Dialect) -> StoreResult<ReferenceTable> {
        let mut table = ReferenceTable::new();
        if !self.root.is_reference_type() {
            table.insert(self.root.clone());
        }
        self.graph.make_references(&self.root, &mut table, dialect)?;
        for orphan in &self.orphans {
            if !orphan.is_reference_type() {
                warn!(%orphan, "inline orphan has no table position, skipping");
                continue;
            }
            self.graph.make_references(orphan, &mut table, dialect)?;
        }
        Ok(table)
    }

    pub fn write_to(&self, out: &mut WireWriter, dialect: Dialect) -> StoreResult<()> {
        let table = self.reference_table(dialect)?;
        out.write_bytes(HEADER);
        out.write_len_u32(table.len())?;

        let encoder = Encoder::new(&self.graph, &table, dialect);
        for value in table.iter() {
            encoder.write_body(value, out)?;
        }

        debug!(
            entries = table.len(),
            orphans = self.orphans.len(),
            %dialect,
            "encoded object store"
        );
        Ok(())
    }

    pub fn encode(&self, dialect: Dialect) -> StoreResult<Vec<u8>> {
        let mut out = WireWriter::new();
        self.write_to(&mut out, dialect)?;
        Ok(out.into_bytes())
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    /// Read one store, leaving `reader` just past its last entry.
    pub fn read_from(
        reader: &mut WireReader<'_>,
        registry: &ClassRegistry,
        dialect: Dialect,
    ) -> StoreResult<Self> {
        let available = reader.remaining().min(HEADER.len());
        let header = reader.read_bytes(available)?;
        if header != HEADER {
            return Err(StoreError::InvalidHeader {
                expected: HEADER.to_vec(),
                actual: header.to_vec(),
            });
        }

        let count = reader.read_u32()? as usize;
        if count == 0 {
            return Err(StoreError::Empty);
        }

        let mut graph = ObjectGraph::new();
        let mut table = ReferenceTable::new();
        for index in 0..count {
            match registry.read_one(reader, &mut graph, dialect)? {
                Field::Resolved(value) => {
                    table.append(value);
                }
                Field::Unresolved(position) => {
                    return Err(StoreError::MalformedEntry {
                        index,
                        reason: format!("top-level back-reference to position {position}"),
                    });
                }
            }
        }

        // Every entry is known now, so back-references can be resolved.
        graph.resolve_all(&table)?;

        let entries: Vec<Value> = table.iter().cloned().collect();
        let root = entries.first().cloned().ok_or(StoreError::Empty)?;

        let mut reachable = ReferenceTable::new();
        if !root.is_reference_type() {
            reachable.insert(root.clone());
        }
        graph.make_references(&root, &mut reachable, dialect)?;
        let split = reachable.len().min(entries.len());
        let orphans = entries[split..].to_vec();

        debug!(
            entries = count,
            orphans = orphans.len(),
            nodes = graph.len(),
            %dialect,
            "decoded object store"
        );
        Ok(Self {
            graph,
            root,
            orphans,
        })
    }

    /// Decode a store occupying all of `bytes`.
    pub fn decode(bytes: &[u8], registry: &ClassRegistry, dialect: Dialect) -> StoreResult<Self> {
        let mut reader = WireReader::new(bytes);
        let store = Self::read_from(&mut reader, registry, dialect)?;
        if !reader.is_empty() {
            warn!(trailing = reader.remaining(), "ignoring bytes after object store");
        }
        Ok(store)
    }
}
