//! Reference table: the map between objects and their stream positions.

use std::collections::HashMap;

use stch_types::{Dialect, WireWriter};

use crate::codec::Encoder;
use crate::error::ObjectResult;
use crate::graph::{NodeId, ObjectGraph};
use crate::value::Value;

/// Identity-keyed table assigning 1-based positions to stream entries.
///
/// Reference types are keyed by node handle; inline values (only ever a
/// non-reference root) are compared by value.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    entries: Vec<Value>,
    nodes: HashMap<NodeId, u32>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based position of `value`, if present.
    pub fn lookup(&self, value: &Value) -> Option<u32> {
        match value {
            Value::Node(id) => self.nodes.get(id).copied(),
            inline => self
                .entries
                .iter()
                .position(|v| v == inline)
                .map(|i| i as u32 + 1),
        }
    }

    /// Entry at a 1-based position; `None` when out of range.
    pub fn get(&self, position: u32) -> Option<&Value> {
        let index = (position as usize).checked_sub(1)?;
        self.entries.get(index)
    }

    /// Add `value` unless already present. Returns whether it was added.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.lookup(&value).is_some() {
            return false;
        }
        self.append(value);
        true
    }

    /// Add `value` at the next position without checking for duplicates.
    /// Decoding uses this so positions follow stream order exactly.
    pub fn append(&mut self, value: Value) -> u32 {
        self.entries.push(value);
        let position = self.entries.len() as u32;
        if let Some(id) = self.entries[self.entries.len() - 1].as_node() {
            self.nodes.entry(id).or_insert(position);
        }
        position
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.entries.iter()
    }

    /// Write `value` as a back-reference when it has a position, or as a
    /// full body otherwise.
    pub fn write_field(
        &self,
        graph: &ObjectGraph,
        value: &Value,
        out: &mut WireWriter,
        dialect: Dialect,
    ) -> ObjectResult<()> {
        Encoder::new(graph, self, dialect).write_value(value, out)
    }
}
