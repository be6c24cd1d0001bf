//! Encode and decode contexts threaded through object bodies.

use stch_types::{class_id, Dialect, WireReader, WireWriter};

use crate::error::{ObjectError, ObjectResult};
use crate::field::Field;
use crate::graph::ObjectGraph;
use crate::registry::{ClassRegistry, Template};
use crate::table::ReferenceTable;
use crate::value::Value;

/// Everything a body needs to write its children.
#[derive(Clone, Copy)]
pub struct Encoder<'a> {
    graph: &'a ObjectGraph,
    table: &'a ReferenceTable,
    dialect: Dialect,
}

impl<'a> Encoder<'a> {
    pub fn new(graph: &'a ObjectGraph, table: &'a ReferenceTable, dialect: Dialect) -> Self {
        Self {
            graph,
            table,
            dialect,
        }
    }

    pub fn graph(&self) -> &'a ObjectGraph {
        self.graph
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Class id followed by the body, never a back-reference.
    pub fn write_body(&self, value: &Value, out: &mut WireWriter) -> ObjectResult<()> {
        match value {
            Value::Node(id) => {
                let object = self.graph.node(*id)?;
                out.write_u8(object.class_id());
                object.write_payload(self, out)
            }
            inline => inline.write_inline(out),
        }
    }

    /// Back-reference if the value holds a table position, body otherwise.
    pub fn write_value(&self, value: &Value, out: &mut WireWriter) -> ObjectResult<()> {
        if value.is_reference_type() {
            if let Some(position) = self.table.lookup(value) {
                out.write_u8(class_id::BACK_REFERENCE);
                out.write_u24(position)?;
                return Ok(());
            }
        }
        self.write_body(value, out)
    }

    pub fn write_field(&self, field: &Field, out: &mut WireWriter) -> ObjectResult<()> {
        self.write_value(field.get()?, out)
    }
}

/// Deepest chain of objects written inline inside one another.
pub const MAX_DEPTH: usize = 256;

/// Everything a body needs to read its children.
#[derive(Clone, Copy)]
pub struct Decoder<'a> {
    registry: &'a ClassRegistry,
    dialect: Dialect,
    depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(registry: &'a ClassRegistry, dialect: Dialect) -> Self {
        Self {
            registry,
            dialect,
            depth: 0,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Number of enclosing object bodies being read.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Read one value. Back-references come back unresolved; reference
    /// types are allocated into `graph`.
    pub fn read_field(
        &self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
    ) -> ObjectResult<Field> {
        let offset = reader.position();
        let id = reader.read_u8()?;
        if id == class_id::BACK_REFERENCE {
            let position = reader.read_u24()?;
            return Field::unresolved(position);
        }

        let template = self
            .registry
            .construct(id, graph)
            .ok_or(ObjectError::UnknownClassId { id, offset })??;

        match template {
            Template::Inline(value) => Ok(Field::Resolved(value.read_inline(id, reader)?)),
            Template::Object(mut object) => {
                if self.depth >= MAX_DEPTH {
                    return Err(ObjectError::malformed(
                        class_id::name(id).unwrap_or("Record"),
                        format!("nested deeper than {MAX_DEPTH} levels at offset {offset}"),
                    ));
                }
                let nested = Decoder {
                    depth: self.depth + 1,
                    ..*self
                };
                object.read_payload(id, reader, graph, &nested)?;
                Ok(Field::Resolved(graph.insert(object)))
            }
        }
    }

    /// Read a value that must be an inline number.
    pub fn read_number(
        &self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        class: &'static str,
    ) -> ObjectResult<Value> {
        match self.read_field(reader, graph)? {
            Field::Resolved(value) if value.is_number() => Ok(value),
            _ => Err(ObjectError::malformed(class, "expected an inline number")),
        }
    }
}
