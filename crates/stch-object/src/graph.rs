//! Arena holding every reference-type object of a store.
//!
//! Objects refer to each other through [`NodeId`] handles, so shared
//! subgraphs and cycles need no special ownership. Two values are the
//! same object exactly when their handles are equal.

use std::borrow::Cow;
use std::fmt;

use stch_types::Dialect;
use tracing::trace;

use crate::collection::{Collection, CollectionKind, Dictionary, DictionaryKind};
use crate::error::{ObjectError, ObjectResult};
use crate::fixed::{Bytes, Color, Point, Rectangle, Text, TextKind};
use crate::object::Object;
use crate::table::ReferenceTable;
use crate::value::Value;

/// Handle to a node in an [`ObjectGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectGraph {
    nodes: Vec<Object>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node and return a value pointing at it.
    pub fn insert(&mut self, object: impl Into<Object>) -> Value {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(object.into());
        Value::Node(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Object> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Object> {
        self.nodes.get_mut(id.index())
    }

    pub fn node(&self, id: NodeId) -> ObjectResult<&Object> {
        self.get(id).ok_or(ObjectError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> ObjectResult<&mut Object> {
        self.get_mut(id).ok_or(ObjectError::UnknownNode(id))
    }

    /// Object behind `value`; `None` for inline values.
    pub fn object(&self, value: &Value) -> Option<&Object> {
        self.get(value.as_node()?)
    }

    pub fn object_mut(&mut self, value: &Value) -> Option<&mut Object> {
        self.get_mut(value.as_node()?)
    }

    pub fn class_id(&self, value: &Value) -> ObjectResult<u8> {
        match value {
            Value::Node(id) => Ok(self.node(*id)?.class_id()),
            inline => inline.class_id().ok_or(ObjectError::WrongKind("inline value")),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    pub fn text(&mut self, kind: TextKind, text: &str) -> Value {
        self.insert(Text::new(kind, text))
    }

    pub fn string(&mut self, text: &str) -> Value {
        self.text(TextKind::String, text)
    }

    pub fn symbol(&mut self, text: &str) -> Value {
        self.text(TextKind::Symbol, text)
    }

    pub fn utf8(&mut self, text: &str) -> Value {
        self.text(TextKind::Utf8, text)
    }

    pub fn byte_array(&mut self, data: Vec<u8>) -> Value {
        self.insert(Bytes::byte_array(data))
    }

    pub fn collection(&mut self, kind: CollectionKind, values: Vec<Value>) -> Value {
        self.insert(Collection::with_values(kind, values))
    }

    pub fn array(&mut self, values: Vec<Value>) -> Value {
        self.collection(CollectionKind::Array, values)
    }

    pub fn ordered_collection(&mut self, values: Vec<Value>) -> Value {
        self.collection(CollectionKind::OrderedCollection, values)
    }

    pub fn dictionary(&mut self) -> Value {
        self.insert(Dictionary::new(DictionaryKind::Dictionary))
    }

    pub fn color(&mut self, red: u16, green: u16, blue: u16) -> Value {
        self.insert(Color::new(red, green, blue))
    }

    pub fn point(&mut self, x: i64, y: i64) -> Value {
        self.insert(Point::from_i64(x, y))
    }

    pub fn rectangle(&mut self, x: i64, y: i64, width: i64, height: i64) -> Value {
        self.insert(Rectangle::from_i64(x, y, width, height))
    }

    /// Content of a text node.
    pub fn text_of(&self, value: &Value) -> Option<Cow<'_, str>> {
        Some(self.object(value)?.as_text()?.as_str())
    }

    // -----------------------------------------------------------------------
    // Reference table construction and resolution
    // -----------------------------------------------------------------------

    /// Assign table positions to every reference type reachable from
    /// `root`, in depth-first pre-order. Returns whether `root` itself
    /// was newly added.
    ///
    /// Record fields not present in `dialect` are not visited. Objects
    /// already in the table stop the walk, which is what makes cycles
    /// terminate.
    pub fn make_references(
        &self,
        root: &Value,
        table: &mut ReferenceTable,
        dialect: Dialect,
    ) -> ObjectResult<bool> {
        let Value::Node(root_id) = root else {
            return Ok(false);
        };
        if !table.insert(root.clone()) {
            return Ok(false);
        }

        let mut stack = Vec::new();
        self.push_children(*root_id, dialect, &mut stack)?;
        while let Some(value) = stack.pop() {
            let Value::Node(id) = value else { continue };
            if table.insert(value) {
                self.push_children(id, dialect, &mut stack)?;
            }
        }

        trace!(root = %root_id, entries = table.len(), "collected references");
        Ok(true)
    }

    /// Push reference-type children so the first one is popped first.
    fn push_children(
        &self,
        id: NodeId,
        dialect: Dialect,
        stack: &mut Vec<Value>,
    ) -> ObjectResult<()> {
        let mark = stack.len();
        for field in self.node(id)?.fields(dialect) {
            let child = field.get()?;
            if child.is_reference_type() {
                stack.push(child.clone());
            }
        }
        stack[mark..].reverse();
        Ok(())
    }

    /// Resolve pending back-references in every node.
    pub fn resolve_all(&mut self, table: &ReferenceTable) -> ObjectResult<()> {
        for object in &mut self.nodes {
            object.resolve_references(table)?;
        }
        Ok(())
    }
}
