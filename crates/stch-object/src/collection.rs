//! Collections and dictionaries.
//!
//! Both write a `u32` entry count followed by their entries as fields, so
//! shared entries become back-references.

use stch_types::{class_id, WireReader, WireWriter};

use crate::codec::{Decoder, Encoder};
use crate::error::ObjectResult;
use crate::field::Field;
use crate::graph::ObjectGraph;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Array,
    OrderedCollection,
    Set,
    IdentitySet,
}

impl CollectionKind {
    pub fn class_id(self) -> u8 {
        match self {
            Self::Array => class_id::ARRAY,
            Self::OrderedCollection => class_id::ORDERED_COLLECTION,
            Self::Set => class_id::SET,
            Self::IdentitySet => class_id::IDENTITY_SET,
        }
    }
}

/// An ordered sequence of fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection {
    kind: CollectionKind,
    entries: Vec<Field>,
}

impl Collection {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn with_values(kind: CollectionKind, values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            kind,
            entries: values.into_iter().map(Field::new).collect(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, value: Value) {
        self.entries.push(Field::new(value));
    }

    pub fn get(&self, index: usize) -> Option<&Field> {
        self.entries.get(index)
    }

    /// Insert at `index`, shifting later entries. Returns `false` when
    /// `index` is past the end.
    pub fn insert(&mut self, index: usize, value: Value) -> bool {
        if index > self.entries.len() {
            return false;
        }
        self.entries.insert(index, Field::new(value));
        true
    }

    /// Replace the entry at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: Value) -> Option<Field> {
        let slot = self.entries.get_mut(index)?;
        Some(std::mem::replace(slot, Field::new(value)))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.entries.iter()
    }

    pub fn remove(&mut self, index: usize) -> Option<Field> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub(crate) fn fields(&self) -> Vec<&Field> {
        self.entries.iter().collect()
    }

    pub(crate) fn fields_mut(&mut self) -> Vec<&mut Field> {
        self.entries.iter_mut().collect()
    }

    pub(crate) fn write_payload(
        &self,
        encoder: &Encoder<'_>,
        out: &mut WireWriter,
    ) -> ObjectResult<()> {
        out.write_len_u32(self.entries.len())?;
        for entry in &self.entries {
            encoder.write_field(entry, out)?;
        }
        Ok(())
    }

    pub(crate) fn read_payload(
        &mut self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        decoder: &Decoder<'_>,
    ) -> ObjectResult<()> {
        let count = reader.read_u32()? as usize;
        self.entries = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            self.entries.push(decoder.read_field(reader, graph)?);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DictionaryKind {
    Dictionary,
    IdentityDictionary,
}

impl DictionaryKind {
    pub fn class_id(self) -> u8 {
        match self {
            Self::Dictionary => class_id::DICTIONARY,
            Self::IdentityDictionary => class_id::IDENTITY_DICTIONARY,
        }
    }
}

/// Insertion-ordered key/value pairs.
///
/// Keys compare by node identity for reference types and by value for
/// inline values. [`Dictionary::get_by_text`] looks up by string content.
#[derive(Clone, Debug, PartialEq)]
pub struct Dictionary {
    kind: DictionaryKind,
    entries: Vec<(Field, Field)>,
}

impl Dictionary {
    pub fn new(kind: DictionaryKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> DictionaryKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &Field)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Field> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Field> {
        self.entries.iter().map(|(_, v)| v)
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.get().map_or(false, |k| k == key))
    }

    /// Insert or replace, returning the previous value for `key`.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Field> {
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, Field::new(value))),
            None => {
                self.entries.push((Field::new(key), Field::new(value)));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Field> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn remove(&mut self, key: &Value) -> Option<Field> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Key that is a text object with content `key`.
    pub fn key_by_text<'a>(&'a self, graph: &ObjectGraph, key: &str) -> Option<&'a Value> {
        self.keys().filter_map(|k| k.get().ok()).find(|k| {
            graph
                .object(k)
                .and_then(|o| o.as_text())
                .map_or(false, |t| t.as_bytes() == key.as_bytes())
        })
    }

    /// Value whose key is a text object with content `key`.
    pub fn get_by_text<'a>(&'a self, graph: &ObjectGraph, key: &str) -> Option<&'a Value> {
        let key = self.key_by_text(graph, key)?;
        self.get(key)?.get().ok()
    }

    pub(crate) fn fields(&self) -> Vec<&Field> {
        self.entries.iter().flat_map(|(k, v)| [k, v]).collect()
    }

    pub(crate) fn fields_mut(&mut self) -> Vec<&mut Field> {
        self.entries
            .iter_mut()
            .flat_map(|(k, v)| [k, v])
            .collect()
    }

    pub(crate) fn write_payload(
        &self,
        encoder: &Encoder<'_>,
        out: &mut WireWriter,
    ) -> ObjectResult<()> {
        out.write_len_u32(self.entries.len())?;
        for (key, value) in &self.entries {
            encoder.write_field(key, out)?;
            encoder.write_field(value, out)?;
        }
        Ok(())
    }

    pub(crate) fn read_payload(
        &mut self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        decoder: &Decoder<'_>,
    ) -> ObjectResult<()> {
        let count = reader.read_u32()? as usize;
        self.entries = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            let key = decoder.read_field(reader, graph)?;
            let value = decoder.read_field(reader, graph)?;
            self.entries.push((key, value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::TextKind;

    #[test]
    fn insert_replaces_equal_inline_keys() {
        let mut dict = Dictionary::new(DictionaryKind::Dictionary);
        assert!(dict.insert(Value::SmallInt16(1), Value::True).is_none());
        let old = dict.insert(Value::SmallInt16(1), Value::False);
        assert_eq!(old, Some(Field::new(Value::True)));
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get(&Value::SmallInt16(1)), Some(&Field::new(Value::False)));
    }

    #[test]
    fn distinct_nodes_are_distinct_keys() {
        let mut graph = ObjectGraph::new();
        let a = graph.text(TextKind::String, "k");
        let b = graph.text(TextKind::String, "k");
        let mut dict = Dictionary::new(DictionaryKind::Dictionary);
        dict.insert(a.clone(), Value::SmallInt16(1));
        dict.insert(b, Value::SmallInt16(2));
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get(&a), Some(&Field::new(Value::SmallInt16(1))));
        assert_eq!(dict.keys().count(), 2);
        assert_eq!(
            dict.values().cloned().collect::<Vec<_>>(),
            vec![Field::new(Value::SmallInt16(1)), Field::new(Value::SmallInt16(2))]
        );
        assert!(dict.remove(&a).is_some());
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn lookup_by_text_content() {
        let mut graph = ObjectGraph::new();
        let key = graph.text(TextKind::String, "language");
        let value = graph.text(TextKind::String, "en");
        let mut dict = Dictionary::new(DictionaryKind::Dictionary);
        dict.insert(key, value.clone());
        assert_eq!(dict.get_by_text(&graph, "language"), Some(&value));
        assert_eq!(dict.get_by_text(&graph, "author"), None);
    }

    #[test]
    fn text_key_lookup_returns_the_stored_key() {
        let mut graph = ObjectGraph::new();
        let first = graph.text(TextKind::String, "author");
        let second = graph.text(TextKind::Utf8, "author");
        let mut dict = Dictionary::new(DictionaryKind::Dictionary);
        dict.insert(first.clone(), Value::Nil);
        dict.insert(second, Value::True);

        assert_eq!(dict.key_by_text(&graph, "author"), Some(&first));
        assert_eq!(dict.get_by_text(&graph, "author"), Some(&Value::Nil));
        assert_eq!(dict.key_by_text(&graph, "comment"), None);
    }

    #[test]
    fn collection_accessors() {
        let mut c = Collection::with_values(CollectionKind::Array, [Value::Nil, Value::True]);
        c.push(Value::False);
        assert_eq!(c.len(), 3);
        assert_eq!(c.get(2), Some(&Field::new(Value::False)));
        assert!(c.insert(3, Value::Nil));
        assert!(!c.insert(9, Value::Nil));
        assert_eq!(c.set(1, Value::SmallInt16(4)), Some(Field::new(Value::True)));
        assert_eq!(c.set(9, Value::Nil), None);
        assert_eq!(c.len(), 4);
        assert_eq!(c.remove(0), Some(Field::new(Value::Nil)));
        assert_eq!(c.remove(5), None);
        assert_eq!(c.kind().class_id(), class_id::ARRAY);
    }
}
