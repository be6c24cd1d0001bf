//! User records: schema-driven objects with class ids 100 and up.
//!
//! A record body is a version byte, a field-count byte, and then the
//! fields applicable to the current dialect in declaration order. Fields
//! bound to a dialect are skipped entirely in the other one.

use std::sync::Arc;

use stch_types::{ClassVersion, Dialect, WireReader, WireWriter};

use crate::codec::{Decoder, Encoder};
use crate::error::{ObjectError, ObjectResult};
use crate::field::Field;
use crate::graph::ObjectGraph;
use crate::value::Value;

/// Most fields a record can declare; the count is written as one byte.
pub const MAX_FIELDS: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSlot {
    name: String,
    field: Field,
    dialect: Option<Dialect>,
}

impl FieldSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Dialect this field is restricted to, if any.
    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }

    pub fn is_applicable(&self, dialect: Dialect) -> bool {
        self.dialect.map_or(true, |d| d == dialect)
    }
}

/// An instance of a user-defined class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    class_id: u8,
    name: Arc<str>,
    version: ClassVersion,
    slots: Vec<FieldSlot>,
}

impl UserRecord {
    pub fn new(class_id: u8, name: impl Into<Arc<str>>, version: ClassVersion) -> Self {
        Self {
            class_id,
            name: name.into(),
            version,
            slots: Vec::new(),
        }
    }

    pub fn class_id(&self) -> u8 {
        self.class_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> ClassVersion {
        self.version
    }

    pub fn schema_version(&self, dialect: Dialect) -> u8 {
        self.version.get(dialect)
    }

    /// Append a field. `dialect` restricts it to one dialect.
    pub fn declare_field(
        &mut self,
        name: &str,
        default: Value,
        dialect: Option<Dialect>,
    ) -> ObjectResult<()> {
        if name.is_empty() {
            return Err(ObjectError::EmptyFieldName);
        }
        if self.slot(name).is_some() {
            return Err(ObjectError::DuplicateFieldName(name.to_string()));
        }
        if self.slots.len() >= MAX_FIELDS {
            return Err(ObjectError::TooManyFields);
        }
        self.slots.push(FieldSlot {
            name: name.to_string(),
            field: Field::new(default),
            dialect,
        });
        Ok(())
    }

    fn slot(&self, name: &str) -> Option<&FieldSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    fn slot_mut(&mut self, name: &str) -> ObjectResult<&mut FieldSlot> {
        self.slots
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ObjectError::UnknownField(name.to_string()))
    }

    pub fn get_field(&self, name: &str) -> ObjectResult<&Value> {
        self.slot(name)
            .ok_or_else(|| ObjectError::UnknownField(name.to_string()))?
            .field
            .get()
    }

    pub fn set_field(&mut self, name: &str, value: Value) -> ObjectResult<()> {
        self.slot_mut(name)?.field.set(value);
        Ok(())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    pub fn applicable_count(&self, dialect: Dialect) -> usize {
        self.slots.iter().filter(|s| s.is_applicable(dialect)).count()
    }

    pub(crate) fn fields(&self, dialect: Dialect) -> Vec<&Field> {
        self.slots
            .iter()
            .filter(|s| s.is_applicable(dialect))
            .map(|s| &s.field)
            .collect()
    }

    pub(crate) fn fields_mut(&mut self) -> Vec<&mut Field> {
        self.slots.iter_mut().map(|s| &mut s.field).collect()
    }

    pub(crate) fn write_payload(
        &self,
        encoder: &Encoder<'_>,
        out: &mut WireWriter,
    ) -> ObjectResult<()> {
        let dialect = encoder.dialect();
        out.write_u8(self.schema_version(dialect));
        // At most MAX_FIELDS slots exist, so the count fits a byte.
        out.write_u8(self.applicable_count(dialect) as u8);
        for slot in self.slots.iter().filter(|s| s.is_applicable(dialect)) {
            encoder.write_field(&slot.field, out)?;
        }
        Ok(())
    }

    pub(crate) fn read_payload(
        &mut self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        decoder: &Decoder<'_>,
    ) -> ObjectResult<()> {
        let dialect = decoder.dialect();
        let version = reader.read_u8()?;
        let expected = self.schema_version(dialect);
        if version != expected {
            return Err(ObjectError::SchemaVersionMismatch {
                class_id: self.class_id,
                expected,
                actual: version,
            });
        }

        let count = reader.read_u8()? as usize;
        let expected = self.applicable_count(dialect);
        if count != expected {
            return Err(ObjectError::FieldCountMismatch {
                class_id: self.class_id,
                expected,
                actual: count,
            });
        }

        for slot in self.slots.iter_mut().filter(|s| s.is_applicable(dialect)) {
            slot.field = decoder.read_field(reader, graph)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

/// Produces a fresh default for one field. Reference-type defaults are
/// allocated into the graph the record is being built in.
pub type DefaultFn = fn(&mut ObjectGraph) -> ObjectResult<Value>;

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub default: DefaultFn,
    pub dialect: Option<Dialect>,
}

/// Declarative description of a user class.
///
/// Subclassing is expressed by declaring the parent's fields first; see
/// [`RecordSchema::extend`].
#[derive(Clone, Debug)]
pub struct RecordSchema {
    class_id: u8,
    name: Arc<str>,
    version: ClassVersion,
    fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub fn new(class_id: u8, name: &str, version: ClassVersion) -> Self {
        Self {
            class_id,
            name: name.into(),
            version,
            fields: Vec::new(),
        }
    }

    /// Start a schema whose first fields are `parent`'s.
    pub fn extend(parent: &RecordSchema, class_id: u8, name: &str, version: ClassVersion) -> Self {
        Self {
            fields: parent.fields.clone(),
            ..Self::new(class_id, name, version)
        }
    }

    pub fn class_id(&self) -> u8 {
        self.class_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> ClassVersion {
        self.version
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Declare a field present in every dialect.
    pub fn field(&mut self, name: &'static str, default: DefaultFn) -> ObjectResult<&mut Self> {
        self.declare(name, default, None)
    }

    /// Declare a field present only in `dialect`.
    pub fn field_in(
        &mut self,
        dialect: Dialect,
        name: &'static str,
        default: DefaultFn,
    ) -> ObjectResult<&mut Self> {
        self.declare(name, default, Some(dialect))
    }

    fn declare(
        &mut self,
        name: &'static str,
        default: DefaultFn,
        dialect: Option<Dialect>,
    ) -> ObjectResult<&mut Self> {
        if name.is_empty() {
            return Err(ObjectError::EmptyFieldName);
        }
        if self.fields.iter().any(|f| f.name == name) {
            return Err(ObjectError::DuplicateFieldName(name.to_string()));
        }
        if self.fields.len() >= MAX_FIELDS {
            return Err(ObjectError::TooManyFields);
        }
        self.fields.push(FieldSpec {
            name,
            default,
            dialect,
        });
        Ok(self)
    }

    /// Build a record with every field at its default.
    pub fn instantiate(&self, graph: &mut ObjectGraph) -> ObjectResult<UserRecord> {
        let mut record = UserRecord::new(self.class_id, self.name.clone(), self.version);
        for spec in &self.fields {
            let default = (spec.default)(graph)?;
            record.declare_field(spec.name, default, spec.dialect)?;
        }
        Ok(record)
    }
}
