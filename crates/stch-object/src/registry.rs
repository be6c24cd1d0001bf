//! Class id to constructor mapping used when decoding.

use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;
use stch_types::{class_id, Dialect, WireReader};
use tracing::debug;

use crate::codec::Decoder;
use crate::collection::{Collection, CollectionKind, Dictionary, DictionaryKind};
use crate::error::{ObjectError, ObjectResult};
use crate::field::Field;
use crate::fixed::{Bytes, BytesKind, Color, Form, Point, Rectangle, Text, TextKind};
use crate::graph::ObjectGraph;
use crate::object::Object;
use crate::record::RecordSchema;
use crate::value::Value;

/// A blank instance ready to read a body into.
#[derive(Clone, Debug, PartialEq)]
pub enum Template {
    Inline(Value),
    Object(Object),
}

impl From<Object> for Template {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

/// Builds a fresh template. Record constructors allocate their
/// reference-type defaults into the graph.
pub type Constructor = Arc<dyn Fn(&mut ObjectGraph) -> ObjectResult<Template> + Send + Sync>;

/// Maps each of the 255 class ids to the constructor for that class.
#[derive(Clone)]
pub struct ClassRegistry {
    constructors: Vec<Option<Constructor>>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self {
            constructors: vec![None; 256],
        }
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("registered", &self.registered_ids().collect::<Vec<_>>())
            .finish()
    }
}

fn fixed_constructor<F>(make: F) -> Constructor
where
    F: Fn() -> Template + Send + Sync + 'static,
{
    Arc::new(move |_: &mut ObjectGraph| -> ObjectResult<Template> { Ok(make()) })
}

impl ClassRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every fixed-format class (ids 1–35).
    pub fn with_fixed_formats() -> Self {
        let mut registry = Self::new();
        let inline = [
            (class_id::NIL, Value::Nil),
            (class_id::TRUE, Value::True),
            (class_id::FALSE, Value::False),
            (class_id::SMALL_INTEGER, Value::SmallInt(0)),
            (class_id::SMALL_INTEGER_16, Value::SmallInt16(0)),
            (class_id::LARGE_POSITIVE_INTEGER, Value::LargePositive(BigUint::default())),
            (class_id::LARGE_NEGATIVE_INTEGER, Value::LargeNegative(BigUint::default())),
            (class_id::FLOAT, Value::Float(0.0)),
        ];
        for (id, template) in inline {
            registry.set(id, fixed_constructor(move || Template::Inline(template.clone())));
        }

        let objects: [(u8, fn() -> Object); 18] = [
            (class_id::STRING, || Text::new(TextKind::String, "").into()),
            (class_id::SYMBOL, || Text::new(TextKind::Symbol, "").into()),
            (class_id::UTF8, || Text::new(TextKind::Utf8, "").into()),
            (class_id::BYTE_ARRAY, || Bytes::empty(BytesKind::ByteArray).into()),
            (class_id::SOUND_BUFFER, || Bytes::empty(BytesKind::SoundBuffer).into()),
            (class_id::BITMAP, || Bytes::empty(BytesKind::Bitmap).into()),
            (class_id::ARRAY, || Collection::new(CollectionKind::Array).into()),
            (class_id::ORDERED_COLLECTION, || {
                Collection::new(CollectionKind::OrderedCollection).into()
            }),
            (class_id::SET, || Collection::new(CollectionKind::Set).into()),
            (class_id::IDENTITY_SET, || Collection::new(CollectionKind::IdentitySet).into()),
            (class_id::DICTIONARY, || Dictionary::new(DictionaryKind::Dictionary).into()),
            (class_id::IDENTITY_DICTIONARY, || {
                Dictionary::new(DictionaryKind::IdentityDictionary).into()
            }),
            (class_id::COLOR, || Color::new(0, 0, 0).into()),
            (class_id::TRANSLUCENT_COLOR, || Color::translucent(0, 0, 0, 0).into()),
            (class_id::POINT, || Point::from_i64(0, 0).into()),
            (class_id::RECTANGLE, || Rectangle::from_i64(0, 0, 0, 0).into()),
            (class_id::FORM, || Form::new(0, 0, 0, Value::Nil).into()),
            (class_id::COLOR_FORM, || {
                Form::new(0, 0, 0, Value::Nil).with_color_map(Value::Nil).into()
            }),
        ];
        for (id, make) in objects {
            registry.set(id, fixed_constructor(move || Template::Object(make())));
        }
        registry
    }

    fn set(&mut self, id: u8, constructor: Constructor) {
        self.constructors[id as usize] = Some(constructor);
    }

    /// Register a constructor. Fails if `id` is taken or reserved.
    pub fn register<F>(&mut self, id: u8, constructor: F) -> ObjectResult<()>
    where
        F: Fn(&mut ObjectGraph) -> ObjectResult<Template> + Send + Sync + 'static,
    {
        if id == 0 || id == class_id::BACK_REFERENCE {
            return Err(ObjectError::ReservedClassId(id));
        }
        if self.is_registered(id) {
            return Err(ObjectError::DuplicateClassId(id));
        }
        self.set(id, Arc::new(constructor));
        debug!(class_id = id, "registered class");
        Ok(())
    }

    /// Register a user class built from `schema`.
    pub fn register_record(&mut self, schema: Arc<RecordSchema>) -> ObjectResult<()> {
        let id = schema.class_id();
        self.register(id, move |graph| {
            Ok(Template::Object(Object::Record(schema.instantiate(graph)?)))
        })
    }

    pub fn is_registered(&self, id: u8) -> bool {
        self.constructors[id as usize].is_some()
    }

    pub fn registered_ids(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|id| self.is_registered(*id))
    }

    /// Build a template for `id`; `None` if nothing is registered.
    pub fn construct(&self, id: u8, graph: &mut ObjectGraph) -> Option<ObjectResult<Template>> {
        let constructor = self.constructors[id as usize].as_ref()?;
        Some(constructor(graph))
    }

    /// Read one value from `reader`.
    pub fn read_one(
        &self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        dialect: Dialect,
    ) -> ObjectResult<Field> {
        Decoder::new(self, dialect).read_field(reader, graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stch_types::ClassVersion;

    fn read(bytes: &[u8]) -> ObjectResult<(Field, ObjectGraph)> {
        let registry = ClassRegistry::with_fixed_formats();
        let mut graph = ObjectGraph::new();
        let field = registry.read_one(&mut WireReader::new(bytes), &mut graph, Dialect::Scratch14)?;
        Ok((field, graph))
    }

    #[test]
    fn fixed_formats_are_registered() {
        let registry = ClassRegistry::with_fixed_formats();
        let ids: Vec<u8> = registry.registered_ids().collect();
        assert_eq!(
            ids,
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 20, 21, 22, 23, 24, 25, 30, 31, 32, 33, 34, 35]
        );
    }

    #[test]
    fn duplicate_and_reserved_ids_are_rejected() {
        let mut registry = ClassRegistry::with_fixed_formats();
        assert_eq!(
            registry.register(9, |_| Ok(Template::Inline(Value::Nil))),
            Err(ObjectError::DuplicateClassId(9))
        );
        assert_eq!(
            registry.register(99, |_| Ok(Template::Inline(Value::Nil))),
            Err(ObjectError::ReservedClassId(99))
        );
        assert!(registry
            .register(200, |_| Ok(Template::Inline(Value::Nil)))
            .is_ok());
    }

    #[test]
    fn back_reference_is_unresolved() {
        let (field, graph) = read(&[99, 0x00, 0x01, 0x02]).unwrap();
        assert_eq!(field.position(), Some(258));
        assert!(graph.is_empty());
    }

    #[test]
    fn unknown_class_reports_offset() {
        assert_eq!(
            read(&[77]).unwrap_err(),
            ObjectError::UnknownClassId { id: 77, offset: 0 }
        );
    }

    #[test]
    fn reads_inline_and_reference_values() {
        let (field, graph) = read(&[4, 0, 0, 1, 0]).unwrap();
        assert_eq!(field.get().unwrap(), &Value::SmallInt(256));
        assert!(graph.is_empty());

        let (field, graph) = read(&[9, 0, 0, 0, 2, b'h', b'i']).unwrap();
        assert_eq!(graph.text_of(field.get().unwrap()).unwrap(), "hi");
    }

    #[test]
    fn point_body_reads_inline_numbers() {
        let (field, graph) = read(&[32, 5, 0, 3, 8, 0x3F, 0xF0, 0, 0, 0, 0, 0, 0]).unwrap();
        let point = graph.object(field.get().unwrap()).and_then(Object::as_point).unwrap();
        assert_eq!(
            point,
            &Point::new(Value::SmallInt16(3), Value::Float(1.0)).unwrap()
        );
    }

    #[test]
    fn point_with_non_number_is_malformed() {
        assert!(matches!(
            read(&[32, 1, 5, 0, 0]),
            Err(ObjectError::MalformedBody { .. })
        ));
    }

    #[test]
    fn truncated_body_is_an_error() {
        assert!(matches!(
            read(&[14, 0, 0, 0, 9, b'x']),
            Err(ObjectError::Wire(_))
        ));
    }

    #[test]
    fn record_constructor_builds_from_schema() {
        let mut schema = RecordSchema::new(120, "Box", ClassVersion::uniform(1));
        schema.field("size", |_| Ok(Value::SmallInt16(0))).unwrap();
        let mut registry = ClassRegistry::with_fixed_formats();
        registry.register_record(Arc::new(schema)).unwrap();

        let mut graph = ObjectGraph::new();
        let field = registry
            .read_one(
                &mut WireReader::new(&[120, 1, 1, 5, 0, 9]),
                &mut graph,
                Dialect::Scratch14,
            )
            .unwrap();
        let record = graph.object(field.get().unwrap()).and_then(Object::as_record).unwrap();
        assert_eq!(record.get_field("size").unwrap(), &Value::SmallInt16(9));
    }
}
