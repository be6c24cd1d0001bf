use stch_types::{class_id, Dialect, WireReader, WireWriter};

use crate::codec::{Decoder, Encoder};
use crate::collection::{Collection, Dictionary};
use crate::error::{ObjectError, ObjectResult};
use crate::field::Field;
use crate::fixed::{Bytes, Color, Form, Point, Rectangle, Text};
use crate::graph::ObjectGraph;
use crate::record::UserRecord;
use crate::table::ReferenceTable;

/// A reference-type object. Lives in an [`ObjectGraph`] and is addressed
/// by node handle.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Text(Text),
    Bytes(Bytes),
    Collection(Collection),
    Dictionary(Dictionary),
    Color(Color),
    Point(Point),
    Rectangle(Rectangle),
    Form(Form),
    Record(UserRecord),
}

impl Object {
    pub fn class_id(&self) -> u8 {
        match self {
            Self::Text(t) => t.kind().class_id(),
            Self::Bytes(b) => b.kind().class_id(),
            Self::Collection(c) => c.kind().class_id(),
            Self::Dictionary(d) => d.kind().class_id(),
            Self::Color(c) => c.class_id(),
            Self::Point(_) => class_id::POINT,
            Self::Rectangle(_) => class_id::RECTANGLE,
            Self::Form(f) => f.class_id(),
            Self::Record(r) => r.class_id(),
        }
    }

    /// Human-readable class name.
    pub fn class_name(&self) -> &str {
        match self {
            Self::Record(r) => r.name(),
            other => class_id::name(other.class_id()).unwrap_or("Unknown"),
        }
    }

    /// Fields that are written in `dialect`, in wire order.
    pub fn fields(&self, dialect: Dialect) -> Vec<&Field> {
        match self {
            Self::Collection(c) => c.fields(),
            Self::Dictionary(d) => d.fields(),
            Self::Form(f) => f.fields(),
            Self::Record(r) => r.fields(dialect),
            Self::Text(_) | Self::Bytes(_) | Self::Color(_) | Self::Point(_) | Self::Rectangle(_) => {
                Vec::new()
            }
        }
    }

    /// Every field regardless of dialect.
    pub fn fields_mut(&mut self) -> Vec<&mut Field> {
        match self {
            Self::Collection(c) => c.fields_mut(),
            Self::Dictionary(d) => d.fields_mut(),
            Self::Form(f) => f.fields_mut(),
            Self::Record(r) => r.fields_mut(),
            Self::Text(_) | Self::Bytes(_) | Self::Color(_) | Self::Point(_) | Self::Rectangle(_) => {
                Vec::new()
            }
        }
    }

    /// Replace every pending back-reference with its table entry.
    pub fn resolve_references(&mut self, table: &ReferenceTable) -> ObjectResult<()> {
        for field in self.fields_mut() {
            field.resolve(table)?;
        }
        Ok(())
    }

    /// Body after the class id.
    pub(crate) fn write_payload(
        &self,
        encoder: &Encoder<'_>,
        out: &mut WireWriter,
    ) -> ObjectResult<()> {
        match self {
            Self::Text(t) => t.write_payload(out),
            Self::Bytes(b) => b.write_payload(out),
            Self::Collection(c) => c.write_payload(encoder, out),
            Self::Dictionary(d) => d.write_payload(encoder, out),
            Self::Color(c) => {
                c.write_payload(out);
                Ok(())
            }
            Self::Point(p) => p.write_payload(out),
            Self::Rectangle(r) => r.write_payload(out),
            Self::Form(f) => f.write_payload(encoder, out),
            Self::Record(r) => r.write_payload(encoder, out),
        }
    }

    /// Fill this template from the body that follows class id `id`.
    pub(crate) fn read_payload(
        &mut self,
        id: u8,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        decoder: &Decoder<'_>,
    ) -> ObjectResult<()> {
        let expected = self.class_id();
        if expected != id {
            return Err(ObjectError::ClassIdMismatch {
                expected: vec![expected],
                actual: id,
            });
        }
        match self {
            Self::Text(t) => t.read_payload(reader),
            Self::Bytes(b) => b.read_payload(reader),
            Self::Collection(c) => c.read_payload(reader, graph, decoder),
            Self::Dictionary(d) => d.read_payload(reader, graph, decoder),
            Self::Color(c) => c.read_payload(reader),
            Self::Point(p) => p.read_payload(reader, graph, decoder),
            Self::Rectangle(r) => r.read_payload(reader, graph, decoder),
            Self::Form(f) => f.read_payload(reader, graph, decoder),
            Self::Record(r) => r.read_payload(reader, graph, decoder),
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Self::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Self::Point(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match self {
            Self::Rectangle(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&Form> {
        match self {
            Self::Form(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&UserRecord> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut UserRecord> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Object {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_variant!(Text, Bytes, Collection, Dictionary, Color, Point, Rectangle, Form);

impl From<UserRecord> for Object {
    fn from(value: UserRecord) -> Self {
        Self::Record(value)
    }
}
