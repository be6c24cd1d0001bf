//! Fixed-format reference types: text, raw byte buffers, colors,
//! points, rectangles and forms.

use std::borrow::Cow;

use stch_types::{class_id, WireReader, WireWriter};

use crate::codec::{Decoder, Encoder};
use crate::error::{ObjectError, ObjectResult};
use crate::field::Field;
use crate::graph::ObjectGraph;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextKind {
    /// ASCII string, class 9.
    String,
    /// ASCII symbol, class 10.
    Symbol,
    /// UTF-8 string, class 14.
    Utf8,
}

impl TextKind {
    pub fn class_id(self) -> u8 {
        match self {
            Self::String => class_id::STRING,
            Self::Symbol => class_id::SYMBOL,
            Self::Utf8 => class_id::UTF8,
        }
    }
}

/// A string body: `u32` byte length followed by the bytes.
///
/// Bytes are kept exactly as read so a decoded stream re-encodes
/// unchanged even when an ASCII-kind string carries non-ASCII bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    kind: TextKind,
    bytes: Vec<u8>,
}

impl Text {
    /// ASCII kinds replace characters outside ASCII with `?`.
    pub fn new(kind: TextKind, text: &str) -> Self {
        let bytes = match kind {
            TextKind::Utf8 => text.as_bytes().to_vec(),
            TextKind::String | TextKind::Symbol => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
        };
        Self { kind, bytes }
    }

    pub fn kind(&self) -> TextKind {
        self.kind
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub(crate) fn write_payload(&self, out: &mut WireWriter) -> ObjectResult<()> {
        out.write_len_u32(self.bytes.len())?;
        out.write_bytes(&self.bytes);
        Ok(())
    }

    pub(crate) fn read_payload(&mut self, reader: &mut WireReader<'_>) -> ObjectResult<()> {
        let len = reader.read_u32()? as usize;
        self.bytes = reader.read_bytes(len)?.to_vec();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Byte buffers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BytesKind {
    /// Length counts bytes, class 11.
    ByteArray,
    /// Length counts 16-bit samples, class 12.
    SoundBuffer,
    /// Length counts 32-bit words, class 13.
    Bitmap,
}

impl BytesKind {
    pub fn class_id(self) -> u8 {
        match self {
            Self::ByteArray => class_id::BYTE_ARRAY,
            Self::SoundBuffer => class_id::SOUND_BUFFER,
            Self::Bitmap => class_id::BITMAP,
        }
    }

    /// Bytes per counted unit.
    pub fn unit(self) -> usize {
        match self {
            Self::ByteArray => 1,
            Self::SoundBuffer => 2,
            Self::Bitmap => 4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::ByteArray => "ByteArray",
            Self::SoundBuffer => "SoundBuffer",
            Self::Bitmap => "Bitmap",
        }
    }
}

/// Raw byte buffer with a unit-counted `u32` length prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bytes {
    kind: BytesKind,
    data: Vec<u8>,
}

impl Bytes {
    /// Fails when `data` is not a whole number of units.
    pub fn new(kind: BytesKind, data: Vec<u8>) -> ObjectResult<Self> {
        if data.len() % kind.unit() != 0 {
            return Err(ObjectError::malformed(
                kind.name(),
                format!("length {} is not a multiple of {}", data.len(), kind.unit()),
            ));
        }
        Ok(Self { kind, data })
    }

    pub fn byte_array(data: Vec<u8>) -> Self {
        Self {
            kind: BytesKind::ByteArray,
            data,
        }
    }

    pub fn empty(kind: BytesKind) -> Self {
        Self {
            kind,
            data: Vec::new(),
        }
    }

    pub fn kind(&self) -> BytesKind {
        self.kind
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn write_payload(&self, out: &mut WireWriter) -> ObjectResult<()> {
        out.write_len_u32(self.data.len() / self.kind.unit())?;
        out.write_bytes(&self.data);
        Ok(())
    }

    pub(crate) fn read_payload(&mut self, reader: &mut WireReader<'_>) -> ObjectResult<()> {
        let count = reader.read_u32()? as usize;
        let len = count
            .checked_mul(self.kind.unit())
            .ok_or_else(|| ObjectError::malformed(self.kind.name(), "length overflows"))?;
        self.data = reader.read_bytes(len)?.to_vec();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

const TEN_BITS: u32 = (1 << 10) - 1;

/// A color with 10-bit channels, optionally with an 8-bit alpha.
///
/// Opaque colors are class 30; translucent ones are class 31 and append
/// the alpha byte after the packed channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    red: u16,
    green: u16,
    blue: u16,
    alpha: Option<u8>,
}

impl Color {
    /// Channels are masked to 10 bits.
    pub fn new(red: u16, green: u16, blue: u16) -> Self {
        Self {
            red: red & TEN_BITS as u16,
            green: green & TEN_BITS as u16,
            blue: blue & TEN_BITS as u16,
            alpha: None,
        }
    }

    pub fn translucent(red: u16, green: u16, blue: u16, alpha: u8) -> Self {
        Self {
            alpha: Some(alpha),
            ..Self::new(red, green, blue)
        }
    }

    /// Scale 8-bit channels up to 10 bits.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        let scale = |c: u8| (c as u32 * TEN_BITS / 255) as u16;
        Self::new(scale(red), scale(green), scale(blue))
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let scale = |c: u16| (c as u32 * 255 / TEN_BITS) as u8;
        (scale(self.red), scale(self.green), scale(self.blue))
    }

    pub fn red(self) -> u16 {
        self.red
    }

    pub fn green(self) -> u16 {
        self.green
    }

    pub fn blue(self) -> u16 {
        self.blue
    }

    pub fn alpha(self) -> Option<u8> {
        self.alpha
    }

    pub fn class_id(self) -> u8 {
        if self.alpha.is_some() {
            class_id::TRANSLUCENT_COLOR
        } else {
            class_id::COLOR
        }
    }

    fn packed(self) -> u32 {
        (self.red as u32) << 20 | (self.green as u32) << 10 | self.blue as u32
    }

    pub(crate) fn write_payload(&self, out: &mut WireWriter) {
        out.write_u32(self.packed());
        if let Some(alpha) = self.alpha {
            out.write_u8(alpha);
        }
    }

    pub(crate) fn read_payload(&mut self, reader: &mut WireReader<'_>) -> ObjectResult<()> {
        let packed = reader.read_u32()?;
        self.red = ((packed >> 20) & TEN_BITS) as u16;
        self.green = ((packed >> 10) & TEN_BITS) as u16;
        self.blue = (packed & TEN_BITS) as u16;
        if self.alpha.is_some() {
            self.alpha = Some(reader.read_u8()?);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Points and rectangles
// ---------------------------------------------------------------------------

fn require_number(value: &Value, class: &'static str) -> ObjectResult<()> {
    if value.is_number() {
        Ok(())
    } else {
        Err(ObjectError::malformed(class, "coordinates must be numbers"))
    }
}

/// Two inline numbers, class 32.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    x: Value,
    y: Value,
}

impl Point {
    pub fn new(x: Value, y: Value) -> ObjectResult<Self> {
        require_number(&x, "Point")?;
        require_number(&y, "Point")?;
        Ok(Self { x, y })
    }

    pub fn from_i64(x: i64, y: i64) -> Self {
        Self {
            x: Value::from_i64(x),
            y: Value::from_i64(y),
        }
    }

    pub fn x(&self) -> &Value {
        &self.x
    }

    pub fn y(&self) -> &Value {
        &self.y
    }

    pub(crate) fn write_payload(&self, out: &mut WireWriter) -> ObjectResult<()> {
        self.x.write_inline(out)?;
        self.y.write_inline(out)
    }

    pub(crate) fn read_payload(
        &mut self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        decoder: &Decoder<'_>,
    ) -> ObjectResult<()> {
        self.x = decoder.read_number(reader, graph, "Point")?;
        self.y = decoder.read_number(reader, graph, "Point")?;
        Ok(())
    }
}

/// Four inline numbers, class 33.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rectangle {
    x: Value,
    y: Value,
    width: Value,
    height: Value,
}

impl Rectangle {
    pub fn new(x: Value, y: Value, width: Value, height: Value) -> ObjectResult<Self> {
        for v in [&x, &y, &width, &height] {
            require_number(v, "Rectangle")?;
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn from_i64(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x: Value::from_i64(x),
            y: Value::from_i64(y),
            width: Value::from_i64(width),
            height: Value::from_i64(height),
        }
    }

    pub fn x(&self) -> &Value {
        &self.x
    }

    pub fn y(&self) -> &Value {
        &self.y
    }

    pub fn width(&self) -> &Value {
        &self.width
    }

    pub fn height(&self) -> &Value {
        &self.height
    }

    pub(crate) fn write_payload(&self, out: &mut WireWriter) -> ObjectResult<()> {
        for v in [&self.x, &self.y, &self.width, &self.height] {
            v.write_inline(out)?;
        }
        Ok(())
    }

    pub(crate) fn read_payload(
        &mut self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        decoder: &Decoder<'_>,
    ) -> ObjectResult<()> {
        self.x = decoder.read_number(reader, graph, "Rectangle")?;
        self.y = decoder.read_number(reader, graph, "Rectangle")?;
        self.width = decoder.read_number(reader, graph, "Rectangle")?;
        self.height = decoder.read_number(reader, graph, "Rectangle")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// A bitmap image, class 34, or with a color map, class 35.
///
/// Dimensions are written as inline 16-bit integers; the offset, bits
/// and color map are ordinary fields and may be back-references.
#[derive(Clone, Debug, PartialEq)]
pub struct Form {
    width: i16,
    height: i16,
    depth: i16,
    offset: Field,
    bits: Field,
    color_map: Option<Field>,
}

impl Form {
    pub fn new(width: i16, height: i16, depth: i16, bits: Value) -> Self {
        Self {
            width,
            height,
            depth,
            offset: Field::new(Value::Nil),
            bits: Field::new(bits),
            color_map: None,
        }
    }

    pub fn with_color_map(mut self, color_map: Value) -> Self {
        self.color_map = Some(Field::new(color_map));
        self
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn depth(&self) -> i16 {
        self.depth
    }

    pub fn offset(&self) -> &Field {
        &self.offset
    }

    pub fn bits(&self) -> &Field {
        &self.bits
    }

    pub fn color_map(&self) -> Option<&Field> {
        self.color_map.as_ref()
    }

    pub fn set_bits(&mut self, bits: Value) {
        self.bits = Field::new(bits);
    }

    pub fn class_id(&self) -> u8 {
        if self.color_map.is_some() {
            class_id::COLOR_FORM
        } else {
            class_id::FORM
        }
    }

    pub(crate) fn fields(&self) -> Vec<&Field> {
        let mut fields = vec![&self.offset, &self.bits];
        fields.extend(self.color_map.as_ref());
        fields
    }

    pub(crate) fn fields_mut(&mut self) -> Vec<&mut Field> {
        let mut fields = vec![&mut self.offset, &mut self.bits];
        fields.extend(self.color_map.as_mut());
        fields
    }

    pub(crate) fn write_payload(
        &self,
        encoder: &Encoder<'_>,
        out: &mut WireWriter,
    ) -> ObjectResult<()> {
        for dim in [self.width, self.height, self.depth] {
            Value::SmallInt16(dim).write_inline(out)?;
        }
        encoder.write_field(&self.offset, out)?;
        encoder.write_field(&self.bits, out)?;
        if let Some(color_map) = &self.color_map {
            encoder.write_field(color_map, out)?;
        }
        Ok(())
    }

    pub(crate) fn read_payload(
        &mut self,
        reader: &mut WireReader<'_>,
        graph: &mut ObjectGraph,
        decoder: &Decoder<'_>,
    ) -> ObjectResult<()> {
        self.width = read_dimension(reader, graph, decoder)?;
        self.height = read_dimension(reader, graph, decoder)?;
        self.depth = read_dimension(reader, graph, decoder)?;
        self.offset = decoder.read_field(reader, graph)?;
        self.bits = decoder.read_field(reader, graph)?;
        if self.color_map.is_some() {
            self.color_map = Some(decoder.read_field(reader, graph)?);
        }
        Ok(())
    }
}

fn read_dimension(
    reader: &mut WireReader<'_>,
    graph: &mut ObjectGraph,
    decoder: &Decoder<'_>,
) -> ObjectResult<i16> {
    decoder
        .read_number(reader, graph, "Form")?
        .as_i64()
        .and_then(|v| i16::try_from(v).ok())
        .ok_or_else(|| ObjectError::malformed("Form", "dimension out of 16-bit range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_kinds_replace_non_ascii() {
        let text = Text::new(TextKind::String, "caf\u{e9}");
        assert_eq!(text.as_bytes(), b"caf?");
        let utf8 = Text::new(TextKind::Utf8, "caf\u{e9}");
        assert_eq!(utf8.as_bytes(), "caf\u{e9}".as_bytes());
        assert_eq!(utf8.as_str(), "caf\u{e9}");
    }

    #[test]
    fn text_payload_is_length_prefixed() {
        let mut w = WireWriter::new();
        Text::new(TextKind::Symbol, "abc").write_payload(&mut w).unwrap();
        assert_eq!(w.as_slice(), &[0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn sound_buffer_counts_samples() {
        let sound = Bytes::new(BytesKind::SoundBuffer, vec![1, 2, 3, 4]).unwrap();
        let mut w = WireWriter::new();
        sound.write_payload(&mut w).unwrap();
        assert_eq!(w.as_slice(), &[0, 0, 0, 2, 1, 2, 3, 4]);

        let mut read = Bytes::empty(BytesKind::SoundBuffer);
        read.read_payload(&mut WireReader::new(w.as_slice())).unwrap();
        assert_eq!(read, sound);
    }

    #[test]
    fn bitmap_counts_words() {
        let bitmap = Bytes::new(BytesKind::Bitmap, vec![0; 8]).unwrap();
        let mut w = WireWriter::new();
        bitmap.write_payload(&mut w).unwrap();
        assert_eq!(&w.as_slice()[..4], &[0, 0, 0, 2]);
    }

    #[test]
    fn uneven_buffers_are_rejected() {
        assert!(Bytes::new(BytesKind::SoundBuffer, vec![1, 2, 3]).is_err());
        assert!(Bytes::new(BytesKind::Bitmap, vec![1, 2]).is_err());
        assert!(Bytes::new(BytesKind::ByteArray, vec![1, 2, 3]).is_ok());
    }

    #[test]
    fn color_packs_ten_bit_channels() {
        let mut w = WireWriter::new();
        Color::new(1023, 0, 1).write_payload(&mut w);
        assert_eq!(w.as_slice(), &[0x3F, 0xF0, 0x00, 0x01]);

        let mut read = Color::new(0, 0, 0);
        read.read_payload(&mut WireReader::new(w.as_slice())).unwrap();
        assert_eq!(read, Color::new(1023, 0, 1));
    }

    #[test]
    fn translucent_color_appends_alpha() {
        let color = Color::translucent(1, 2, 3, 128);
        assert_eq!(color.class_id(), class_id::TRANSLUCENT_COLOR);
        let mut w = WireWriter::new();
        color.write_payload(&mut w);
        assert_eq!(w.len(), 5);
        assert_eq!(w.as_slice()[4], 128);
    }

    #[test]
    fn rgb8_scaling() {
        let color = Color::from_rgb8(255, 0, 255);
        assert_eq!((color.red(), color.green(), color.blue()), (1023, 0, 1023));
        assert_eq!(color.to_rgb8(), (255, 0, 255));
    }

    #[test]
    fn point_requires_numbers() {
        assert!(Point::new(Value::SmallInt16(1), Value::Float(2.5)).is_ok());
        assert!(Point::new(Value::Nil, Value::SmallInt16(1)).is_err());
    }

    #[test]
    fn form_class_depends_on_color_map() {
        let form = Form::new(1, 1, 32, Value::Nil);
        assert_eq!(form.class_id(), class_id::FORM);
        assert_eq!(form.fields().len(), 2);
        let color_form = form.with_color_map(Value::Nil);
        assert_eq!(color_form.class_id(), class_id::COLOR_FORM);
        assert_eq!(color_form.fields().len(), 3);
    }
}
