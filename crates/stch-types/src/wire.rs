//! Big-endian framing primitives.
//!
//! All multi-byte integers in the format are big-endian. Back-reference
//! positions are 24-bit, so [`WireWriter::write_u24`] rejects anything
//! above [`MAX_POSITION`].

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{TypeError, TypeResult};

/// Largest position a back-reference can address.
pub const MAX_POSITION: u32 = 0x00FF_FFFF;

/// Growable big-endian output buffer.
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    /// Write the low 24 bits of `value`.
    pub fn write_u24(&mut self, value: u32) -> TypeResult<()> {
        if value > MAX_POSITION {
            return Err(TypeError::ValueTooLarge {
                what: "24-bit value",
                value: value as u64,
                max: MAX_POSITION as u64,
            });
        }
        self.buf.put_uint(value as u64, 3);
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.put_f64(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a length as a `u32` prefix.
    pub fn write_len_u32(&mut self, len: usize) -> TypeResult<()> {
        let value = u32::try_from(len).map_err(|_| TypeError::ValueTooLarge {
            what: "length",
            value: len as u64,
            max: u32::MAX as u64,
        })?;
        self.write_u32(value);
        Ok(())
    }

    /// Write a length as a `u16` prefix.
    pub fn write_len_u16(&mut self, len: usize) -> TypeResult<()> {
        let value = u16::try_from(len).map_err(|_| TypeError::ValueTooLarge {
            what: "length",
            value: len as u64,
            max: u16::MAX as u64,
        })?;
        self.write_u16(value);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Cursor over a borrowed big-endian input buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    total: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buf: data,
            total: data.len(),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.total - self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.first().copied()
    }

    fn ensure(&self, needed: usize) -> TypeResult<()> {
        if self.buf.remaining() < needed {
            return Err(TypeError::Truncated {
                offset: self.position(),
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> TypeResult<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self) -> TypeResult<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_i16(&mut self) -> TypeResult<i16> {
        self.ensure(2)?;
        Ok(self.buf.get_i16())
    }

    pub fn read_u24(&mut self) -> TypeResult<u32> {
        self.ensure(3)?;
        Ok(self.buf.get_uint(3) as u32)
    }

    pub fn read_u32(&mut self) -> TypeResult<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_i32(&mut self) -> TypeResult<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_f64(&mut self) -> TypeResult<f64> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    /// Borrow the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> TypeResult<&'a [u8]> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Everything not yet consumed.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn integers_are_big_endian() {
        let mut w = WireWriter::new();
        w.write_u16(0x0102);
        w.write_u24(0x030405).unwrap();
        w.write_u32(0x06070809);
        w.write_i16(-2);
        assert_eq!(
            w.as_slice(),
            &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0xFF, 0xFE]
        );
    }

    #[test]
    fn u24_rejects_overflow() {
        let mut w = WireWriter::new();
        assert!(w.write_u24(MAX_POSITION).is_ok());
        assert!(matches!(
            w.write_u24(MAX_POSITION + 1),
            Err(TypeError::ValueTooLarge { .. })
        ));
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn reader_tracks_position() {
        let data = [0x00, 0x2A, 0x00, 0x00, 0x01, 0xFF];
        let mut r = WireReader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 42);
        assert_eq!(r.position(), 2);
        assert_eq!(r.read_u24().unwrap(), 1);
        assert_eq!(r.peek_u8(), Some(0xFF));
        assert_eq!(r.read_u8().unwrap(), 0xFF);
        assert!(r.is_empty());
    }

    #[test]
    fn truncated_read_reports_offset() {
        let data = [0x00, 0x01, 0x02];
        let mut r = WireReader::new(&data);
        r.read_u8().unwrap();
        let err = r.read_u32().unwrap_err();
        assert_eq!(
            err,
            TypeError::Truncated {
                offset: 1,
                needed: 4,
                available: 2
            }
        );
    }

    #[test]
    fn read_bytes_borrows_slice() {
        let data = b"ObjS\x01Stch\x01rest";
        let mut r = WireReader::new(data);
        assert_eq!(r.read_bytes(10).unwrap(), b"ObjS\x01Stch\x01");
        assert_eq!(r.rest(), b"rest");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn length_prefix_limits() {
        let mut w = WireWriter::new();
        assert!(w.write_len_u16(65_535).is_ok());
        assert!(w.write_len_u16(65_536).is_err());
    }

    proptest! {
        #[test]
        fn f64_round_trip(v in any::<f64>()) {
            let mut w = WireWriter::new();
            w.write_f64(v);
            let bytes = w.into_bytes();
            let mut r = WireReader::new(&bytes);
            prop_assert_eq!(r.read_f64().unwrap().to_bits(), v.to_bits());
        }

        #[test]
        fn i32_round_trip(v in any::<i32>()) {
            let mut w = WireWriter::new();
            w.write_i32(v);
            let bytes = w.into_bytes();
            let mut r = WireReader::new(&bytes);
            prop_assert_eq!(r.read_i32().unwrap(), v);
        }
    }
}
