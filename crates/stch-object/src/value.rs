//! Inline values and the numeric contract.
//!
//! Nil, booleans and numbers are written inline wherever they appear and
//! are never shared. Everything else lives in an [`ObjectGraph`] and is
//! carried around as [`Value::Node`], whose identity is the node handle.
//!
//! [`ObjectGraph`]: crate::graph::ObjectGraph

use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use stch_types::{class_id, WireReader, WireWriter};

use crate::decimal::Decimal;
use crate::error::{ObjectError, ObjectResult};
use crate::graph::NodeId;

/// A field value: either an inline primitive or a handle to a graph node.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    True,
    False,
    /// 32-bit integer, class 4.
    SmallInt(i32),
    /// 16-bit integer, class 5.
    SmallInt16(i16),
    /// Non-negative arbitrary-precision integer, class 6.
    LargePositive(BigUint),
    /// Non-positive arbitrary-precision integer, class 7. Holds the magnitude.
    LargeNegative(BigUint),
    /// 64-bit float, class 8.
    Float(f64),
    /// A reference-type object stored in the graph.
    Node(NodeId),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) | (Self::True, Self::True) | (Self::False, Self::False) => true,
            (Self::SmallInt(a), Self::SmallInt(b)) => a == b,
            (Self::SmallInt16(a), Self::SmallInt16(b)) => a == b,
            (Self::LargePositive(a), Self::LargePositive(b)) => a == b,
            (Self::LargeNegative(a), Self::LargeNegative(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Node(a), Self::Node(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }

    /// Smallest integer variant that holds `value`.
    pub fn from_i64(value: i64) -> Self {
        if let Ok(v) = i16::try_from(value) {
            Self::SmallInt16(v)
        } else if let Ok(v) = i32::try_from(value) {
            Self::SmallInt(v)
        } else {
            Self::from_bigint(BigInt::from(value))
        }
    }

    /// Smallest integer variant that holds `value`.
    pub fn from_bigint(value: BigInt) -> Self {
        if let Some(v) = value.to_i64() {
            if i32::try_from(v).is_ok() {
                return Self::from_i64(v);
            }
        }
        let (sign, magnitude) = value.into_parts();
        match sign {
            Sign::Minus => Self::LargeNegative(magnitude),
            Sign::NoSign | Sign::Plus => Self::LargePositive(magnitude),
        }
    }

    /// Integral finite floats collapse to the smallest integer variant.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 {
            if let Some(big) = BigInt::from_f64(value) {
                return Self::from_bigint(big);
            }
        }
        Self::Float(value)
    }

    /// Class id of an inline value; `None` for graph nodes.
    pub fn class_id(&self) -> Option<u8> {
        let id = match self {
            Self::Nil => class_id::NIL,
            Self::True => class_id::TRUE,
            Self::False => class_id::FALSE,
            Self::SmallInt(_) => class_id::SMALL_INTEGER,
            Self::SmallInt16(_) => class_id::SMALL_INTEGER_16,
            Self::LargePositive(_) => class_id::LARGE_POSITIVE_INTEGER,
            Self::LargeNegative(_) => class_id::LARGE_NEGATIVE_INTEGER,
            Self::Float(_) => class_id::FLOAT,
            Self::Node(_) => return None,
        };
        Some(id)
    }

    /// Reference-type values get a reference-table position and may be shared.
    pub fn is_reference_type(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Numeric contract
    // -----------------------------------------------------------------------

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Self::SmallInt(_)
                | Self::SmallInt16(_)
                | Self::LargePositive(_)
                | Self::LargeNegative(_)
                | Self::Float(_)
        )
    }

    /// Nearest float. Large integers beyond `f64` range become infinite.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::SmallInt(v) => Some(*v as f64),
            Self::SmallInt16(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::LargePositive(_) | Self::LargeNegative(_) => {
                self.to_bigint().and_then(|b| b.to_f64())
            }
            _ => None,
        }
    }

    /// Machine integer. Floats truncate toward zero; values outside the
    /// `i64` range yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::SmallInt(v) => Some(*v as i64),
            Self::SmallInt16(v) => Some(*v as i64),
            Self::Float(v) => v.trunc().to_i64(),
            Self::LargePositive(_) | Self::LargeNegative(_) => {
                self.to_bigint().and_then(|b| b.to_i64())
            }
            _ => None,
        }
    }

    /// Exact integer. Floats truncate toward zero; NaN and infinities yield `None`.
    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Self::SmallInt(v) => Some(BigInt::from(*v)),
            Self::SmallInt16(v) => Some(BigInt::from(*v)),
            Self::LargePositive(m) => Some(BigInt::from_biguint(Sign::Plus, m.clone())),
            Self::LargeNegative(m) => Some(BigInt::from_biguint(Sign::Minus, m.clone())),
            Self::Float(v) => BigInt::from_f64(v.trunc()),
            _ => None,
        }
    }

    /// Exact decimal. Floats convert without rounding.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Float(v) => Decimal::from_f64(*v),
            other => other.to_bigint().map(Decimal::from),
        }
    }

    // -----------------------------------------------------------------------
    // Wire format
    // -----------------------------------------------------------------------

    /// Write class id and body of an inline value.
    pub fn write_inline(&self, out: &mut WireWriter) -> ObjectResult<()> {
        let id = self.class_id().ok_or(ObjectError::WrongKind("inline value"))?;
        out.write_u8(id);
        match self {
            Self::SmallInt(v) => out.write_i32(*v),
            Self::SmallInt16(v) => out.write_i16(*v),
            Self::LargePositive(m) | Self::LargeNegative(m) => {
                let bytes = BigInt::from_biguint(Sign::Plus, m.clone()).to_signed_bytes_be();
                out.write_len_u16(bytes.len())?;
                out.write_bytes(&bytes);
            }
            Self::Float(v) => out.write_f64(*v),
            Self::Nil | Self::True | Self::False | Self::Node(_) => {}
        }
        Ok(())
    }

    /// Read the body of an inline value whose class id has already been
    /// consumed. `self` is the registry template for that id.
    pub fn read_inline(&self, id: u8, reader: &mut WireReader<'_>) -> ObjectResult<Value> {
        let expected = self.class_id().ok_or(ObjectError::WrongKind("inline value"))?;
        if expected != id {
            return Err(ObjectError::ClassIdMismatch {
                expected: vec![expected],
                actual: id,
            });
        }
        let value = match id {
            class_id::NIL => Self::Nil,
            class_id::TRUE => Self::True,
            class_id::FALSE => Self::False,
            class_id::SMALL_INTEGER => Self::SmallInt(reader.read_i32()?),
            class_id::SMALL_INTEGER_16 => Self::SmallInt16(reader.read_i16()?),
            class_id::LARGE_POSITIVE_INTEGER => Self::LargePositive(read_magnitude(reader)?),
            class_id::LARGE_NEGATIVE_INTEGER => Self::LargeNegative(read_magnitude(reader)?),
            class_id::FLOAT => Self::Float(reader.read_f64()?),
            other => {
                return Err(ObjectError::ClassIdMismatch {
                    expected: vec![expected],
                    actual: other,
                })
            }
        };
        Ok(value)
    }
}

fn read_magnitude(reader: &mut WireReader<'_>) -> ObjectResult<BigUint> {
    let len = reader.read_u16()? as usize;
    if len == 0 {
        return Err(ObjectError::malformed("LargeInteger", "empty magnitude"));
    }
    let bytes = reader.read_bytes(len)?;
    BigInt::from_signed_bytes_be(bytes)
        .to_biguint()
        .ok_or_else(|| ObjectError::malformed("LargeInteger", "magnitude has its sign bit set"))
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::from_i64(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::SmallInt(v) => write!(f, "{v}"),
            Self::SmallInt16(v) => write!(f, "{v}"),
            Self::LargePositive(m) => write!(f, "{m}"),
            Self::LargeNegative(m) if m.is_zero() => f.write_str("0"),
            Self::LargeNegative(m) => write!(f, "-{m}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Node(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode(value: &Value) -> Vec<u8> {
        let mut w = WireWriter::new();
        value.write_inline(&mut w).unwrap();
        w.into_bytes()
    }

    fn decode(bytes: &[u8]) -> Value {
        let mut r = WireReader::new(bytes);
        let id = r.read_u8().unwrap();
        let template = match id {
            class_id::NIL => Value::Nil,
            class_id::TRUE => Value::True,
            class_id::FALSE => Value::False,
            class_id::SMALL_INTEGER => Value::SmallInt(0),
            class_id::SMALL_INTEGER_16 => Value::SmallInt16(0),
            class_id::LARGE_POSITIVE_INTEGER => Value::LargePositive(BigUint::zero()),
            class_id::LARGE_NEGATIVE_INTEGER => Value::LargeNegative(BigUint::zero()),
            _ => Value::Float(0.0),
        };
        let value = template.read_inline(id, &mut r).unwrap();
        assert!(r.is_empty());
        value
    }

    #[test]
    fn from_i64_picks_smallest_variant() {
        assert_eq!(Value::from_i64(7), Value::SmallInt16(7));
        assert_eq!(Value::from_i64(-32_768), Value::SmallInt16(-32_768));
        assert_eq!(Value::from_i64(32_768), Value::SmallInt(32_768));
        assert_eq!(Value::from_i64(i32::MIN as i64), Value::SmallInt(i32::MIN));
        assert!(matches!(
            Value::from_i64(i32::MAX as i64 + 1),
            Value::LargePositive(_)
        ));
        assert!(matches!(
            Value::from_i64(i32::MIN as i64 - 1),
            Value::LargeNegative(_)
        ));
    }

    #[test]
    fn from_f64_collapses_integral_values() {
        assert_eq!(Value::from_f64(3.0), Value::SmallInt16(3));
        assert_eq!(Value::from_f64(1e10), Value::from_i64(10_000_000_000));
        assert_eq!(Value::from_f64(0.5), Value::Float(0.5));
        assert!(matches!(Value::from_f64(f64::NAN), Value::Float(_)));
        assert_eq!(Value::from_f64(f64::INFINITY), Value::Float(f64::INFINITY));
    }

    #[test]
    fn large_positive_body_uses_minimal_twos_complement() {
        let value = Value::LargePositive(BigUint::from(1337u32));
        assert_eq!(encode(&value), vec![6, 0x00, 0x02, 0x05, 0x39]);
        assert_eq!(decode(&[6, 0x00, 0x02, 0x05, 0x39]), value);
    }

    #[test]
    fn large_positive_with_high_bit_gets_leading_zero() {
        let value = Value::LargePositive(BigUint::from(255u32));
        assert_eq!(encode(&value), vec![6, 0x00, 0x02, 0x00, 0xFF]);
    }

    #[test]
    fn large_negative_writes_magnitude() {
        let value = Value::from_i64(-5_000_000_000);
        let bytes = encode(&value);
        assert_eq!(bytes[0], class_id::LARGE_NEGATIVE_INTEGER);
        assert_eq!(decode(&bytes), value);
        assert_eq!(value.as_i64(), Some(-5_000_000_000));
    }

    #[test]
    fn inline_primitives_encode() {
        assert_eq!(encode(&Value::Nil), vec![1]);
        assert_eq!(encode(&Value::True), vec![2]);
        assert_eq!(encode(&Value::False), vec![3]);
        assert_eq!(encode(&Value::SmallInt(1)), vec![4, 0, 0, 0, 1]);
        assert_eq!(encode(&Value::SmallInt16(-1)), vec![5, 0xFF, 0xFF]);
        assert_eq!(
            encode(&Value::Float(1.0)),
            vec![8, 0x3F, 0xF0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn template_mismatch_is_rejected() {
        let mut r = WireReader::new(&[0, 0, 0, 1]);
        let err = Value::SmallInt16(0).read_inline(class_id::SMALL_INTEGER, &mut r);
        assert!(matches!(err, Err(ObjectError::ClassIdMismatch { .. })));
    }

    #[test]
    fn sign_bit_in_magnitude_is_malformed() {
        let mut r = WireReader::new(&[0x00, 0x01, 0x80]);
        let err = Value::LargePositive(BigUint::zero())
            .read_inline(class_id::LARGE_POSITIVE_INTEGER, &mut r);
        assert!(matches!(err, Err(ObjectError::MalformedBody { .. })));
    }

    #[test]
    fn node_cannot_be_written_inline() {
        let mut w = WireWriter::new();
        assert!(Value::Node(NodeId::new(0)).write_inline(&mut w).is_err());
    }

    #[test]
    fn numeric_contract() {
        let v = Value::Float(2.75);
        assert_eq!(v.as_f64(), Some(2.75));
        assert_eq!(v.as_i64(), Some(2));
        assert_eq!(v.to_bigint(), Some(BigInt::from(2)));
        assert_eq!(v.to_decimal().unwrap().to_string(), "2.75");
        assert_eq!(Value::Nil.as_f64(), None);
        assert!(!Value::True.is_number());
    }

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    proptest! {
        #[test]
        fn integers_keep_their_value(v in any::<i64>()) {
            let value = Value::from_i64(v);
            prop_assert_eq!(value.as_i64(), Some(v));
            prop_assert_eq!(decode(&encode(&value)), value);
        }
    }
}
