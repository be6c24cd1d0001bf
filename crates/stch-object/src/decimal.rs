use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// Exact decimal number: `unscaled * 10^-scale`.
///
/// Produced by [`Value::to_decimal`](crate::Value::to_decimal). Trailing
/// zeros are stripped so equal numbers compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    unscaled: BigInt,
    scale: u32,
}

impl Decimal {
    pub fn new(unscaled: BigInt, scale: u32) -> Self {
        let mut d = Self { unscaled, scale };
        d.normalize();
        d
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Exact expansion of a finite float. NaN and infinities yield `None`.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let raw_exponent = ((bits >> 52) & 0x7FF) as i32;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, exponent) = if raw_exponent == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), raw_exponent - 1075)
        };

        let mut unscaled = BigInt::from(mantissa);
        let scale = if exponent >= 0 {
            unscaled <<= exponent as usize;
            0
        } else {
            // m * 2^-k == m * 5^k / 10^k
            let k = exponent.unsigned_abs();
            unscaled *= num_traits::pow(BigInt::from(5u8), k as usize);
            k
        };
        if negative {
            unscaled = -unscaled;
        }
        Some(Self::new(unscaled, scale))
    }

    fn normalize(&mut self) {
        if self.unscaled.is_zero() {
            self.scale = 0;
            return;
        }
        let ten = BigInt::from(10u8);
        while self.scale > 0 && (&self.unscaled % &ten).is_zero() {
            self.unscaled /= &ten;
            self.scale -= 1;
        }
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Self {
            unscaled: value,
            scale: 0,
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.abs().to_string();
        let sign = if self.unscaled.is_negative() { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int}.{frac}")
        } else {
            write!(f, "{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_fractions() {
        assert_eq!(Decimal::from_f64(0.5).unwrap().to_string(), "0.5");
        assert_eq!(Decimal::from_f64(-0.25).unwrap().to_string(), "-0.25");
        assert_eq!(Decimal::from_f64(100.0).unwrap().to_string(), "100");
        assert_eq!(Decimal::from_f64(0.0).unwrap().to_string(), "0");
    }

    #[test]
    fn expansion_is_exact() {
        let d = Decimal::from_f64(0.1).unwrap();
        assert_eq!(
            d.to_string(),
            "0.1000000000000000055511151231257827021181583404541015625"
        );
        assert_eq!(d.scale(), 55);
    }

    #[test]
    fn non_finite_has_no_decimal() {
        assert!(Decimal::from_f64(f64::NAN).is_none());
        assert!(Decimal::from_f64(f64::NEG_INFINITY).is_none());
    }

    #[test]
    fn integers_have_zero_scale() {
        let d = Decimal::from(BigInt::from(-42));
        assert_eq!(d.scale(), 0);
        assert_eq!(d.to_string(), "-42");
    }

    #[test]
    fn small_magnitudes_pad_with_zeros() {
        let d = Decimal::new(BigInt::from(5), 3);
        assert_eq!(d.to_string(), "0.005");
    }
}
