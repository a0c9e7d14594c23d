//! 16-bit half-precision floating point.
//!
//! Layout (IEEE 754 binary16):
//!
//! ```text
//!  15  14    10  9          0
//! +---+--------+------------+
//! | s |  e (5) |   m (10)   |   bias 15
//! +---+--------+------------+
//! ```
//!
//! - `e` in 1..=30: normalized, `(-1)^s * 2^(e-15) * 1.m`
//! - `e == 0`, `m != 0`: denormalized, `(-1)^s * 2^-14 * 0.m`
//! - `e == 0`, `m == 0`: signed zero
//! - `e == 31`: infinity (`m == 0`) or NaN (`m != 0`)
//!
//! Binary decoders use [`Half`] for compact vectors and colors. Converting
//! to `f32` is a table lookup (the table is built on first use); converting
//! from `f32` rounds to nearest, ties to even.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::sync::OnceLock;

/// A half-precision float stored as its raw bit pattern.
///
/// Equality is bitwise: `+0` and `-0` differ, and a NaN equals itself only
/// if the payload matches.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Half(u16);

/// Smallest positive half (a denormal), `2^-24`.
pub const MIN_POSITIVE_SUBNORMAL: f32 = 5.960_464_5e-8;
/// Smallest positive normalized half, `2^-14`.
pub const MIN_POSITIVE: f32 = 6.103_515_6e-5;
/// Largest finite half.
pub const MAX: f32 = 65504.0;
/// Smallest `e` for which `Half(1.0 + e) != Half(1.0)` when `e` is itself a
/// multiple of the half spacing at 1.0, `2^-10`.
pub const EPSILON: f32 = 0.000_976_562_5;

const SIGN_MASK: u16 = 0x8000;
const EXPONENT_MASK: u16 = 0x7c00;
const MANTISSA_MASK: u16 = 0x03ff;

impl Half {
    /// Positive infinity.
    pub const POS_INFINITY: Half = Half(0x7c00);
    /// Negative infinity.
    pub const NEG_INFINITY: Half = Half(0xfc00);
    /// Canonical quiet NaN.
    pub const QNAN: Half = Half(0x7fff);
    /// Canonical signaling NaN.
    pub const SNAN: Half = Half(0x7dff);
    /// Positive zero.
    pub const ZERO: Half = Half(0);
    /// One.
    pub const ONE: Half = Half(0x3c00);

    /// Build from a raw bit pattern.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// The raw bit pattern.
    #[inline]
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Convert from `f32`, rounding to nearest even.
    ///
    /// Magnitudes too small for the smallest denormal become signed zero,
    /// magnitudes too large become signed infinity, NaN stays NaN.
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self(f32_bits_to_half(value.to_bits()))
    }

    /// Convert to `f32`. Exact for every bit pattern.
    #[inline]
    pub fn to_f32(self) -> f32 {
        f32::from_bits(conversion_table()[self.0 as usize])
    }

    /// Round the mantissa to `keep_bits` significant bits.
    ///
    /// Rounds to nearest with halfway cases away from zero. If rounding would
    /// overflow into infinity, the mantissa is truncated instead. Values with
    /// `keep_bits >= 10`, infinities and NaNs are returned unchanged.
    pub fn round(self, keep_bits: u32) -> Self {
        if keep_bits >= 10 || !self.is_finite() {
            return self;
        }

        let sign = self.0 & SIGN_MASK;
        let mut magnitude = self.0 & !SIGN_MASK;

        // The exponent absorbs a carry out of the mantissa.
        magnitude >>= 9 - keep_bits;
        magnitude += magnitude & 1;
        magnitude <<= 9 - keep_bits;

        if magnitude >= EXPONENT_MASK {
            magnitude = self.0 & !SIGN_MASK;
            magnitude >>= 10 - keep_bits;
            magnitude <<= 10 - keep_bits;
        }

        Self(sign | magnitude)
    }

    #[inline]
    const fn exponent(self) -> u16 {
        (self.0 & EXPONENT_MASK) >> 10
    }

    #[inline]
    const fn mantissa(self) -> u16 {
        self.0 & MANTISSA_MASK
    }

    /// Neither infinite nor NaN.
    #[inline]
    pub const fn is_finite(self) -> bool {
        self.exponent() < 31
    }

    /// A normalized number (exponent in 1..=30).
    #[inline]
    pub const fn is_normalized(self) -> bool {
        let e = self.exponent();
        e > 0 && e < 31
    }

    /// A denormalized number (zero exponent, non-zero mantissa).
    #[inline]
    pub const fn is_denormalized(self) -> bool {
        self.exponent() == 0 && self.mantissa() != 0
    }

    /// Positive or negative zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 & !SIGN_MASK == 0
    }

    /// Any NaN, quiet or signaling.
    #[inline]
    pub const fn is_nan(self) -> bool {
        self.exponent() == 31 && self.mantissa() != 0
    }

    /// Positive or negative infinity.
    #[inline]
    pub const fn is_infinity(self) -> bool {
        self.exponent() == 31 && self.mantissa() == 0
    }

    /// Sign bit set. True for `-0` and negative NaNs as well.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 & SIGN_MASK != 0
    }
}

fn f32_bits_to_half(bits: u32) -> u16 {
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exponent = ((bits >> 23) & 0xff) as i32 - (127 - 15);
    let mut mantissa = bits & 0x007f_ffff;

    if exponent <= 0 {
        // Below half of the smallest denormal: signed zero.
        if exponent < -10 {
            return sign;
        }

        // Denormal: make the hidden bit explicit, shift into place, round
        // to nearest even.
        mantissa |= 0x0080_0000;
        let shift = (14 - exponent) as u32;
        let half_ulp = (1u32 << (shift - 1)) - 1;
        let odd = (mantissa >> shift) & 1;
        return sign | ((mantissa + half_ulp + odd) >> shift) as u16;
    }

    if exponent == 0xff - (127 - 15) {
        if mantissa == 0 {
            return sign | EXPONENT_MASK;
        }
        // Keep the top payload bits, never collapse NaN into infinity.
        let payload = (mantissa >> 13) as u16;
        return sign | EXPONENT_MASK | payload | u16::from(payload == 0);
    }

    let mut exponent = exponent;
    mantissa = mantissa + 0x0000_0fff + ((mantissa >> 13) & 1);
    if mantissa & 0x0080_0000 != 0 {
        mantissa = 0;
        exponent += 1;
    }

    if exponent > 30 {
        return sign | EXPONENT_MASK;
    }

    sign | ((exponent as u16) << 10) | (mantissa >> 13) as u16
}

/// Direct bit-level widening to `f32`. The lookup table is built from this.
fn half_bits_to_f32(bits: u16) -> u32 {
    let sign = u32::from(bits >> 15) << 31;
    let mut exponent = i32::from((bits >> 10) & 0x1f);
    let mut mantissa = u32::from(bits & MANTISSA_MASK);

    if exponent == 0 {
        if mantissa == 0 {
            return sign;
        }
        // Renormalize the denormal.
        while mantissa & 0x400 == 0 {
            mantissa <<= 1;
            exponent -= 1;
        }
        exponent += 1;
        mantissa &= !0x400;
    } else if exponent == 31 {
        return sign | 0x7f80_0000 | (mantissa << 13);
    }

    let exponent = (exponent + (127 - 15)) as u32;
    sign | (exponent << 23) | (mantissa << 13)
}

fn conversion_table() -> &'static [u32] {
    static TABLE: OnceLock<Box<[u32]>> = OnceLock::new();
    TABLE.get_or_init(|| (0..=u16::MAX).map(half_bits_to_f32).collect())
}

impl From<f32> for Half {
    #[inline]
    fn from(value: f32) -> Self {
        Half::from_f32(value)
    }
}

impl From<Half> for f32 {
    #[inline]
    fn from(value: Half) -> Self {
        value.to_f32()
    }
}

impl fmt::Debug for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Half({:?}, {:#06x})", self.to_f32(), self.0)
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f32(), f)
    }
}

impl Neg for Half {
    type Output = Half;

    #[inline]
    fn neg(self) -> Half {
        Half(self.0 ^ SIGN_MASK)
    }
}

macro_rules! impl_arith {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for Half {
            type Output = Half;

            #[inline]
            fn $method(self, rhs: Half) -> Half {
                Half::from_f32(self.to_f32() $op rhs.to_f32())
            }
        }

        impl $trait<f32> for Half {
            type Output = Half;

            #[inline]
            fn $method(self, rhs: f32) -> Half {
                Half::from_f32(self.to_f32() $op rhs)
            }
        }

        impl $assign_trait for Half {
            #[inline]
            fn $assign_method(&mut self, rhs: Half) {
                *self = *self $op rhs;
            }
        }

        impl $assign_trait<f32> for Half {
            #[inline]
            fn $assign_method(&mut self, rhs: f32) {
                *self = *self $op rhs;
            }
        }
    };
}

impl_arith!(Add, add, AddAssign, add_assign, +);
impl_arith!(Sub, sub, SubAssign, sub_assign, -);
impl_arith!(Mul, mul, MulAssign, mul_assign, *);
impl_arith!(Div, div, DivAssign, div_assign, /);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_every_pattern() {
        for bits in 0..=u16::MAX {
            let h = Half::from_bits(bits);
            assert_eq!(Half::from_f32(h.to_f32()).to_bits(), bits, "pattern {bits:#06x}");
        }
    }

    #[test]
    fn test_table_matches_direct_conversion() {
        for bits in 0..=u16::MAX {
            assert_eq!(
                Half::from_bits(bits).to_f32().to_bits(),
                half_bits_to_f32(bits),
                "pattern {bits:#06x}"
            );
        }
    }

    #[test]
    fn test_classification_is_total_and_exclusive() {
        for bits in 0..=u16::MAX {
            let h = Half::from_bits(bits);
            let classes = [
                h.is_zero(),
                h.is_nan(),
                h.is_infinity(),
                h.is_denormalized(),
                h.is_normalized(),
            ];
            assert_eq!(
                classes.iter().filter(|&&c| c).count(),
                1,
                "pattern {bits:#06x}"
            );
            assert_eq!(h.is_finite(), !(h.is_nan() || h.is_infinity()));
            assert_eq!(h.is_negative(), bits & 0x8000 != 0);
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(Half::from_f32(0.0).to_bits(), 0x0000);
        assert_eq!(Half::from_f32(-0.0).to_bits(), 0x8000);
        assert_eq!(Half::from_f32(0.5).to_bits(), 0x3800);
        assert_eq!(Half::from_f32(1.0).to_bits(), 0x3c00);
        assert_eq!(Half::from_f32(2.0).to_bits(), 0x4000);
        assert_eq!(Half::from_f32(3.0).to_bits(), 0x4200);
        assert_eq!(Half::from_f32(-124.0625).to_bits(), 0xd7c1);
        assert_eq!(Half::from_f32(MAX).to_bits(), 0x7bff);
        assert_eq!(Half::from_f32(MIN_POSITIVE).to_bits(), 0x0400);
        assert_eq!(Half::from_f32(MIN_POSITIVE_SUBNORMAL).to_bits(), 0x0001);
    }

    #[test]
    fn test_epsilon() {
        let one = Half::from_f32(1.0);

        for e in [0.0, EPSILON / 4.0, EPSILON / 2.0] {
            assert_eq!(Half::from_f32(1.0 + e), one, "e = {e}");
        }
        for e in [EPSILON, EPSILON * 1.5, EPSILON * 2.0, 0.01] {
            assert_ne!(Half::from_f32(1.0 + e), one, "e = {e}");
        }
    }

    #[test]
    fn test_round_to_nearest_even() {
        // Halfway between 1+eps (odd mantissa) and 1+2eps (even mantissa).
        assert_eq!(Half::from_f32(1.0 + 1.5 * EPSILON).to_bits(), 0x3c02);
        // Halfway between 1+2eps (even) and 1+3eps (odd).
        assert_eq!(Half::from_f32(1.0 + 2.5 * EPSILON).to_bits(), 0x3c02);
        // Just past halfway goes up.
        assert_eq!(Half::from_f32(1.0 + 2.6 * EPSILON).to_bits(), 0x3c03);
    }

    #[test]
    fn test_overflow_to_infinity() {
        assert_eq!(Half::from_f32(65519.0).to_bits(), 0x7bff);
        assert_eq!(Half::from_f32(65520.0), Half::POS_INFINITY);
        assert_eq!(Half::from_f32(1.0e6), Half::POS_INFINITY);
        assert_eq!(Half::from_f32(-1.0e6), Half::NEG_INFINITY);
        assert_eq!(Half::from_f32(f32::INFINITY), Half::POS_INFINITY);
        assert_eq!(Half::from_f32(f32::NEG_INFINITY), Half::NEG_INFINITY);
    }

    #[test]
    fn test_underflow_to_signed_zero() {
        let tiny = MIN_POSITIVE_SUBNORMAL / 4.0;
        assert_eq!(Half::from_f32(tiny).to_bits(), 0x0000);
        assert_eq!(Half::from_f32(-tiny).to_bits(), 0x8000);
        // Exactly half the smallest denormal ties to even (zero).
        assert_eq!(Half::from_f32(MIN_POSITIVE_SUBNORMAL / 2.0).to_bits(), 0x0000);
        assert_eq!(Half::from_f32(f32::MIN_POSITIVE).to_bits(), 0x0000);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(Half::from_f32(f32::NAN).is_nan());
        assert!(Half::from_f32(-f32::NAN).is_nan());
        // A NaN whose payload lives only in the low bits must not become infinity.
        let low_payload = f32::from_bits(0x7f80_0001);
        assert!(Half::from_f32(low_payload).is_nan());
        assert!(Half::QNAN.to_f32().is_nan());
        assert!(Half::SNAN.to_f32().is_nan());
    }

    #[test]
    fn test_special_constants() {
        assert!(Half::POS_INFINITY.is_infinity() && !Half::POS_INFINITY.is_negative());
        assert!(Half::NEG_INFINITY.is_infinity() && Half::NEG_INFINITY.is_negative());
        assert!(Half::QNAN.is_nan());
        assert!(Half::SNAN.is_nan());
        assert_ne!(Half::QNAN, Half::SNAN);
        assert_eq!(Half::POS_INFINITY.to_f32(), f32::INFINITY);
        assert_eq!(Half::NEG_INFINITY.to_f32(), f32::NEG_INFINITY);
    }

    #[test]
    fn test_round_mantissa() {
        // 1 + 3/1024 kept to 8 bits rounds up to 1 + 4/1024.
        let h = Half::from_bits(0x3c03);
        assert_eq!(h.round(8).to_bits(), 0x3c04);
        assert_eq!(h.round(10), h);
        assert_eq!(h.round(12), h);

        // 1.5 kept to zero bits rounds away from zero to 2.0, sign preserved.
        assert_eq!(Half::from_f32(1.5).round(0).to_f32(), 2.0);
        assert_eq!(Half::from_f32(-1.5).round(0).to_f32(), -2.0);

        // Rounding MAX up would overflow, so it truncates instead.
        assert_eq!(Half::from_bits(0x7bff).round(0).to_f32(), 32768.0);

        assert_eq!(Half::QNAN.round(0), Half::QNAN);
        assert_eq!(Half::POS_INFINITY.round(3), Half::POS_INFINITY);
    }

    #[test]
    fn test_arithmetic() {
        let a = Half::from_f32(1.5);
        let b = Half::from_f32(2.25);

        assert_eq!((a + b).to_f32(), 3.75);
        assert_eq!((b - a).to_f32(), 0.75);
        assert_eq!((a * b).to_f32(), 3.375);
        assert_eq!((Half::ONE / Half::from_f32(3.0)).to_bits(), 0x3555);
        assert_eq!((-a).to_f32(), -1.5);
        assert_eq!((-Half::ZERO).to_bits(), 0x8000);
        assert_eq!((a + 0.5f32).to_f32(), 2.0);

        let mut c = a;
        c += b;
        c *= 2.0;
        c -= Half::ONE;
        c /= 2.0;
        assert_eq!(c.to_f32(), 3.25);

        assert_eq!(Half::from_f32(MAX) + Half::from_f32(MAX), Half::POS_INFINITY);
    }
}
