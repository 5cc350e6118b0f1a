// src/bf16.rs

//! BFloat16 codec for simulator stimulus and response vectors.
//!
//! `Bf16` is the top 16 bits of an IEEE 754 single-precision float:
//! - 1 sign bit
//! - 8 exponent bits (same range as f32)
//! - 7 mantissa bits (vs 23 for f32)
//!
//! # Layout
//!
//! bf16 is literally the upper 16 bits of f32:
//! ```text
//! f32:  SEEEEEEE EMMMMMMM MMMMMMMM MMMMMMMM
//! bf16: SEEEEEEE EMMMMMMM
//! ```
//! where S=sign, E=exponent, M=mantissa.
//!
//! Both widths are read as big-endian integers: bit 31 (resp. 15) is the sign.
//! `f32::to_bits` / `f32::from_bits` already work on that integer view, so the
//! conversion never depends on host byte order:
//! - f32 → bf16: `(f32.to_bits() >> 16) as u16` (truncation, round-toward-zero)
//! - bf16 → f32: `f32::from_bits((bf16 as u32) << 16)` (exact, zero-extends mantissa)
//!
//! The hardware under test truncates, so encoding here truncates too. Rounding
//! to nearest would make the stimulus disagree with the RTL bit-for-bit.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of hex digits in one encoded bf16 record.
pub const HEX_DIGITS: usize = 4;

const SIGN_MASK: u16 = 0x8000;
const EXPONENT_MASK: u16 = 0x7F80;
const MANTISSA_MASK: u16 = 0x007F;
const QUIET_BIT: u16 = 0x0040;

/// Malformed bf16 text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("empty bf16 record")]
    Empty,
    #[error("'{0}' is not a hexadecimal bf16 value")]
    InvalidHex(String),
    #[error("'{0}' does not fit in 16 bits")]
    OutOfRange(String),
    #[error("'{0}' is neither a hex bf16 value nor a decimal number")]
    InvalidValue(String),
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
}

/// BFloat16 value, stored as its raw bits.
///
/// Values are interpreted as the upper 16 bits of the IEEE 754 f32
/// representation. Equality is bitwise, so `NAN == NAN` and `0.0 != -0.0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Bf16(pub u16);

impl Bf16 {
    /// bf16 representation of 0.0
    pub const ZERO: Self = Self(0x0000);

    /// bf16 representation of -0.0
    pub const NEG_ZERO: Self = Self(0x8000);

    /// bf16 representation of 1.0
    pub const ONE: Self = Self(0x3F80);

    /// bf16 representation of -1.0
    pub const NEG_ONE: Self = Self(0xBF80);

    /// bf16 positive infinity
    pub const INFINITY: Self = Self(0x7F80);

    /// bf16 negative infinity
    pub const NEG_INFINITY: Self = Self(0xFF80);

    /// bf16 NaN (quiet)
    pub const NAN: Self = Self(0x7FC0);

    /// Construct from raw bf16 bits (the upper 16 bits of an f32).
    #[inline(always)]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Return the raw bf16 bits.
    #[inline(always)]
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Convert f32 to bf16 by truncating the lower 16 mantissa bits (round toward zero).
    ///
    /// NaNs whose payload lives entirely in the discarded bits come out as
    /// infinity. Signaling/quiet distinctions survive only through bit 22.
    #[inline(always)]
    pub fn from_f32_truncate(val: f32) -> Self {
        Self((val.to_bits() >> 16) as u16)
    }

    /// Convert bf16 to f32 by zero-extending the mantissa.
    ///
    /// This is an exact conversion (no rounding occurs).
    #[inline(always)]
    pub fn to_f32(self) -> f32 {
        f32::from_bits((self.0 as u32) << 16)
    }

    /// Assemble a value from its fields. Each field is masked to its width
    /// (1, 8 and 7 bits).
    pub const fn from_parts(sign: u16, exponent: u16, mantissa: u16) -> Self {
        Self(((sign & 0x1) << 15) | ((exponent & 0xFF) << 7) | (mantissa & MANTISSA_MASK))
    }

    pub const fn sign(self) -> u16 {
        self.0 >> 15
    }

    pub const fn exponent(self) -> u16 {
        (self.0 & EXPONENT_MASK) >> 7
    }

    pub const fn mantissa(self) -> u16 {
        self.0 & MANTISSA_MASK
    }

    pub const fn is_sign_negative(self) -> bool {
        self.0 & SIGN_MASK != 0
    }

    pub const fn is_zero(self) -> bool {
        self.exponent() == 0 && self.mantissa() == 0
    }

    pub const fn is_denormal(self) -> bool {
        self.exponent() == 0 && self.mantissa() != 0
    }

    pub const fn is_infinite(self) -> bool {
        self.exponent() == 0xFF && self.mantissa() == 0
    }

    pub const fn is_nan(self) -> bool {
        self.exponent() == 0xFF && self.mantissa() != 0
    }

    pub const fn is_signaling_nan(self) -> bool {
        self.is_nan() && self.0 & QUIET_BIT == 0
    }

    pub const fn is_quiet_nan(self) -> bool {
        self.is_nan() && self.0 & QUIET_BIT != 0
    }

    /// Parse a hex record strictly: hex digits only, no `0x` prefix, no sign,
    /// and a value that fits in 16 bits. Leading zeros are allowed.
    pub fn from_hex(text: &str) -> Result<Self, FormatError> {
        if text.is_empty() {
            return Err(FormatError::Empty);
        }
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FormatError::InvalidHex(text.to_string()));
        }
        // Only digit-count overflow is left once the charset is known good.
        u16::from_str_radix(text, 16)
            .map(Self)
            .map_err(|_| FormatError::OutOfRange(text.to_string()))
    }

    /// Parse a value typed by a person: a hex record is tried first, then a
    /// decimal float which is truncated to bf16.
    ///
    /// Hex wins on ambiguity, so `"10"` is `0x0010`, not ten.
    pub fn parse_lenient(text: &str) -> Result<Self, FormatError> {
        let text = text.trim();
        if let Ok(value) = Self::from_hex(text) {
            return Ok(value);
        }
        text.parse::<f32>()
            .map(Self::from_f32_truncate)
            .map_err(|_| FormatError::InvalidValue(text.to_string()))
    }
}

impl From<Bf16> for f32 {
    fn from(value: Bf16) -> Self {
        value.to_f32()
    }
}

impl fmt::LowerHex for Bf16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Renders the 4-digit lowercase hex record.
impl fmt::Display for Bf16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$x}", self.0, width = HEX_DIGITS)
    }
}

impl FromStr for Bf16 {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Encode an f32 as a 4-digit lowercase hex bf16 record.
pub fn encode(value: f32) -> String {
    Bf16::from_f32_truncate(value).to_string()
}

/// Decode a hex bf16 record into the f32 it denotes.
pub fn decode(hex: &str) -> Result<f32, FormatError> {
    Bf16::from_hex(hex).map(Bf16::to_f32)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test_log::test]
    fn test_bf16_one_is_fixed_point() {
        // 1.0 in f32 = 0x3F800000, upper 16 bits = 0x3F80
        assert_eq!(encode(1.0), "3f80");
        assert_eq!(decode("3f80").unwrap(), 1.0);
        assert_eq!(Bf16::from_f32_truncate(1.0), Bf16::ONE);
    }

    #[test_log::test]
    fn test_bf16_signed_zero() {
        assert_eq!(encode(0.0), "0000");
        assert_eq!(encode(-0.0), "8000");
        assert!(Bf16::NEG_ZERO.is_zero());
        assert!(decode("8000").unwrap().is_sign_negative());
    }

    #[test_log::test]
    fn test_bf16_infinity() {
        assert_eq!(encode(f32::INFINITY), "7f80");
        assert_eq!(encode(f32::NEG_INFINITY), "ff80");
        assert_eq!(decode("7f80").unwrap(), f32::INFINITY);
        assert!(Bf16::INFINITY.is_infinite());
        assert!(!Bf16::INFINITY.is_nan());
    }

    #[test_log::test]
    fn test_bf16_truncates_instead_of_rounding() {
        // 1.0 with mantissa bit 15 set: the first discarded bit is 1.
        let just_over_half_ulp = f32::from_bits(0x3F80_8000);
        assert_eq!(encode(just_over_half_ulp), "3f80");

        // Everything below the top 7 mantissa bits set.
        let almost_next = f32::from_bits(0x3F80_FFFF);
        assert_eq!(encode(almost_next), "3f80");

        // Negative values truncate toward zero too.
        assert_eq!(encode(f32::from_bits(0xBF80_FFFF)), "bf80");
    }

    #[test_log::test]
    fn test_bf16_nan_classification() {
        assert!(Bf16::NAN.is_quiet_nan());
        assert!(!Bf16::NAN.is_signaling_nan());

        let snan = Bf16::from_parts(0, 0xFF, 0x01);
        assert!(snan.is_nan());
        assert!(snan.is_signaling_nan());

        // A NaN carried only in the low 16 bits truncates to infinity.
        assert_eq!(Bf16::from_f32_truncate(f32::from_bits(0x7F80_0001)), Bf16::INFINITY);
        assert!(decode("7fc0").unwrap().is_nan());
    }

    #[test_log::test]
    fn test_bf16_fields() {
        let v = Bf16::from_f32_truncate(-3.5);
        assert_eq!(v.sign(), 1);
        assert_eq!(v.exponent(), 128);
        assert_eq!(v.mantissa(), 0x60);
        assert_eq!(Bf16::from_parts(v.sign(), v.exponent(), v.mantissa()), v);
        assert!(Bf16::from_parts(0, 0, 1).is_denormal());
    }

    #[test_log::test]
    fn test_bf16_display_zero_pads() {
        assert_eq!(Bf16(0x0001).to_string(), "0001");
        assert_eq!(Bf16(0xABCD).to_string(), "abcd");
        assert_eq!(format!("{:x}", Bf16(0x00FF)), "ff");
        assert_eq!("3F80".parse::<Bf16>(), Ok(Bf16::ONE));
    }

    #[test_log::test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode(""), Err(FormatError::Empty));
        assert_eq!(decode("zzzz"), Err(FormatError::InvalidHex("zzzz".into())));
        assert_eq!(decode("0x3f80"), Err(FormatError::InvalidHex("0x3f80".into())));
        assert_eq!(decode("-3f8"), Err(FormatError::InvalidHex("-3f8".into())));
        assert_eq!(decode("3f80 "), Err(FormatError::InvalidHex("3f80 ".into())));
        assert_eq!(decode("10000"), Err(FormatError::OutOfRange("10000".into())));
        // Leading zeros do not overflow.
        assert_eq!(decode("00003f80"), Ok(1.0));
        assert_eq!(decode("1"), Ok(f32::from_bits(0x0001_0000)));
    }

    #[test_log::test]
    fn test_parse_lenient() {
        assert_eq!(Bf16::parse_lenient("3f80"), Ok(Bf16::ONE));
        assert_eq!(Bf16::parse_lenient(" 10 "), Ok(Bf16(0x0010)));
        assert_eq!(Bf16::parse_lenient("1.5").unwrap().to_f32(), 1.5);
        assert_eq!(Bf16::parse_lenient("-2").unwrap(), Bf16(0xC000));
        assert_eq!(
            Bf16::parse_lenient("pi"),
            Err(FormatError::InvalidValue("pi".into()))
        );
    }

    #[test_log::test]
    fn test_decode_matches_half_crate() {
        // Widening is exact, so it must agree with an independent implementation.
        for bits in [0x0000u16, 0x8000, 0x3F80, 0xBF80, 0x7F80, 0xFF80, 0x0001, 0x4120, 0xC120] {
            let ours = Bf16(bits).to_f32();
            let theirs = half::bf16::from_bits(bits).to_f32();
            assert_eq!(ours.to_bits(), theirs.to_bits(), "bits {bits:04x}");
        }
    }

    #[test_log::test]
    fn test_every_bf16_pattern_survives_decode_encode() {
        for bits in 0..=u16::MAX {
            let hex = format!("{bits:04x}");
            assert_eq!(encode(decode(&hex).unwrap()), hex);
        }
    }

    proptest! {
        #[test]
        fn prop_encode_preserves_sign_and_exponent(bits in any::<u32>()) {
            let x = f32::from_bits(bits);
            let encoded = Bf16::from_f32_truncate(x);
            prop_assert_eq!(encoded.sign() as u32, bits >> 31);
            prop_assert_eq!(encoded.exponent() as u32, (bits >> 23) & 0xFF);
            prop_assert_eq!(encoded.mantissa() as u32, (bits >> 16) & 0x7F);
        }

        #[test]
        fn prop_decode_zero_fills_low_bits(bits in any::<u16>()) {
            let widened = Bf16(bits).to_f32().to_bits();
            prop_assert_eq!(widened & 0xFFFF, 0);
            prop_assert_eq!((widened >> 16) as u16, bits);
        }

        #[test]
        fn prop_truncation_never_grows_magnitude(x in prop::num::f32::NORMAL) {
            let narrowed = Bf16::from_f32_truncate(x).to_f32();
            prop_assert!(narrowed.abs() <= x.abs());
            prop_assert_eq!(narrowed.is_sign_negative(), x.is_sign_negative());
        }

        #[test]
        fn prop_matches_round_to_nearest_below_midpoint(x in prop::num::f32::NORMAL) {
            // half rounds to nearest-even; below the midpoint that is truncation.
            prop_assume!(x.to_bits() & 0xFFFF < 0x8000);
            prop_assert_eq!(
                Bf16::from_f32_truncate(x).to_bits(),
                half::bf16::from_f32(x).to_bits()
            );
        }
    }
}
