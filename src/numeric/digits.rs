// ============================================================================
// Base-N Digits
// Digit glyphs and exact decomposition of real values into base-N digits
// ============================================================================

use super::errors::{MdnError, MdnResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// A signed digit. Stored digits satisfy `0 < |d| < base`.
pub type Digit = i32;

/// Smallest supported base.
pub const MIN_BASE: u32 = 2;

/// Largest supported base (digits `0-9` then `A-V`).
pub const MAX_BASE: u32 = 32;

/// Glyph for a digit magnitude, `0-9` then `A-V`.
pub fn digit_to_char(value: u32) -> Option<char> {
    if value < MAX_BASE {
        char::from_digit(value, MAX_BASE).map(|c| c.to_ascii_uppercase())
    } else {
        None
    }
}

/// Digit magnitude for a glyph; accepts either letter case.
pub fn char_to_digit(c: char) -> Option<u32> {
    c.to_digit(MAX_BASE)
}

/// A real value split into an integer part and base-N fractional digits.
///
/// Fractional digits are magnitudes; the sign applies to the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RealParts {
    pub negative: bool,
    pub integer: i64,
    pub fraction: Vec<u32>,
}

impl RealParts {
    /// Decompose a finite `f64` into `base` digits, keeping at most
    /// `n_digits` fractional digits (truncated, not rounded).
    ///
    /// The conversion goes through `rust_decimal` so that values such as
    /// `0.1` produce the digits a human would write instead of the binary
    /// expansion of the nearest double.
    pub fn from_f64(value: f64, base: u32, n_digits: usize) -> MdnResult<Self> {
        check_base(base)?;
        if !value.is_finite() {
            return Err(MdnError::InvalidArgument(format!(
                "cannot place non-finite value {value}"
            )));
        }
        let decimal = Decimal::from_f64(value).ok_or_else(|| {
            MdnError::InvalidArgument(format!("value {value} exceeds the decimal range"))
        })?;
        Self::from_decimal(decimal, base, n_digits)
    }

    /// Decompose an exact decimal into `base` digits.
    pub fn from_decimal(value: Decimal, base: u32, n_digits: usize) -> MdnResult<Self> {
        check_base(base)?;
        let negative = value.is_sign_negative() && !value.is_zero();
        let magnitude = value.abs();
        let integer = magnitude.trunc().to_i64().ok_or_else(|| {
            MdnError::InvalidArgument(format!("integer part of {value} overflows i64"))
        })?;

        let radix = Decimal::from(base);
        let mut rest = magnitude.fract();
        let mut fraction = Vec::new();
        while fraction.len() < n_digits && !rest.is_zero() {
            rest = rest.checked_mul(radix).ok_or_else(|| {
                MdnError::InvalidArgument(format!("fraction of {value} overflowed"))
            })?;
            let digit = rest.trunc();
            rest -= digit;
            // trunc of a value below `base` always fits
            fraction.push(digit.to_u32().unwrap_or(0));
        }
        trim_trailing_zeros(&mut fraction);

        Ok(Self {
            negative,
            integer,
            fraction,
        })
    }

    /// Build from base-N digit strings, e.g. `("1A", "8")` in base 16.
    ///
    /// Either part may be empty. The integer part must fit in an `i64`.
    pub fn from_digit_strings(
        negative: bool,
        int_part: &str,
        frac_part: &str,
        base: u32,
    ) -> MdnResult<Self> {
        check_base(base)?;
        let int_digits = parse_digit_string(int_part, base)?;
        let mut fraction = parse_digit_string(frac_part, base)?;
        trim_trailing_zeros(&mut fraction);

        let mut integer: i64 = 0;
        for d in int_digits {
            integer = integer
                .checked_mul(base as i64)
                .and_then(|v| v.checked_add(d as i64))
                .ok_or_else(|| {
                    MdnError::InvalidArgument(format!(
                        "integer part '{int_part}' overflows i64 in base {base}"
                    ))
                })?;
        }

        Ok(Self {
            negative,
            integer,
            fraction,
        })
    }

    /// Signed integer part.
    pub fn signed_integer(&self) -> i64 {
        if self.negative {
            -self.integer
        } else {
            self.integer
        }
    }

    /// Signed fractional digits, most significant first.
    pub fn signed_fraction(&self) -> impl Iterator<Item = i64> + '_ {
        let sign = if self.negative { -1 } else { 1 };
        self.fraction.iter().map(move |&d| sign * d as i64)
    }

    pub fn is_zero(&self) -> bool {
        self.integer == 0 && self.fraction.is_empty()
    }
}

/// Parse a string of base-N digit glyphs, most significant first.
pub fn parse_digit_string(text: &str, base: u32) -> MdnResult<Vec<u32>> {
    text.chars()
        .filter(|c| *c != '_')
        .map(|c| match char_to_digit(c) {
            Some(d) if d < base => Ok(d),
            _ => Err(MdnError::InvalidArgument(format!(
                "'{c}' is not a base {base} digit"
            ))),
        })
        .collect()
}

pub(crate) fn check_base(base: u32) -> MdnResult<()> {
    if (MIN_BASE..=MAX_BASE).contains(&base) {
        Ok(())
    } else {
        Err(MdnError::InvalidArgument(format!(
            "base {base} outside {MIN_BASE}..={MAX_BASE}"
        )))
    }
}

fn trim_trailing_zeros(digits: &mut Vec<u32>) {
    while digits.last() == Some(&0) {
        digits.pop();
    }
}
