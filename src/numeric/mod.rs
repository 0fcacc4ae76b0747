// ============================================================================
// Numeric Module
// Digits, real-value decomposition and the crate error type
// ============================================================================
//
// This module provides:
// - Digit: signed digit type and base limits
// - RealParts: exact base-N decomposition of reals and digit strings
// - MdnError: error type shared by every layer

mod digits;
mod errors;

pub use digits::{
    char_to_digit, digit_to_char, parse_digit_string, Digit, RealParts, MAX_BASE, MIN_BASE,
};
pub(crate) use digits::check_base;
pub use errors::{MdnError, MdnResult};
