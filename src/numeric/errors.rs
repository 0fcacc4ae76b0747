// ============================================================================
// MDN Errors
// Error types for grid storage, arithmetic and serialization
// ============================================================================

use crate::domain::Coord;
use thiserror::Error;

/// Errors raised by multi-dimensional number operations.
///
/// Expected outcomes (precision purges, carryover iteration caps, config
/// impact) are reported through return values instead.
#[derive(Debug, Error)]
pub enum MdnError {
    /// Digit assignment outside `±(base - 1)`
    #[error("digit {digit} at {at} is out of range for base {base}")]
    OutOfRange { at: Coord, digit: i64, base: u32 },

    /// Operands carry different bases
    #[error("base mismatch between operands: {lhs} vs {rhs}")]
    BaseMismatch { lhs: u32, rhs: u32 },

    /// The same instance was passed where distinct instances are required
    #[error("illegal self reference: {0}")]
    IllegalSelfReference(&'static str),

    /// A stored zero was found while rebuilding metadata
    #[error("zero digit stored at {0}")]
    ZeroEncountered(Coord),

    /// Internal consistency failure
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Secondary indices or bounds disagree with the digit map
    #[error("metadata invalid: {0}")]
    MetaDataInvalid(String),

    #[error("division by zero")]
    DivideByZero,

    /// Corrupt or unrecognised serialized input
    #[error("read error: {0}")]
    ReadError(String),

    /// Malformed config, shift or numeric argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure of the underlying reader or writer
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for MDN operations
pub type MdnResult<T> = Result<T, MdnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MdnError::OutOfRange {
            at: Coord::new(1, -2),
            digit: 12,
            base: 10,
        };
        assert_eq!(
            err.to_string(),
            "digit 12 at (1, -2) is out of range for base 10"
        );
        assert_eq!(MdnError::DivideByZero.to_string(), "division by zero");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short");
        let err: MdnError = io.into();
        assert!(matches!(err, MdnError::Io(_)));
    }
}
