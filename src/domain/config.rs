// ============================================================================
// MDN Configuration
// Base, precision and carry policy owned by every multi-dimensional number
// ============================================================================

use crate::numeric::{check_base, MdnError, MdnResult};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Sign Convention
// ============================================================================

/// Policy for choosing among polymorphic representations of one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignConvention {
    /// Keep whichever form arithmetic produced; several canonical forms exist
    #[default]
    Default = 0,
    /// Resolve optional carries that turn negative pivots positive
    Positive = 1,
    /// Resolve optional carries that turn positive pivots negative
    Negative = 2,
}

impl SignConvention {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(SignConvention::Default),
            1 => Some(SignConvention::Positive),
            2 => Some(SignConvention::Negative),
            _ => None,
        }
    }

    /// True when more than one digit map may represent a value.
    pub fn allows_polymorphism(&self) -> bool {
        matches!(self, SignConvention::Default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignConvention::Default => "default",
            SignConvention::Positive => "positive",
            SignConvention::Negative => "negative",
        }
    }
}

impl FromStr for SignConvention {
    type Err = MdnError;

    fn from_str(s: &str) -> MdnResult<Self> {
        match s {
            "default" => Ok(SignConvention::Default),
            "positive" => Ok(SignConvention::Positive),
            "negative" => Ok(SignConvention::Negative),
            _ => Err(MdnError::InvalidArgument(format!("unknown sign convention '{s}'"))),
        }
    }
}

// ============================================================================
// Fraxis
// ============================================================================

/// Axis governing fractional-digit placement and division offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Fraxis {
    /// Defer to the config (placement) or alternate X/Y (division)
    Default = 0,
    #[default]
    X = 1,
    Y = 2,
}

impl Fraxis {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Fraxis::Default),
            1 => Some(Fraxis::X),
            2 => Some(Fraxis::Y),
            _ => None,
        }
    }

    /// Resolve `Default` against a fallback; `X` when both are `Default`.
    pub fn or(self, fallback: Fraxis) -> Fraxis {
        match (self, fallback) {
            (Fraxis::Default, Fraxis::Default) => Fraxis::X,
            (Fraxis::Default, other) => other,
            (axis, _) => axis,
        }
    }

    /// The other axis; `Default` stays `Default`.
    pub fn flipped(self) -> Fraxis {
        match self {
            Fraxis::X => Fraxis::Y,
            Fraxis::Y => Fraxis::X,
            Fraxis::Default => Fraxis::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Fraxis::Default => "default",
            Fraxis::X => "x",
            Fraxis::Y => "y",
        }
    }
}

impl FromStr for Fraxis {
    type Err = MdnError;

    fn from_str(s: &str) -> MdnResult<Self> {
        match s {
            "default" => Ok(Fraxis::Default),
            "x" => Ok(Fraxis::X),
            "y" => Ok(Fraxis::Y),
            _ => Err(MdnError::InvalidArgument(format!("unknown fraxis '{s}'"))),
        }
    }
}

// ============================================================================
// Config Change Impact
// ============================================================================

/// Consequence of applying a new config to a populated number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mdn2dConfigImpact {
    NoImpact,
    AllDigitsCleared,
    PossibleDigitLoss,
    PossiblePolymorphism,
    PossibleDigitLossAndPolymorphism,
    /// The proposed config is itself invalid
    Unknown,
}

impl Mdn2dConfigImpact {
    /// True when applying the change may discard stored digits.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Mdn2dConfigImpact::AllDigitsCleared
                | Mdn2dConfigImpact::PossibleDigitLoss
                | Mdn2dConfigImpact::PossibleDigitLossAndPolymorphism
        )
    }
}

impl fmt::Display for Mdn2dConfigImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Mdn2dConfigImpact::NoImpact => "no impact",
            Mdn2dConfigImpact::AllDigitsCleared => "all digits cleared",
            Mdn2dConfigImpact::PossibleDigitLoss => "possible digit loss",
            Mdn2dConfigImpact::PossiblePolymorphism => "possible polymorphism",
            Mdn2dConfigImpact::PossibleDigitLossAndPolymorphism => {
                "possible digit loss and polymorphism"
            },
            Mdn2dConfigImpact::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

// ============================================================================
// Complete Number Configuration
// ============================================================================

/// Configuration owned (by value) by every multi-dimensional number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mdn2dConfig {
    /// Numeral base, 2..=32
    pub base: u32,

    /// Maximum span (in digits) of non-zero storage along each axis
    pub precision: i32,

    /// Which polymorphic form cleanup settles on
    pub sign_convention: SignConvention,

    /// Axis used for fractional placement when callers pass `Fraxis::Default`
    pub fraxis: Fraxis,

    /// Cap on breadth-first carryover waves per cleanup
    pub max_carryover_iters: usize,

    /// Length of the compensating diagonal cascade per fractional digit
    pub max_cascade_depth: usize,

    /// Cap on improving steps per division batch
    pub max_division_iters: usize,
}

impl Mdn2dConfig {
    pub const DEFAULT_BASE: u32 = 10;
    pub const DEFAULT_PRECISION: i32 = 16;
    pub const DEFAULT_MAX_CARRYOVER_ITERS: usize = 100;
    pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 4;
    pub const DEFAULT_MAX_DIVISION_ITERS: usize = 16;

    /// Create a new configuration with required parameters
    pub fn new(base: u32, precision: i32, sign_convention: SignConvention) -> Self {
        Self {
            base,
            precision,
            sign_convention,
            fraxis: Fraxis::X,
            max_carryover_iters: Self::DEFAULT_MAX_CARRYOVER_ITERS,
            max_cascade_depth: Self::DEFAULT_MAX_CASCADE_DEPTH,
            max_division_iters: Self::DEFAULT_MAX_DIVISION_ITERS,
        }
    }

    /// Builder method: Set base
    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    /// Builder method: Set precision
    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }

    /// Builder method: Set sign convention
    pub fn with_sign_convention(mut self, sign_convention: SignConvention) -> Self {
        self.sign_convention = sign_convention;
        self
    }

    /// Builder method: Set default fraxis
    pub fn with_fraxis(mut self, fraxis: Fraxis) -> Self {
        self.fraxis = fraxis;
        self
    }

    /// Builder method: Set carryover wave cap
    pub fn with_max_carryover_iters(mut self, iters: usize) -> Self {
        self.max_carryover_iters = iters;
        self
    }

    /// Builder method: Set fraxis cascade depth
    pub fn with_max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    /// Builder method: Set division step cap
    pub fn with_max_division_iters(mut self, iters: usize) -> Self {
        self.max_division_iters = iters;
        self
    }

    /// Smallest magnitude distinguishable at this precision: `base^-precision`.
    pub fn epsilon(&self) -> f64 {
        (self.base as f64).powi(-self.precision)
    }

    /// Validate the configuration
    pub fn validate(&self) -> MdnResult<()> {
        check_base(self.base)?;

        if self.precision < 1 {
            return Err(MdnError::InvalidArgument(format!(
                "precision must be at least 1, got {}",
                self.precision
            )));
        }

        if self.max_carryover_iters == 0 {
            return Err(MdnError::InvalidArgument(
                "carryover iteration cap cannot be zero".to_string(),
            ));
        }

        if self.max_division_iters == 0 {
            return Err(MdnError::InvalidArgument(
                "division iteration cap cannot be zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Classify what applying `next` would do to a number holding digits.
    ///
    /// Pure: nothing is changed. `populated` is whether the number
    /// currently stores any digit.
    pub fn assess_change(&self, next: &Mdn2dConfig, populated: bool) -> Mdn2dConfigImpact {
        if next.validate().is_err() {
            return Mdn2dConfigImpact::Unknown;
        }
        if !populated || self == next {
            return Mdn2dConfigImpact::NoImpact;
        }
        if self.base != next.base {
            return Mdn2dConfigImpact::AllDigitsCleared;
        }

        let shrinks = next.precision < self.precision;
        let resigns = next.sign_convention != self.sign_convention;
        match (shrinks, resigns) {
            (true, true) => Mdn2dConfigImpact::PossibleDigitLossAndPolymorphism,
            (true, false) => Mdn2dConfigImpact::PossibleDigitLoss,
            (false, true) => Mdn2dConfigImpact::PossiblePolymorphism,
            (false, false) => Mdn2dConfigImpact::NoImpact,
        }
    }
}

impl Default for Mdn2dConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_BASE,
            Self::DEFAULT_PRECISION,
            SignConvention::Default,
        )
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl Mdn2dConfig {
    /// Base 10 with default precision
    pub fn decimal() -> Self {
        Self::default()
    }

    /// Base 2; twice the decimal precision covers a similar magnitude
    pub fn binary() -> Self {
        Self::new(2, 2 * Self::DEFAULT_PRECISION, SignConvention::Default)
    }

    /// Base 16 with default precision
    pub fn hexadecimal() -> Self {
        Self::new(16, Self::DEFAULT_PRECISION, SignConvention::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Mdn2dConfig::new(10, 8, SignConvention::Positive);

        assert_eq!(config.base, 10);
        assert_eq!(config.precision, 8);
        assert_eq!(config.fraxis, Fraxis::X);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = Mdn2dConfig::hexadecimal()
            .with_precision(4)
            .with_fraxis(Fraxis::Y)
            .with_max_cascade_depth(2);

        assert_eq!(config.base, 16);
        assert_eq!(config.precision, 4);
        assert_eq!(config.fraxis, Fraxis::Y);
        assert_eq!(config.max_cascade_depth, 2);
    }

    #[test]
    fn test_validation() {
        assert!(Mdn2dConfig::default().with_base(1).validate().is_err());
        assert!(Mdn2dConfig::default().with_base(33).validate().is_err());
        assert!(Mdn2dConfig::default().with_precision(0).validate().is_err());
        assert!(Mdn2dConfig::default()
            .with_max_carryover_iters(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_epsilon() {
        let config = Mdn2dConfig::default().with_precision(3);
        assert!((config.epsilon() - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_assess_change() {
        let current = Mdn2dConfig::default();

        assert_eq!(
            current.assess_change(&current.clone().with_base(16), false),
            Mdn2dConfigImpact::NoImpact
        );
        assert_eq!(
            current.assess_change(&current.clone().with_base(16), true),
            Mdn2dConfigImpact::AllDigitsCleared
        );
        assert_eq!(
            current.assess_change(&current.clone().with_precision(8), true),
            Mdn2dConfigImpact::PossibleDigitLoss
        );
        assert_eq!(
            current.assess_change(&current.clone().with_precision(20), true),
            Mdn2dConfigImpact::NoImpact
        );
        assert_eq!(
            current.assess_change(
                &current
                    .clone()
                    .with_sign_convention(SignConvention::Positive),
                true
            ),
            Mdn2dConfigImpact::PossiblePolymorphism
        );
        assert_eq!(
            current.assess_change(
                &current
                    .clone()
                    .with_precision(4)
                    .with_sign_convention(SignConvention::Negative),
                true
            ),
            Mdn2dConfigImpact::PossibleDigitLossAndPolymorphism
        );
        assert_eq!(
            current.assess_change(&current.clone().with_precision(-1), true),
            Mdn2dConfigImpact::Unknown
        );
    }

    #[test]
    fn test_preset_configs() {
        assert_eq!(Mdn2dConfig::binary().base, 2);
        assert_eq!(Mdn2dConfig::decimal(), Mdn2dConfig::default());
        assert!(Mdn2dConfig::hexadecimal().validate().is_ok());
    }

    #[test]
    fn test_fraxis_resolution() {
        assert_eq!(Fraxis::Default.or(Fraxis::Y), Fraxis::Y);
        assert_eq!(Fraxis::Default.or(Fraxis::Default), Fraxis::X);
        assert_eq!(Fraxis::Y.or(Fraxis::X), Fraxis::Y);
        assert_eq!(Fraxis::X.flipped(), Fraxis::Y);
    }

    #[test]
    fn test_names_parse_back() {
        for sign in [
            SignConvention::Default,
            SignConvention::Positive,
            SignConvention::Negative,
        ] {
            assert_eq!(sign.as_str().parse::<SignConvention>().unwrap(), sign);
        }
        for fraxis in [Fraxis::Default, Fraxis::X, Fraxis::Y] {
            assert_eq!(fraxis.as_str().parse::<Fraxis>().unwrap(), fraxis);
        }
        assert!("up".parse::<Fraxis>().is_err());
        assert!("Positive".parse::<SignConvention>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let config = Mdn2dConfig::hexadecimal()
            .with_sign_convention(SignConvention::Negative)
            .with_fraxis(Fraxis::Y);
        let json = serde_json::to_string(&config).unwrap();
        let back: Mdn2dConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
