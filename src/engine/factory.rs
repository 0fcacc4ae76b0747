// ============================================================================
// Number Factory
// Creates named numbers with validated configuration
// ============================================================================

use crate::domain::{Coord, Fraxis, Mdn2dConfig, SignConvention};
use crate::engine::{DigitGrid, Mdn2d};
use crate::interfaces::{Framework, StandaloneFramework};
use crate::numeric::{Digit, MdnResult};
use std::sync::Arc;

/// Stem used when no name is given
pub const DEFAULT_NAME_HINT: &str = "Mdn";

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates an empty number.
///
/// The framework reserves a unique name derived from `name`, or from
/// `DEFAULT_NAME_HINT` when none is given.
///
/// # Example
/// ```
/// use mdn2d::prelude::*;
/// use mdn2d::engine::factory::new_instance;
/// use std::sync::Arc;
///
/// let framework: Arc<dyn Framework> = Arc::new(StandaloneFramework::default());
/// let n = new_instance(Mdn2dConfig::decimal(), Some("n"), framework).unwrap();
/// assert_eq!(n.name(), "n");
/// ```
pub fn new_instance(
    config: Mdn2dConfig,
    name: Option<&str>,
    framework: Arc<dyn Framework>,
) -> MdnResult<Mdn2d> {
    let grid = DigitGrid::new(config)?;
    let name = framework.suggest_name(name.unwrap_or(DEFAULT_NAME_HINT));
    Ok(Mdn2d::from_parts(name, grid, framework))
}

/// Creates a copy of `source` (digits and config) under the same framework.
///
/// Without a name the framework's copy-name policy applies.
pub fn duplicate(source: &Mdn2d, name: Option<&str>) -> MdnResult<Mdn2d> {
    let state = source.snapshot_state();
    let framework = Arc::clone(source.framework());
    let name = match name {
        Some(name) => framework.suggest_name(name),
        None => framework.suggest_copy_name(&state.name),
    };
    Ok(Mdn2d::from_parts(name, state.grid, framework))
}

// ============================================================================
// Builder Pattern for Advanced Configuration
// ============================================================================

/// Builder for creating numbers with a fluent API
///
/// # Example
/// ```
/// use mdn2d::prelude::*;
///
/// let n = Mdn2dBuilder::new()
///     .base(16)
///     .precision(8)
///     .name("hex")
///     .digit(Coord::new(0, 0), 0xA)
///     .build()
///     .unwrap();
///
/// assert_eq!(n.get_value(Coord::ORIGIN), 10);
/// ```
pub struct Mdn2dBuilder {
    config: Mdn2dConfig,
    name: Option<String>,
    framework: Option<Arc<dyn Framework>>,
    digits: Vec<(Coord, Digit)>,
}

impl Mdn2dBuilder {
    /// Start from the default decimal configuration
    pub fn new() -> Self {
        Self::with_config(Mdn2dConfig::default())
    }

    pub fn with_config(config: Mdn2dConfig) -> Self {
        Self {
            config,
            name: None,
            framework: None,
            digits: Vec::new(),
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn base(mut self, base: u32) -> Self {
        self.config.base = base;
        self
    }

    pub fn precision(mut self, precision: i32) -> Self {
        self.config.precision = precision;
        self
    }

    pub fn sign_convention(mut self, sign_convention: SignConvention) -> Self {
        self.config.sign_convention = sign_convention;
        self
    }

    pub fn fraxis(mut self, fraxis: Fraxis) -> Self {
        self.config.fraxis = fraxis;
        self
    }

    pub fn max_carryover_iters(mut self, iters: usize) -> Self {
        self.config.max_carryover_iters = iters;
        self
    }

    pub fn max_cascade_depth(mut self, depth: usize) -> Self {
        self.config.max_cascade_depth = depth;
        self
    }

    pub fn max_division_iters(mut self, iters: usize) -> Self {
        self.config.max_division_iters = iters;
        self
    }

    // ========================================================================
    // Identity and Content
    // ========================================================================

    /// Preferred name; the framework may adjust it for uniqueness
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Naming framework; a fresh `StandaloneFramework` is used otherwise
    pub fn framework(mut self, framework: Arc<dyn Framework>) -> Self {
        self.framework = Some(framework);
        self
    }

    /// Initial digit, range-checked on build
    pub fn digit(mut self, xy: Coord, digit: Digit) -> Self {
        self.digits.push((xy, digit));
        self
    }

    // ========================================================================
    // Preset Configurations
    // ========================================================================

    pub fn decimal() -> Self {
        Self::with_config(Mdn2dConfig::decimal())
    }

    pub fn binary() -> Self {
        Self::with_config(Mdn2dConfig::binary())
    }

    pub fn hexadecimal() -> Self {
        Self::with_config(Mdn2dConfig::hexadecimal())
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the number
    pub fn build(self) -> MdnResult<Mdn2d> {
        let framework = self
            .framework
            .unwrap_or_else(|| Arc::new(StandaloneFramework::default()));
        let mut grid = DigitGrid::new(self.config)?;
        grid.set_values(self.digits)?;
        let name = framework.suggest_name(self.name.as_deref().unwrap_or(DEFAULT_NAME_HINT));
        Ok(Mdn2d::from_parts(name, grid, framework))
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &Mdn2dConfig {
        &self.config
    }
}

impl Default for Mdn2dBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Mdn2d {
    /// Shorthand for `Mdn2dBuilder::new()`
    pub fn builder() -> Mdn2dBuilder {
        Mdn2dBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::MdnError;

    #[test]
    fn test_new_instance_defaults() {
        let fw: Arc<dyn Framework> = Arc::new(StandaloneFramework::default());
        let n = new_instance(Mdn2dConfig::default(), None, Arc::clone(&fw)).unwrap();
        assert_eq!(n.name(), DEFAULT_NAME_HINT);
        assert!(n.is_empty());
        assert!(fw.mdn_name_exists(DEFAULT_NAME_HINT));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let fw: Arc<dyn Framework> = Arc::new(StandaloneFramework::default());
        let bad = Mdn2dConfig::default().with_precision(0);
        assert!(matches!(
            new_instance(bad, None, fw),
            Err(MdnError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_duplicate_copies_digits() {
        let source = Mdn2dBuilder::new()
            .name("src")
            .digit(Coord::new(1, 2), 3)
            .build()
            .unwrap();
        let copy = duplicate(&source, None).unwrap();
        assert_eq!(copy.name(), "src_copy");
        assert_eq!(copy.get_value(Coord::new(1, 2)), 3);
        assert_ne!(copy.id(), source.id());
        assert_eq!(copy, source);

        copy.set_value(Coord::new(1, 2), 4).unwrap();
        assert_eq!(source.get_value(Coord::new(1, 2)), 3);

        let named = duplicate(&source, Some("other")).unwrap();
        assert_eq!(named.name(), "other");
    }

    #[test]
    fn test_builder_pattern() {
        let n = Mdn2d::builder()
            .base(8)
            .precision(6)
            .sign_convention(SignConvention::Positive)
            .fraxis(Fraxis::Y)
            .max_cascade_depth(2)
            .build()
            .unwrap();
        let config = n.config();
        assert_eq!(config.base, 8);
        assert_eq!(config.precision, 6);
        assert_eq!(config.sign_convention, SignConvention::Positive);
        assert_eq!(config.fraxis, Fraxis::Y);
        assert_eq!(config.max_cascade_depth, 2);
    }

    #[test]
    fn test_builder_digit_range_checked() {
        let result = Mdn2dBuilder::binary().digit(Coord::ORIGIN, 2).build();
        assert!(matches!(result, Err(MdnError::OutOfRange { .. })));
    }

    #[test]
    fn test_preset_builders() {
        assert_eq!(Mdn2dBuilder::decimal().get_config().base, 10);
        assert_eq!(Mdn2dBuilder::binary().get_config().base, 2);
        assert_eq!(Mdn2dBuilder::hexadecimal().build().unwrap().config().base, 16);
    }
}
