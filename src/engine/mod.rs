// ============================================================================
// Engine Module
// Digit storage, carry rules, arithmetic and the shared number type
// ============================================================================

mod arithmetic;
mod carryover;
mod division;
mod mdn2d;
mod store;

pub mod factory;

pub use carryover::{CarryoverType, CleanupReport, Touched};
pub use division::{line_magnitude, line_values, principal_line, DIVISION_FAILED, MAX_DIVISION_BATCHES};
pub use factory::{duplicate, new_instance, Mdn2dBuilder};
pub use mdn2d::{Mdn2d, PolymorphicNodes};
pub use store::{DigitGrid, Direction, PrecisionStatus, MAX_JUMP_STEPS};
