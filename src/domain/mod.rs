// ============================================================================
// Domain Models Module
// Value types shared by every layer: coordinates, rects, configuration
// ============================================================================

pub mod config;
pub mod coord;
pub mod rect;

pub use config::{Fraxis, Mdn2dConfig, Mdn2dConfigImpact, SignConvention};
pub use coord::Coord;
pub use rect::{Rect, RectIter};
