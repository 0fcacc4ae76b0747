// ============================================================================
// MDN2D Library
// Multi-dimensional numbers on a sparse, thread-safe 2D digit grid
// ============================================================================

//! # MDN2D
//!
//! A positional numeral system whose digits live on a 2D integer grid. A
//! digit `d` at `(x, y)` contributes `d * X^x * Y^y`, where the two axis
//! variables satisfy `X + Y = base`. A digit that reaches the base carries
//! into both `(x + 1, y)` and `(x, y + 1)`.
//!
//! ## Features
//!
//! - **Sparse storage** with row/column indices and tracked bounds
//! - **Two-axis carryover** with sign conventions for polymorphic forms
//! - **Precision window** bounding how far digits may spread
//! - **Arithmetic**: sums, products, iterative division, scalar operations
//! - **Thread-safe instances** with id-ordered locking and weak observers
//! - **Serialization** as pretty text, delimited text or binary snapshots
//!
//! ## Example
//!
//! ```rust
//! use mdn2d::prelude::*;
//!
//! let a = Mdn2dBuilder::decimal().name("a").build().unwrap();
//! let b = Mdn2dBuilder::decimal().name("b").build().unwrap();
//! let sum = Mdn2dBuilder::decimal().name("sum").build().unwrap();
//!
//! a.add_integer(Coord::ORIGIN, 17).unwrap();
//! b.add_integer(Coord::ORIGIN, 5).unwrap();
//! a.plus(&b, &sum).unwrap();
//!
//! // 22 = 2 + 2X + 2Y, since X + Y = 10
//! assert_eq!(sum.get_value(Coord::new(0, 0)), 2);
//! assert_eq!(sum.get_value(Coord::new(1, 0)), 2);
//! assert_eq!(sum.get_value(Coord::new(0, 1)), 2);
//!
//! println!("{sum}");
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod io;
pub mod numeric;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{Coord, Fraxis, Mdn2dConfig, Mdn2dConfigImpact, Rect, SignConvention};
    pub use crate::engine::{
        CarryoverType, CleanupReport, DigitGrid, Direction, Mdn2d, Mdn2dBuilder, PrecisionStatus,
    };
    pub use crate::interfaces::{
        Framework, LoggingObserver, NoOpObserver, Observer, ObserverEvent, StandaloneFramework,
    };
    pub use crate::io::{Format, TextFormat, TextOptions};
    pub use crate::numeric::{Digit, MdnError, MdnResult};
}
