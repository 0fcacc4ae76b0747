// ============================================================================
// Grid Coordinate
// Integer 2D point addressing one digit of a multi-dimensional number
// ============================================================================

use std::fmt;
use std::ops::{Add, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point on the digit grid.
///
/// Ordering is by `x` first, then `y`, so a sorted set of coordinates walks
/// the grid column by column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// The origin, where the units digit lives.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn y(self) -> i32 {
        self.y
    }

    /// Offset by `(dx, dy)`, or `None` if either component overflows.
    #[inline]
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Offset by `(dx, dy)`, saturating at the grid edges.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// The `+x` carry neighbour.
    #[inline]
    pub fn next_x(self) -> Self {
        self.offset(1, 0)
    }

    /// The `+y` carry neighbour.
    #[inline]
    pub fn next_y(self) -> Self {
        self.offset(0, 1)
    }

    /// The coordinate whose `+x` neighbour is `self`.
    #[inline]
    pub fn prev_x(self) -> Self {
        self.offset(-1, 0)
    }

    /// The coordinate whose `+y` neighbour is `self`.
    #[inline]
    pub fn prev_y(self) -> Self {
        self.offset(0, -1)
    }

    /// Swap the components.
    #[inline]
    pub const fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }

    /// Diagonal index `x + y`; carries always move to a higher diagonal.
    #[inline]
    pub fn diagonal(self) -> i64 {
        self.x as i64 + self.y as i64
    }
}

impl From<(i32, i32)> for Coord {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Coord> for (i32, i32) {
    #[inline]
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

impl Add for Coord {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.offset(rhs.x, rhs.y)
    }
}

impl Sub for Coord {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl Neg for Coord {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_x_then_y() {
        let mut coords = vec![Coord::new(1, 0), Coord::new(0, 5), Coord::new(0, -1)];
        coords.sort();
        assert_eq!(
            coords,
            vec![Coord::new(0, -1), Coord::new(0, 5), Coord::new(1, 0)]
        );
    }

    #[test]
    fn test_neighbours() {
        let c = Coord::new(3, -2);
        assert_eq!(c.next_x(), Coord::new(4, -2));
        assert_eq!(c.next_y(), Coord::new(3, -1));
        assert_eq!(c.next_x().prev_x(), c);
        assert_eq!(c.next_y().prev_y(), c);
        assert_eq!(c.diagonal(), 1);
    }

    #[test]
    fn test_checked_offset_overflow() {
        assert_eq!(Coord::new(i32::MAX, 0).checked_offset(1, 0), None);
        assert_eq!(
            Coord::new(1, 1).checked_offset(-2, 3),
            Some(Coord::new(-1, 4))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Coord::new(-4, 7).to_string(), "(-4, 7)");
    }
}
