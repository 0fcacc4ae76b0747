// ============================================================================
// Grid Rectangle
// Inclusive axis-aligned bounding box with an explicit empty state
// ============================================================================

use super::coord::Coord;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` box on the digit grid.
///
/// The empty ("invalid") rect is encoded with sentinel extremes:
/// `min = (i32::MAX, i32::MAX)` and `max = (i32::MIN, i32::MIN)`. Growing an
/// invalid rect by a point therefore yields the single-point rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    min: Coord,
    max: Coord,
}

impl Rect {
    /// The empty rect.
    pub const INVALID: Self = Self {
        min: Coord::new(i32::MAX, i32::MAX),
        max: Coord::new(i32::MIN, i32::MIN),
    };

    /// Rect spanning two corners, in any order.
    pub fn new(a: Coord, b: Coord) -> Self {
        Self {
            min: Coord::new(a.x.min(b.x), a.y.min(b.y)),
            max: Coord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rect from raw extremes, without reordering.
    ///
    /// Produces an invalid rect when `min` exceeds `max` on either axis.
    pub const fn from_extremes(min: Coord, max: Coord) -> Self {
        Self { min, max }
    }

    pub const fn invalid() -> Self {
        Self::INVALID
    }

    pub const fn from_point(p: Coord) -> Self {
        Self { min: p, max: p }
    }

    #[inline]
    pub const fn min(&self) -> Coord {
        self.min
    }

    #[inline]
    pub const fn max(&self) -> Coord {
        self.max
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Number of columns (0 when invalid).
    pub fn width(&self) -> u64 {
        if self.is_valid() {
            (self.max.x as i64 - self.min.x as i64 + 1) as u64
        } else {
            0
        }
    }

    /// Number of rows (0 when invalid).
    pub fn height(&self) -> u64 {
        if self.is_valid() {
            (self.max.y as i64 - self.min.y as i64 + 1) as u64
        } else {
            0
        }
    }

    pub fn area(&self) -> u128 {
        self.width() as u128 * self.height() as u128
    }

    pub fn contains(&self, p: Coord) -> bool {
        self.is_valid()
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_valid() && self.contains(other.min) && self.contains(other.max)
    }

    /// Extend the rect so that it covers `p`.
    pub fn grow_to_include(&mut self, p: Coord) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Smallest rect covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => Rect::INVALID,
            (true, false) => *self,
            (false, true) => *other,
            (true, true) => Rect {
                min: Coord::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
                max: Coord::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
            },
        }
    }

    /// Overlap of both; invalid when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Rect {
        if !self.is_valid() || !other.is_valid() {
            return Rect::INVALID;
        }
        let r = Rect {
            min: Coord::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Coord::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_valid() {
            r
        } else {
            Rect::INVALID
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_valid()
    }

    /// True when the rects share an edge segment without overlapping.
    pub fn is_adjacent(&self, other: &Rect) -> bool {
        if !self.is_valid() || !other.is_valid() || self.intersects(other) {
            return false;
        }
        let rows_overlap = self.min.y <= other.max.y && other.min.y <= self.max.y;
        let cols_overlap = self.min.x <= other.max.x && other.min.x <= self.max.x;
        let touch_x = self.max.x as i64 + 1 == other.min.x as i64
            || other.max.x as i64 + 1 == self.min.x as i64;
        let touch_y = self.max.y as i64 + 1 == other.min.y as i64
            || other.max.y as i64 + 1 == self.min.y as i64;
        (touch_x && rows_overlap) || (touch_y && cols_overlap)
    }

    /// Shift the rect by `(dx, dy)`; invalid rects stay invalid.
    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        if !self.is_valid() {
            return Rect::INVALID;
        }
        Rect {
            min: self.min.offset(dx, dy),
            max: self.max.offset(dx, dy),
        }
    }

    /// Swap the axes.
    pub fn transposed(&self) -> Rect {
        if !self.is_valid() {
            return Rect::INVALID;
        }
        Rect {
            min: self.min.transposed(),
            max: self.max.transposed(),
        }
    }

    /// Every contained coordinate, `y` ascending then `x` ascending.
    pub fn iter(&self) -> RectIter {
        RectIter {
            rect: *self,
            next: if self.is_valid() { Some(self.min) } else { None },
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "[{} .. {}]", self.min, self.max)
        } else {
            write!(f, "[invalid]")
        }
    }
}

/// Row-major iterator over a [`Rect`].
#[derive(Debug, Clone)]
pub struct RectIter {
    rect: Rect,
    next: Option<Coord>,
}

impl Iterator for RectIter {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let current = self.next?;
        self.next = if current.x < self.rect.max.x {
            Some(Coord::new(current.x + 1, current.y))
        } else if current.y < self.rect.max.y {
            Some(Coord::new(self.rect.min.x, current.y + 1))
        } else {
            None
        };
        Some(current)
    }
}

impl IntoIterator for &Rect {
    type Item = Coord;
    type IntoIter = RectIter;

    fn into_iter(self) -> RectIter {
        self.iter()
    }
}
