// ============================================================================
// Sparse Digit Store
// Coordinate -> digit map with row/column indices and cached bounds
// ============================================================================
//
// # Invariants
//
// - `raw` never holds a zero digit
// - `index`, `x_index` and `y_index` mirror the keys of `raw` exactly;
//   empty buckets are removed
// - `bounds` is valid iff `raw` is non-empty and is exactly the extent of
//   the occupied coordinates
// - Outside a carry resolution every digit satisfies `|d| < base`
//
// The store never locks. `Mdn2d` owns one behind its `TrackedLock` and
// borrows it for the duration of each public call.
// ============================================================================

use crate::domain::{Coord, Mdn2dConfig, Rect};
use crate::numeric::{Digit, MdnError, MdnResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

/// Upper bound on cells visited by a single `jump` walk
pub const MAX_JUMP_STEPS: usize = 1 << 16;

// Mutation stamps are unique across all grids, so a stamp identifies
// content: two grids share one only when one is an untouched clone of the
// other.
static NEXT_EVENT: AtomicU64 = AtomicU64::new(1);

fn next_event() -> u64 {
    NEXT_EVENT.fetch_add(1, Ordering::Relaxed)
}

/// Position of a coordinate relative to the precision window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecisionStatus {
    /// Too far below the current maximum; writes are dropped
    Below,
    Inside,
    /// Beyond the current minimum; writes purge the opposite extreme
    Above,
}

/// Cursor movement for `jump`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward +y
    Up,
    /// Toward -y
    Down,
    /// Toward -x
    Left,
    /// Toward +x
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Sparse digit storage for one multi-dimensional number
#[derive(Debug, Clone)]
pub struct DigitGrid {
    pub(crate) config: Mdn2dConfig,
    raw: HashMap<Coord, Digit>,
    index: BTreeSet<Coord>,
    x_index: BTreeMap<i32, BTreeSet<Coord>>,
    y_index: BTreeMap<i32, BTreeSet<Coord>>,
    bounds: Rect,
    event: u64,
}

impl DigitGrid {
    /// Create an empty grid; the config is validated.
    pub fn new(config: Mdn2dConfig) -> MdnResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            raw: HashMap::new(),
            index: BTreeSet::new(),
            x_index: BTreeMap::new(),
            y_index: BTreeMap::new(),
            bounds: Rect::INVALID,
            event: next_event(),
        })
    }

    pub fn config(&self) -> &Mdn2dConfig {
        &self.config
    }

    pub fn base(&self) -> u32 {
        self.config.base
    }

    /// Mutation stamp; changes on every modification.
    pub fn event(&self) -> u64 {
        self.event
    }

    pub(crate) fn touch(&mut self) {
        self.event = next_event();
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn has_bounds(&self) -> bool {
        self.bounds.is_valid()
    }

    /// Extent of the occupied coordinates; `Rect::INVALID` when empty
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The raw digit map
    pub fn digits(&self) -> &HashMap<Coord, Digit> {
        &self.raw
    }

    /// Occupied coordinates with their digits, ordered by `x` then `y`
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Digit)> + '_ {
        self.index
            .iter()
            .map(move |xy| (*xy, self.raw.get(xy).copied().unwrap_or(0)))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get_value(&self, xy: Coord) -> Digit {
        self.raw.get(&xy).copied().unwrap_or(0)
    }

    /// Digits at `coords`, in input order
    pub fn get_values(&self, coords: &[Coord]) -> Vec<Digit> {
        coords.iter().map(|xy| self.get_value(*xy)).collect()
    }

    /// Rows of `rect` (`y` ascending), each `x` ascending
    pub fn get_rect_values(&self, rect: &Rect) -> Vec<Vec<Digit>> {
        if !rect.is_valid() {
            return Vec::new();
        }
        (rect.min().y..=rect.max().y)
            .map(|y| self.get_row_range(y, rect.min().x, rect.max().x))
            .collect()
    }

    /// Row `y` across the horizontal extent of the bounds
    pub fn get_row(&self, y: i32) -> Vec<Digit> {
        if !self.has_bounds() {
            return Vec::new();
        }
        self.get_row_range(y, self.bounds.min().x, self.bounds.max().x)
    }

    /// Column `x` across the vertical extent of the bounds
    pub fn get_col(&self, x: i32) -> Vec<Digit> {
        if !self.has_bounds() {
            return Vec::new();
        }
        self.get_col_range(x, self.bounds.min().y, self.bounds.max().y)
    }

    /// Row `y` for `x` in `x0..=x1`
    pub fn get_row_range(&self, y: i32, x0: i32, x1: i32) -> Vec<Digit> {
        if x0 > x1 {
            return Vec::new();
        }
        let mut row = vec![0; (x1 as i64 - x0 as i64 + 1) as usize];
        if let Some(bucket) = self.y_index.get(&y) {
            for xy in bucket.range(Coord::new(x0, y)..=Coord::new(x1, y)) {
                row[(xy.x as i64 - x0 as i64) as usize] = self.get_value(*xy);
            }
        }
        row
    }

    /// Column `x` for `y` in `y0..=y1`
    pub fn get_col_range(&self, x: i32, y0: i32, y1: i32) -> Vec<Digit> {
        if y0 > y1 {
            return Vec::new();
        }
        let mut col = vec![0; (y1 as i64 - y0 as i64 + 1) as usize];
        if let Some(bucket) = self.x_index.get(&x) {
            for xy in bucket.range(Coord::new(x, y0)..=Coord::new(x, y1)) {
                col[(xy.y as i64 - y0 as i64) as usize] = self.get_value(*xy);
            }
        }
        col
    }

    /// Occupied coordinates inside `rect`
    pub fn get_non_zeroes(&self, rect: &Rect) -> BTreeSet<Coord> {
        if !rect.is_valid() {
            return BTreeSet::new();
        }
        let (lo, hi) = (rect.min(), rect.max());
        self.y_index
            .range(lo.y..=hi.y)
            .flat_map(|(y, bucket)| bucket.range(Coord::new(lo.x, *y)..=Coord::new(hi.x, *y)))
            .copied()
            .collect()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Set one digit. Zero clears the coordinate.
    ///
    /// Returns whether a carryover-relevant transition happened
    /// (zero/non-zero or a sign flip).
    pub fn set_value(&mut self, xy: Coord, digit: Digit) -> MdnResult<bool> {
        self.check_digit(xy, digit as i64)?;
        Ok(self.set_digit(xy, digit))
    }

    /// Set many digits; all are range-checked before any is written.
    pub fn set_values<I>(&mut self, values: I) -> MdnResult<bool>
    where
        I: IntoIterator<Item = (Coord, Digit)>,
    {
        let values: Vec<(Coord, Digit)> = values.into_iter().collect();
        for (xy, d) in &values {
            self.check_digit(*xy, *d as i64)?;
        }
        let mut changed = false;
        for (xy, d) in values {
            changed |= self.set_digit(xy, d);
        }
        Ok(changed)
    }

    /// Set every coordinate of `rect` to `digit`
    pub fn fill_rect(&mut self, rect: &Rect, digit: Digit) -> MdnResult<()> {
        if !rect.is_valid() {
            return Ok(());
        }
        if digit == 0 {
            self.set_rect_to_zero(rect);
            return Ok(());
        }
        self.check_digit(rect.min(), digit as i64)?;
        for xy in rect.iter() {
            self.set_digit(xy, digit);
        }
        Ok(())
    }

    fn check_digit(&self, at: Coord, digit: i64) -> MdnResult<()> {
        if digit.unsigned_abs() >= self.config.base as u64 {
            return Err(MdnError::OutOfRange {
                at,
                digit,
                base: self.config.base,
            });
        }
        Ok(())
    }

    /// Write a digit of any magnitude, applying the precision window.
    ///
    /// Carry resolution uses this directly; digits may transiently reach
    /// or exceed the base.
    pub(crate) fn set_digit(&mut self, xy: Coord, digit: Digit) -> bool {
        if digit == 0 {
            return self.set_to_zero(xy);
        }
        match self.check_precision_window(xy) {
            PrecisionStatus::Below => {
                tracing::trace!(%xy, digit, "write below precision window dropped");
                self.set_to_zero(xy)
            },
            PrecisionStatus::Inside => self.store(xy, digit),
            PrecisionStatus::Above => {
                let changed = self.store(xy, digit);
                self.purge_outside_window();
                changed
            },
        }
    }

    fn store(&mut self, xy: Coord, digit: Digit) -> bool {
        self.touch();
        match self.raw.insert(xy, digit) {
            Some(old) => old.signum() != digit.signum(),
            None => {
                self.index.insert(xy);
                self.x_index.entry(xy.x).or_default().insert(xy);
                self.y_index.entry(xy.y).or_default().insert(xy);
                self.bounds.grow_to_include(xy);
                true
            },
        }
    }

    /// Insert without the precision window or index maintenance; callers
    /// must follow with `rebuild_metadata`.
    pub(crate) fn insert_raw(&mut self, xy: Coord, digit: Digit) {
        self.raw.insert(xy, digit);
    }

    /// Move every digit to `f(xy)`; `f` must be injective.
    pub(crate) fn remap(&mut self, f: impl Fn(Coord) -> Coord) -> MdnResult<()> {
        let old = std::mem::take(&mut self.raw);
        self.raw = old.into_iter().map(|(xy, d)| (f(xy), d)).collect();
        self.rebuild_metadata()
    }

    /// Flip the sign of every digit in place.
    pub(crate) fn negate_digits(&mut self) {
        for d in self.raw.values_mut() {
            *d = -*d;
        }
        self.touch();
    }

    /// Clear one coordinate. Returns whether a digit was removed.
    pub fn set_to_zero(&mut self, xy: Coord) -> bool {
        if self.raw.remove(&xy).is_none() {
            return false;
        }
        self.touch();
        self.index.remove(&xy);
        let mut bucket_dropped = remove_from_bucket(&mut self.x_index, xy.x, xy);
        bucket_dropped |= remove_from_bucket(&mut self.y_index, xy.y, xy);
        if bucket_dropped {
            self.recompute_bounds();
        }
        true
    }

    /// Clear every listed coordinate; returns how many digits were removed.
    pub fn set_coords_to_zero<I>(&mut self, coords: I) -> usize
    where
        I: IntoIterator<Item = Coord>,
    {
        coords
            .into_iter()
            .filter(|xy| self.set_to_zero(*xy))
            .count()
    }

    /// Clear the occupied coordinates of `rect`
    pub fn set_rect_to_zero(&mut self, rect: &Rect) -> usize {
        let occupied = self.get_non_zeroes(rect);
        self.set_coords_to_zero(occupied)
    }

    /// Remove every digit; the config is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.index.clear();
        self.x_index.clear();
        self.y_index.clear();
        self.bounds = Rect::INVALID;
        self.touch();
    }

    fn recompute_bounds(&mut self) {
        let xs = (self.x_index.keys().next(), self.x_index.keys().next_back());
        let ys = (self.y_index.keys().next(), self.y_index.keys().next_back());
        self.bounds = match (xs, ys) {
            ((Some(x0), Some(x1)), (Some(y0), Some(y1))) => {
                Rect::from_extremes(Coord::new(*x0, *y0), Coord::new(*x1, *y1))
            },
            _ => Rect::INVALID,
        };
    }

    // ========================================================================
    // Precision Window
    // ========================================================================

    /// Classify `xy` against the window of `precision` digits around the
    /// current bounds. An empty grid accepts everything.
    pub fn check_precision_window(&self, xy: Coord) -> PrecisionStatus {
        if !self.has_bounds() {
            return PrecisionStatus::Inside;
        }
        let p = self.config.precision as i64;
        let (lo, hi) = (self.bounds.min(), self.bounds.max());
        if (xy.x as i64) <= hi.x as i64 - p || (xy.y as i64) <= hi.y as i64 - p {
            PrecisionStatus::Below
        } else if (xy.x as i64) >= lo.x as i64 + p || (xy.y as i64) >= lo.y as i64 + p {
            PrecisionStatus::Above
        } else {
            PrecisionStatus::Inside
        }
    }

    /// Drop every digit that has fallen out of the window below the
    /// current maximum. Returns the number of digits removed.
    #[tracing::instrument(level = "trace", skip(self), fields(base = self.config.base))]
    pub fn purge_outside_window(&mut self) -> usize {
        if !self.has_bounds() {
            return 0;
        }
        let p = self.config.precision as i64;
        let hi = self.bounds.max();
        let mut doomed = BTreeSet::new();
        if let Some(cut) = window_cut(hi.x, p) {
            for bucket in self.x_index.range(..=cut).map(|(_, b)| b) {
                doomed.extend(bucket.iter().copied());
            }
        }
        if let Some(cut) = window_cut(hi.y, p) {
            for bucket in self.y_index.range(..=cut).map(|(_, b)| b) {
                doomed.extend(bucket.iter().copied());
            }
        }
        let removed = self.set_coords_to_zero(doomed);
        if removed > 0 {
            tracing::debug!(removed, precision = p, "purged digits outside precision window");
        }
        removed
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Rebuild indices and bounds from the raw map.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn rebuild_metadata(&mut self) -> MdnResult<()> {
        if let Some((xy, _)) = self.raw.iter().find(|(_, d)| **d == 0) {
            return Err(MdnError::ZeroEncountered(*xy));
        }
        self.index.clear();
        self.x_index.clear();
        self.y_index.clear();
        self.bounds = Rect::INVALID;
        for xy in self.raw.keys() {
            self.index.insert(*xy);
            self.x_index.entry(xy.x).or_default().insert(*xy);
            self.y_index.entry(xy.y).or_default().insert(*xy);
            self.bounds.grow_to_include(*xy);
        }
        self.touch();
        Ok(())
    }

    /// Check that indices and bounds agree with the raw map.
    pub fn validate_metadata(&self) -> MdnResult<()> {
        if let Some((xy, _)) = self.raw.iter().find(|(_, d)| **d == 0) {
            return Err(MdnError::ZeroEncountered(*xy));
        }
        if self.index.len() != self.raw.len() || self.index.iter().any(|xy| !self.raw.contains_key(xy))
        {
            return Err(MdnError::MetaDataInvalid(
                "full index disagrees with digit map".to_string(),
            ));
        }
        check_axis_index(&self.x_index, self.raw.len(), "column", |xy| xy.x)?;
        check_axis_index(&self.y_index, self.raw.len(), "row", |xy| xy.y)?;

        let mut expected = Rect::INVALID;
        for xy in &self.index {
            expected.grow_to_include(*xy);
        }
        if expected != self.bounds {
            return Err(MdnError::MetaDataInvalid(format!(
                "cached bounds {} but digits span {}",
                self.bounds, expected
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Spreadsheet-style cursor movement from `xy`.
    ///
    /// Inside an occupied run, move to the run's last cell; otherwise move
    /// to the next occupied cell ahead. With nothing ahead, stop at the
    /// axis line or the bounds edge if either lies ahead.
    pub fn jump(&self, xy: Coord, direction: Direction) -> Coord {
        let (dx, dy) = direction.delta();
        let step = |c: Coord| c.checked_offset(dx, dy);

        if self.raw.contains_key(&xy) {
            if let Some(next) = step(xy).filter(|n| self.raw.contains_key(n)) {
                let mut last = next;
                for _ in 0..MAX_JUMP_STEPS {
                    match step(last) {
                        Some(n) if self.raw.contains_key(&n) => last = n,
                        _ => break,
                    }
                }
                return last;
            }
        }

        if let Some(found) = self.next_occupied(xy, direction) {
            return found;
        }

        let (pos, axis, edge) = match direction {
            Direction::Right => (xy.x, 0, self.has_bounds().then(|| self.bounds.max().x)),
            Direction::Left => (xy.x, 0, self.has_bounds().then(|| self.bounds.min().x)),
            Direction::Up => (xy.y, 0, self.has_bounds().then(|| self.bounds.max().y)),
            Direction::Down => (xy.y, 0, self.has_bounds().then(|| self.bounds.min().y)),
        };
        let ahead = |target: i32| match direction {
            Direction::Right | Direction::Up => target > pos,
            Direction::Left | Direction::Down => target < pos,
        };
        let target = if ahead(axis) {
            Some(axis)
        } else {
            edge.filter(|e| ahead(*e))
        };
        match (target, direction) {
            (Some(x), Direction::Left | Direction::Right) => Coord::new(x, xy.y),
            (Some(y), Direction::Up | Direction::Down) => Coord::new(xy.x, y),
            (None, _) => xy,
        }
    }

    fn next_occupied(&self, xy: Coord, direction: Direction) -> Option<Coord> {
        match direction {
            Direction::Right => self
                .y_index
                .get(&xy.y)?
                .range(xy.next_x()..)
                .find(|c| c.x > xy.x)
                .copied(),
            Direction::Left => self
                .y_index
                .get(&xy.y)?
                .range(..xy)
                .next_back()
                .copied(),
            Direction::Up => self
                .x_index
                .get(&xy.x)?
                .range(xy.next_y()..)
                .find(|c| c.y > xy.y)
                .copied(),
            Direction::Down => self
                .x_index
                .get(&xy.x)?
                .range(..xy)
                .next_back()
                .copied(),
        }
    }
}

impl Default for DigitGrid {
    fn default() -> Self {
        Self {
            config: Mdn2dConfig::default(),
            raw: HashMap::new(),
            index: BTreeSet::new(),
            x_index: BTreeMap::new(),
            y_index: BTreeMap::new(),
            bounds: Rect::INVALID,
            event: next_event(),
        }
    }
}

fn remove_from_bucket(index: &mut BTreeMap<i32, BTreeSet<Coord>>, key: i32, xy: Coord) -> bool {
    if let Some(bucket) = index.get_mut(&key) {
        bucket.remove(&xy);
        if bucket.is_empty() {
            index.remove(&key);
            return true;
        }
    }
    false
}

/// Highest coordinate still outside a window of `p` ending at `hi`
fn window_cut(hi: i32, p: i64) -> Option<i32> {
    i32::try_from(hi as i64 - p).ok()
}

fn check_axis_index(
    index: &BTreeMap<i32, BTreeSet<Coord>>,
    expected_len: usize,
    what: &str,
    key_of: impl Fn(&Coord) -> i32,
) -> MdnResult<()> {
    let mut total = 0;
    for (key, bucket) in index {
        if bucket.is_empty() {
            return Err(MdnError::MetaDataInvalid(format!(
                "empty {what} bucket at {key}"
            )));
        }
        if let Some(stray) = bucket.iter().find(|xy| key_of(xy) != *key) {
            return Err(MdnError::MetaDataInvalid(format!(
                "{what} bucket {key} holds {stray}"
            )));
        }
        total += bucket.len();
    }
    if total != expected_len {
        return Err(MdnError::MetaDataInvalid(format!(
            "{what} index holds {total} coordinates, digit map {expected_len}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> DigitGrid {
        DigitGrid::new(Mdn2dConfig::default()).unwrap()
    }

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn test_set_and_get() {
        let mut g = grid();
        assert!(g.set_value(c(1, 2), 5).unwrap());
        assert!(!g.set_value(c(1, 2), 6).unwrap());
        assert!(g.set_value(c(1, 2), -6).unwrap());

        assert_eq!(g.get_value(c(1, 2)), -6);
        assert_eq!(g.get_value(c(0, 0)), 0);
        assert_eq!(g.len(), 1);
        assert_eq!(g.bounds(), Rect::from_point(c(1, 2)));
        g.validate_metadata().unwrap();
    }

    #[test]
    fn test_zero_is_never_stored() {
        let mut g = grid();
        g.set_value(c(0, 0), 3).unwrap();
        assert!(g.set_value(c(0, 0), 0).unwrap());
        assert!(g.is_empty());
        assert!(!g.has_bounds());
        assert!(!g.set_value(c(4, 4), 0).unwrap());
        assert!(g.digits().values().all(|d| *d != 0));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut g = grid();
        let err = g.set_value(c(0, 0), 10).unwrap_err();
        assert!(matches!(err, MdnError::OutOfRange { digit: 10, base: 10, .. }));
        assert!(g.set_values([(c(0, 0), 1), (c(1, 0), -12)]).is_err());
        // atomic: nothing written
        assert!(g.is_empty());
    }

    #[test]
    fn test_bounds_shrink_on_removal() {
        let mut g = grid();
        g.set_values([(c(-2, 0), 1), (c(3, 1), 2), (c(0, 4), 3)])
            .unwrap();
        assert_eq!(g.bounds(), Rect::new(c(-2, 0), c(3, 4)));

        g.set_to_zero(c(3, 1));
        assert_eq!(g.bounds(), Rect::new(c(-2, 0), c(0, 4)));
        g.set_to_zero(c(0, 4));
        assert_eq!(g.bounds(), Rect::from_point(c(-2, 0)));
        g.validate_metadata().unwrap();
    }

    #[test]
    fn test_rect_reads_and_writes() {
        let mut g = grid();
        g.fill_rect(&Rect::new(c(0, 0), c(2, 1)), 4).unwrap();
        assert_eq!(g.len(), 6);
        g.set_value(c(1, 1), -1).unwrap();

        assert_eq!(
            g.get_rect_values(&Rect::new(c(0, 0), c(3, 1))),
            vec![vec![4, 4, 4, 0], vec![4, -1, 4, 0]]
        );
        assert_eq!(g.get_row(1), vec![4, -1, 4]);
        assert_eq!(g.get_col(1), vec![4, -1]);
        assert_eq!(g.get_col_range(2, -1, 2), vec![0, 4, 4, 0]);
        assert_eq!(g.get_values(&[c(1, 1), c(9, 9)]), vec![-1, 0]);

        let inner = g.get_non_zeroes(&Rect::new(c(1, 0), c(5, 5)));
        assert_eq!(inner.len(), 4);

        assert_eq!(g.set_rect_to_zero(&Rect::new(c(0, 0), c(0, 1))), 2);
        assert_eq!(g.bounds(), Rect::new(c(1, 0), c(2, 1)));
        g.validate_metadata().unwrap();
    }

    #[test]
    fn test_precision_window_below_is_dropped() {
        let config = Mdn2dConfig::default().with_precision(4);
        let mut g = DigitGrid::new(config).unwrap();
        g.set_value(c(0, 0), 1).unwrap();

        assert_eq!(g.check_precision_window(c(-4, 0)), PrecisionStatus::Below);
        assert_eq!(g.check_precision_window(c(-3, 0)), PrecisionStatus::Inside);
        g.set_value(c(-4, 0), 7).unwrap();
        assert_eq!(g.get_value(c(-4, 0)), 0);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_precision_window_above_purges() {
        let config = Mdn2dConfig::default().with_precision(4);
        let mut g = DigitGrid::new(config).unwrap();
        g.set_values([(c(0, 0), 1), (c(1, 0), 2), (c(2, 0), 3)])
            .unwrap();

        assert_eq!(g.check_precision_window(c(4, 0)), PrecisionStatus::Above);
        g.set_value(c(5, 0), 9).unwrap();
        // x <= 5 - 4 is purged
        assert_eq!(g.get_value(c(0, 0)), 0);
        assert_eq!(g.get_value(c(1, 0)), 0);
        assert_eq!(g.get_value(c(2, 0)), 3);
        assert_eq!(g.get_value(c(5, 0)), 9);
        g.validate_metadata().unwrap();
    }

    #[test]
    fn test_rebuild_metadata() {
        let mut g = grid();
        g.insert_raw(c(1, 1), 2);
        g.insert_raw(c(-1, 3), 4);
        g.rebuild_metadata().unwrap();
        assert_eq!(g.bounds(), Rect::new(c(-1, 1), c(1, 3)));
        g.validate_metadata().unwrap();

        g.insert_raw(c(0, 0), 0);
        assert!(matches!(
            g.rebuild_metadata(),
            Err(MdnError::ZeroEncountered(at)) if at == c(0, 0)
        ));
    }

    #[test]
    fn test_event_changes_on_mutation() {
        let mut g = grid();
        let before = g.event();
        g.set_value(c(0, 0), 1).unwrap();
        assert_ne!(before, g.event());

        let copy = g.clone();
        assert_eq!(copy.event(), g.event());
    }

    #[test]
    fn test_jump() {
        let mut g = grid();
        g.set_values([(c(1, 0), 1), (c(2, 0), 1), (c(3, 0), 1), (c(7, 0), 1)])
            .unwrap();

        // run end
        assert_eq!(g.jump(c(1, 0), Direction::Right), c(3, 0));
        // next occupied
        assert_eq!(g.jump(c(3, 0), Direction::Right), c(7, 0));
        // nothing ahead, already past the axis and at the edge
        assert_eq!(g.jump(c(7, 0), Direction::Right), c(7, 0));
        // empty start, nothing ahead: axis line
        assert_eq!(g.jump(c(-5, 0), Direction::Left), c(-5, 0));
        assert_eq!(g.jump(c(-5, 3), Direction::Right), c(0, 3));
        // empty row beyond the axis: bounds edge
        assert_eq!(g.jump(c(2, 3), Direction::Right), c(7, 3));
        assert_eq!(g.jump(c(3, 0), Direction::Left), c(1, 0));
        assert_eq!(g.jump(c(1, 5), Direction::Down), c(1, 0));
    }
}
