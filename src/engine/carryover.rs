// ============================================================================
// Carryover Rules
// Classification and resolution of carries, polymorphism, bulk remaps
// ============================================================================
//
// A digit `d` at `(x, y)` stands for `d * X^x * Y^y` with `X + Y = base`.
// A carry therefore turns `base` units at a point into one unit at each of
// the `+x` and `+y` neighbours without changing the value.
// ============================================================================

use super::arithmetic::carry_targets;
use super::store::DigitGrid;
use crate::domain::{Coord, Mdn2dConfig, Mdn2dConfigImpact, SignConvention};
use crate::numeric::{Digit, MdnError, MdnResult};
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// Coordinates written by one carry: the pivot and its two neighbours
pub type Touched = SmallVec<[Coord; 3]>;

/// What a pivot digit and its `+x`/`+y` neighbours call for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarryoverType {
    /// No carry applies
    Invalid,
    /// Positive pivot that may carry, turning itself negative
    OptionalPositive,
    /// Negative pivot that may carry, turning itself positive
    OptionalNegative,
    /// Out of range, or both neighbours oppose the pivot's sign
    Required,
}

impl CarryoverType {
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            CarryoverType::OptionalPositive | CarryoverType::OptionalNegative
        )
    }
}

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Breadth-first waves run
    pub iterations: usize,
    /// Individual carries performed
    pub carries: usize,
    /// The wave cap stopped the pass with work remaining
    pub capped: bool,
}

impl CleanupReport {
    pub fn merge(&mut self, other: CleanupReport) {
        self.iterations += other.iterations;
        self.carries += other.carries;
        self.capped |= other.capped;
    }
}

impl DigitGrid {
    /// Classify the carry condition at `xy`.
    pub fn check_carryover(&self, xy: Coord) -> CarryoverType {
        let p = self.get_value(xy) as i64;
        if p.unsigned_abs() >= self.base() as u64 {
            return CarryoverType::Required;
        }
        if p == 0 {
            return CarryoverType::Invalid;
        }

        let nx = self.get_value(xy.next_x()) as i64;
        let ny = self.get_value(xy.next_y()) as i64;
        let opposes = |n: i64| n != 0 && n.signum() != p.signum();
        let optional = if p > 0 {
            CarryoverType::OptionalPositive
        } else {
            CarryoverType::OptionalNegative
        };

        match (opposes(nx), opposes(ny)) {
            (true, true) => CarryoverType::Required,
            (true, false) if ny == 0 => optional,
            (false, true) if nx == 0 => optional,
            _ => CarryoverType::Invalid,
        }
    }

    /// Carry at `xy` after adding `carry` to the pivot.
    ///
    /// The remainder stays at `xy` and the quotient goes to both
    /// neighbours. An in-range non-zero total still carries one unit, which
    /// flips the pivot to its other polymorphic form.
    pub fn carryover(&mut self, xy: Coord, carry: Digit) -> MdnResult<Touched> {
        let b = self.base() as i64;
        let total = self.get_value(xy) as i64 + carry as i64;
        let mut q = total / b;
        let mut r = total % b;
        if q == 0 && r != 0 {
            q = r.signum();
            r -= q * b;
        }

        let pivot = to_digit(r, xy)?;
        let mut writes: SmallVec<[(Coord, Digit); 3]> = SmallVec::new();
        writes.push((xy, pivot));
        if q != 0 {
            for n in carry_targets(xy)? {
                let sum = self.get_value(n) as i64 + q;
                writes.push((n, to_digit(sum, n)?));
            }
        }

        let mut touched = Touched::new();
        for (at, d) in writes {
            self.set_digit(at, d);
            touched.push(at);
        }
        Ok(touched)
    }

    fn should_resolve(&self, kind: CarryoverType) -> bool {
        match kind {
            CarryoverType::Required => true,
            CarryoverType::OptionalNegative => {
                self.config.sign_convention == SignConvention::Positive
            },
            CarryoverType::OptionalPositive => {
                self.config.sign_convention == SignConvention::Negative
            },
            CarryoverType::Invalid => false,
        }
    }

    /// Resolve carries reachable from `coords` until nothing is left to do.
    pub fn carryover_cleanup<I>(&mut self, coords: I) -> MdnResult<CleanupReport>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut frontier = BTreeSet::new();
        for xy in coords {
            frontier.insert(xy);
            frontier.insert(xy.prev_x());
            frontier.insert(xy.prev_y());
        }
        self.run_cleanup(frontier)
    }

    /// Resolve carries across the whole grid.
    pub fn carryover_cleanup_all(&mut self) -> MdnResult<CleanupReport> {
        let frontier: BTreeSet<Coord> = self.iter().map(|(xy, _)| xy).collect();
        self.run_cleanup(frontier)
    }

    // Every coordinate whose classification may have changed is in the
    // frontier: a write at `c` affects `c` and its two predecessors.
    fn run_cleanup(&mut self, mut frontier: BTreeSet<Coord>) -> MdnResult<CleanupReport> {
        let cap = self.config.max_carryover_iters;
        let mut report = CleanupReport::default();

        while !frontier.is_empty() {
            if report.iterations >= cap {
                report.capped = true;
                tracing::warn!(
                    waves = report.iterations,
                    pending = frontier.len(),
                    "carryover cleanup hit its iteration cap"
                );
                break;
            }
            report.iterations += 1;

            let mut next = BTreeSet::new();
            for xy in frontier {
                if !self.should_resolve(self.check_carryover(xy)) {
                    continue;
                }
                for t in self.carryover(xy, 0)? {
                    next.insert(t);
                    next.insert(t.prev_x());
                    next.insert(t.prev_y());
                }
                report.carries += 1;
            }
            frontier = next;
        }

        tracing::trace!(
            waves = report.iterations,
            carries = report.carries,
            "carryover cleanup finished"
        );
        Ok(report)
    }

    /// Every point where an optional carry is available.
    pub fn polymorphic_nodes(&self) -> Vec<(Coord, CarryoverType)> {
        self.iter()
            .map(|(xy, _)| (xy, self.check_carryover(xy)))
            .filter(|(_, kind)| kind.is_optional())
            .collect()
    }

    // ========================================================================
    // Bulk Remaps
    // ========================================================================

    /// Move every digit by `(dx, dy)`.
    pub fn shift(&mut self, dx: i32, dy: i32) -> MdnResult<()> {
        if (dx, dy) == (0, 0) || self.is_empty() {
            return Ok(());
        }
        let b = self.bounds();
        if b.min().checked_offset(dx, dy).is_none() || b.max().checked_offset(dx, dy).is_none()
        {
            return Err(MdnError::InvalidArgument(format!(
                "shift by ({dx}, {dy}) moves {b} off the grid"
            )));
        }
        self.remap(|xy| xy.offset(dx, dy))
    }

    /// Swap the roles of the two axes.
    pub fn transpose(&mut self) -> MdnResult<()> {
        self.remap(Coord::transposed)
    }

    /// Apply `next`, performing what its impact implies.
    pub fn reconfigure(&mut self, next: Mdn2dConfig) -> MdnResult<Mdn2dConfigImpact> {
        next.validate()?;
        let impact = self.config.assess_change(&next, !self.is_empty());
        let previous = std::mem::replace(&mut self.config, next);
        self.touch();

        if previous.base != self.config.base {
            tracing::debug!(from = previous.base, to = self.config.base, "base changed; digits cleared");
            self.clear();
            return Ok(impact);
        }
        if self.config.precision < previous.precision {
            self.purge_outside_window();
        }
        if self.config.sign_convention != previous.sign_convention {
            self.carryover_cleanup_all()?;
        }
        tracing::debug!(%impact, "config applied");
        Ok(impact)
    }
}

fn to_digit(value: i64, at: Coord) -> MdnResult<Digit> {
    Digit::try_from(value)
        .map_err(|_| MdnError::InvalidState(format!("digit overflow at {at}: {value}")))
}
