// ============================================================================
// Division
// Iterative principal-line division on the digit grid
// ============================================================================
//
// # Algorithm
//
// There is no closed-form long division on a 2D grid. Instead:
//
// 1. Collapse each row (fraxis X) or column (fraxis Y) of a grid into its
//    line value `sum(d * base^pos)`; the line of largest magnitude is the
//    principal line.
// 2. Estimate `remainder principal / divisor principal` and place it into a
//    candidate quotient, offset by the distance between the two lines.
// 3. Recompute `remainder = dividend - candidate * divisor` and keep the
//    step only if the remainder's magnitude (sum of |line value|) strictly
//    decreases.
//
// Steps run in batches of `max_division_iters`. `Fraxis::Default`
// alternates X and Y batches and stops after two consecutive batches
// without improvement.
// ============================================================================

use super::arithmetic::check_same_base;
use super::store::DigitGrid;
use crate::domain::{Coord, Fraxis};
use crate::numeric::{MdnError, MdnResult};
use std::collections::BTreeMap;

/// Returned when the divisor is empty or no step improved the remainder
pub const DIVISION_FAILED: f64 = -1.0;

/// Upper bound on batches per division
pub const MAX_DIVISION_BATCHES: usize = 8;

/// Line values keyed by line index: rows for X, columns for Y
pub fn line_values(grid: &DigitGrid, axis: Fraxis) -> BTreeMap<i32, f64> {
    let b = grid.base() as f64;
    let mut lines = BTreeMap::new();
    for (xy, d) in grid.iter() {
        let (line, pos) = match axis {
            Fraxis::Y => (xy.x, xy.y),
            _ => (xy.y, xy.x),
        };
        *lines.entry(line).or_insert(0.0) += d as f64 * b.powi(pos);
    }
    lines
}

/// The line of largest magnitude; ties go to the lowest line index.
pub fn principal_line(grid: &DigitGrid, axis: Fraxis) -> Option<(i32, f64)> {
    let mut best: Option<(i32, f64)> = None;
    for (line, value) in line_values(grid, axis) {
        if best.is_none_or(|(_, v)| value.abs() > v.abs()) {
            best = Some((line, value));
        }
    }
    best
}

/// Sum of absolute line values
pub fn line_magnitude(grid: &DigitGrid, axis: Fraxis) -> f64 {
    line_values(grid, axis).values().map(|v| v.abs()).sum()
}

impl DigitGrid {
    /// `ans ~= self / rhs`.
    ///
    /// Returns the magnitude of the final remainder: `0.0` for an exact
    /// result, `DIVISION_FAILED` if `rhs` is empty or no step improved.
    pub fn divide(&self, rhs: &DigitGrid, ans: &mut DigitGrid, fraxis: Fraxis) -> MdnResult<f64> {
        let _span =
            tracing::debug_span!("divide", lhs = self.len(), rhs = rhs.len(), ?fraxis).entered();
        check_same_base(self, rhs)?;

        let mut quotient = DigitGrid::new(self.config.clone())?;
        if rhs.is_empty() {
            tracing::warn!("division by an empty number");
            *ans = quotient;
            return Ok(DIVISION_FAILED);
        }
        if self.is_empty() {
            *ans = quotient;
            return Ok(0.0);
        }

        let alternate = fraxis == Fraxis::Default;
        let mut axis = if alternate { Fraxis::X } else { fraxis };
        let mut remainder = self.clone();
        let mut improved_any = false;
        let mut stale = 0;

        for _ in 0..MAX_DIVISION_BATCHES {
            let improved = self.division_batch(rhs, axis, &mut quotient, &mut remainder)?;
            improved_any |= improved;
            if remainder.is_empty() {
                break;
            }
            stale = if improved { 0 } else { stale + 1 };
            if alternate {
                if stale >= 2 {
                    break;
                }
                axis = axis.flipped();
            } else if !improved {
                break;
            }
        }

        *ans = quotient;
        if remainder.is_empty() {
            return Ok(0.0);
        }
        if !improved_any {
            tracing::warn!("division found no improving step");
            return Ok(DIVISION_FAILED);
        }
        let magnitude = line_magnitude(&remainder, fraxis.or(self.config.fraxis));
        tracing::debug!(magnitude, "division stopped with a remainder");
        Ok(magnitude)
    }

    fn division_batch(
        &self,
        rhs: &DigitGrid,
        axis: Fraxis,
        quotient: &mut DigitGrid,
        remainder: &mut DigitGrid,
    ) -> MdnResult<bool> {
        let mut best = line_magnitude(remainder, axis);
        let mut improved = false;

        for step in 0..self.config.max_division_iters {
            let Some((r_line, r_value)) = principal_line(remainder, axis) else {
                break;
            };
            let Some((d_line, d_value)) = principal_line(rhs, axis) else {
                break;
            };
            let estimate = r_value / d_value;
            if !estimate.is_finite() || estimate == 0.0 {
                break;
            }
            let Ok(offset) = i32::try_from(r_line as i64 - d_line as i64) else {
                break;
            };
            let at = match axis {
                Fraxis::Y => Coord::new(offset, 0),
                _ => Coord::new(0, offset),
            };

            let mut trial = quotient.clone();
            let n_digits = self.config.precision as usize;
            if let Err(err) = trial.add_real(at, estimate, n_digits, false, axis) {
                tracing::trace!(%err, estimate, "estimate could not be placed");
                break;
            }
            let (product, _) = trial.product(rhs)?;
            let mut trial_remainder = self.clone();
            trial_remainder.accumulate(&product, -1)?;

            let magnitude = line_magnitude(&trial_remainder, axis);
            if magnitude >= best {
                break;
            }
            tracing::trace!(step, estimate, magnitude, "division step accepted");
            *quotient = trial;
            *remainder = trial_remainder;
            best = magnitude;
            improved = true;
            if remainder.is_empty() {
                break;
            }
        }
        Ok(improved)
    }

    /// Divide in place by an integer.
    pub fn divide_scalar(&mut self, k: i64) -> MdnResult<f64> {
        if k == 0 {
            return Err(MdnError::DivideByZero);
        }
        let mut divisor = DigitGrid::new(self.config.clone())?;
        divisor.add_integer(Coord::ORIGIN, k)?;
        let mut quotient = DigitGrid::new(self.config.clone())?;
        let magnitude = self.divide(&divisor, &mut quotient, Fraxis::Default)?;
        *self = quotient;
        Ok(magnitude)
    }
}
