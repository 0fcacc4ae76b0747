// ============================================================================
// Multi-Dimensional Number
// Shared, lockable number instance over a DigitGrid
// ============================================================================
//
// # Locking
//
// Every public method takes the instance lock exactly once and works on the
// borrowed `DigitGrid`. Operations over several instances lock them in
// instance-id order, so two threads combining the same numbers cannot
// deadlock. Observers are only invoked with no instance lock held.
// ============================================================================

use super::carryover::{CarryoverType, CleanupReport};
use super::store::{DigitGrid, Direction, PrecisionStatus};
use crate::domain::{Coord, Fraxis, Mdn2dConfig, Mdn2dConfigImpact, Rect};
use crate::interfaces::{Framework, Observer, ObserverEvent, ObserverId, ObserverRegistry};
use crate::io::text::{render_pretty, TextOptions};
use crate::numeric::{Digit, MdnError, MdnResult};
use crate::utils::{LockStats, TrackedLock};
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use smallvec::{smallvec, SmallVec};
use std::collections::BTreeSet;
use std::fmt;
use std::ptr;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Optional carry points, shared out of the per-instance cache
pub type PolymorphicNodes = Arc<Vec<(Coord, CarryoverType)>>;

/// Everything guarded by the instance lock
#[derive(Debug, Clone)]
pub(crate) struct Mdn2dState {
    pub(crate) name: String,
    pub(crate) grid: DigitGrid,
}

/// A named multi-dimensional number that can be shared across threads.
///
/// Created through `engine::factory` (`new_instance`, `duplicate`,
/// `Mdn2dBuilder`).
pub struct Mdn2d {
    /// Instance identity, used for lock ordering
    id: Uuid,

    state: TrackedLock<Mdn2dState>,

    /// Naming authority
    framework: Arc<dyn Framework>,

    observers: ObserverRegistry,

    /// Polymorphic nodes, keyed by the grid's mutation stamp
    polymorphism: Mutex<Option<(u64, PolymorphicNodes)>>,
}

#[derive(Clone, Copy)]
enum Role {
    Lhs,
    Rhs,
    Ans,
}

impl Mdn2d {
    /// Wrap a grid; `name` must already be reserved with `framework`.
    pub(crate) fn from_parts(name: String, grid: DigitGrid, framework: Arc<dyn Framework>) -> Self {
        tracing::debug!(%name, base = grid.base(), "number created");
        Self {
            id: Uuid::new_v4(),
            state: TrackedLock::new(Mdn2dState { name, grid }),
            framework,
            observers: ObserverRegistry::new(),
            polymorphism: Mutex::new(None),
        }
    }

    // ========================================================================
    // Lock Helpers
    // ========================================================================

    fn read<R>(&self, f: impl FnOnce(&DigitGrid) -> R) -> R {
        f(&self.state.read().grid)
    }

    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut DigitGrid) -> MdnResult<R>) -> MdnResult<R> {
        let mut state = self.state.write();
        let out = f(&mut state.grid)?;
        debug_validate(&state.grid)?;
        Ok(out)
    }

    fn lock_binary<R>(
        &self,
        rhs: &Mdn2d,
        ans: &Mdn2d,
        op: &'static str,
        f: impl FnOnce(&DigitGrid, &DigitGrid, &mut DigitGrid) -> MdnResult<R>,
    ) -> MdnResult<R> {
        if ptr::eq(self, ans) || ptr::eq(rhs, ans) {
            return Err(MdnError::IllegalSelfReference(op));
        }
        let same = ptr::eq(self, rhs);
        let mut order: SmallVec<[(Uuid, Role); 3]> =
            smallvec![(self.id, Role::Lhs), (ans.id, Role::Ans)];
        if !same {
            order.push((rhs.id, Role::Rhs));
        }
        order.sort_by_key(|(id, _)| *id);

        let (mut lhs_guard, mut rhs_guard, mut ans_guard) = (None, None, None);
        for (_, role) in order {
            match role {
                Role::Lhs => lhs_guard = Some(self.state.read()),
                Role::Rhs => rhs_guard = Some(rhs.state.read()),
                Role::Ans => ans_guard = Some(ans.state.write()),
            }
        }

        let lhs = lhs_guard.as_deref().ok_or_else(missing_guard)?;
        let rhs_state = if same {
            lhs
        } else {
            rhs_guard.as_deref().ok_or_else(missing_guard)?
        };
        let ans_state = ans_guard.as_deref_mut().ok_or_else(missing_guard)?;

        let out = f(&lhs.grid, &rhs_state.grid, &mut ans_state.grid)?;
        debug_validate(&ans_state.grid)?;
        Ok(out)
    }

    fn lock_assign<R>(
        &self,
        rhs: &Mdn2d,
        f: impl FnOnce(&mut DigitGrid, &DigitGrid) -> MdnResult<R>,
    ) -> MdnResult<R> {
        if ptr::eq(self, rhs) {
            let mut state = self.state.write();
            let snapshot = state.grid.clone();
            let out = f(&mut state.grid, &snapshot)?;
            debug_validate(&state.grid)?;
            return Ok(out);
        }

        let mut mine;
        let theirs;
        if self.id < rhs.id {
            mine = self.state.write();
            theirs = rhs.state.read();
        } else {
            theirs = rhs.state.read();
            mine = self.state.write();
        }
        let out = f(&mut mine.grid, &theirs.grid)?;
        debug_validate(&mine.grid)?;
        Ok(out)
    }

    // ========================================================================
    // Identity
    // ========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> String {
        self.state.read().name.clone()
    }

    /// Ask the framework for a new name; returns the name now in use.
    pub fn set_name(&self, name: &str) -> String {
        let mut state = self.state.write();
        let granted = self.framework.request_mdn_name_change(&state.name, name);
        state.name = granted.clone();
        granted
    }

    pub fn framework(&self) -> &Arc<dyn Framework> {
        &self.framework
    }

    pub fn config(&self) -> Mdn2dConfig {
        self.read(|g| g.config().clone())
    }

    pub fn lock_stats(&self) -> LockStats {
        self.state.stats()
    }

    /// Copy of the digit grid
    pub fn snapshot(&self) -> DigitGrid {
        self.read(DigitGrid::clone)
    }

    pub(crate) fn snapshot_state(&self) -> Mdn2dState {
        self.state.read().clone()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get_value(&self, xy: Coord) -> Digit {
        self.read(|g| g.get_value(xy))
    }

    pub fn get_values(&self, coords: &[Coord]) -> Vec<Digit> {
        self.read(|g| g.get_values(coords))
    }

    pub fn get_rect_values(&self, rect: &Rect) -> Vec<Vec<Digit>> {
        self.read(|g| g.get_rect_values(rect))
    }

    pub fn get_row(&self, y: i32) -> Vec<Digit> {
        self.read(|g| g.get_row(y))
    }

    pub fn get_col(&self, x: i32) -> Vec<Digit> {
        self.read(|g| g.get_col(x))
    }

    pub fn get_row_range(&self, y: i32, x0: i32, x1: i32) -> Vec<Digit> {
        self.read(|g| g.get_row_range(y, x0, x1))
    }

    pub fn get_col_range(&self, x: i32, y0: i32, y1: i32) -> Vec<Digit> {
        self.read(|g| g.get_col_range(x, y0, y1))
    }

    pub fn get_non_zeroes(&self, rect: &Rect) -> BTreeSet<Coord> {
        self.read(|g| g.get_non_zeroes(rect))
    }

    pub fn has_bounds(&self) -> bool {
        self.read(DigitGrid::has_bounds)
    }

    pub fn bounds(&self) -> Rect {
        self.read(DigitGrid::bounds)
    }

    pub fn len(&self) -> usize {
        self.read(DigitGrid::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(DigitGrid::is_empty)
    }

    pub fn jump(&self, xy: Coord, direction: Direction) -> Coord {
        self.read(|g| g.jump(xy, direction))
    }

    pub fn check_precision_window(&self, xy: Coord) -> PrecisionStatus {
        self.read(|g| g.check_precision_window(xy))
    }

    pub fn check_carryover(&self, xy: Coord) -> CarryoverType {
        self.read(|g| g.check_carryover(xy))
    }

    /// Optional carry points, recomputed only after a mutation.
    pub fn polymorphic_nodes(&self) -> PolymorphicNodes {
        let state = self.state.read();
        let stamp = state.grid.event();
        let mut cache = self.polymorphism.lock();
        if let Some((cached, nodes)) = cache.as_ref() {
            if *cached == stamp {
                return Arc::clone(nodes);
            }
        }
        let nodes = Arc::new(state.grid.polymorphic_nodes());
        *cache = Some((stamp, Arc::clone(&nodes)));
        nodes
    }

    pub fn validate_metadata(&self) -> MdnResult<()> {
        self.read(DigitGrid::validate_metadata)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub fn set_value(&self, xy: Coord, digit: Digit) -> MdnResult<bool> {
        self.mutate(|g| g.set_value(xy, digit))
    }

    pub fn set_values<I>(&self, values: I) -> MdnResult<bool>
    where
        I: IntoIterator<Item = (Coord, Digit)>,
    {
        self.mutate(|g| g.set_values(values))
    }

    pub fn fill_rect(&self, rect: &Rect, digit: Digit) -> MdnResult<()> {
        self.mutate(|g| g.fill_rect(rect, digit))
    }

    pub fn set_to_zero(&self, xy: Coord) -> MdnResult<bool> {
        self.mutate(|g| Ok(g.set_to_zero(xy)))
    }

    pub fn set_coords_to_zero<I>(&self, coords: I) -> MdnResult<usize>
    where
        I: IntoIterator<Item = Coord>,
    {
        self.mutate(|g| Ok(g.set_coords_to_zero(coords)))
    }

    pub fn set_rect_to_zero(&self, rect: &Rect) -> MdnResult<usize> {
        self.mutate(|g| Ok(g.set_rect_to_zero(rect)))
    }

    pub fn clear(&self) -> MdnResult<()> {
        self.mutate(|g| {
            g.clear();
            Ok(())
        })
    }

    pub fn rebuild_metadata(&self) -> MdnResult<()> {
        self.mutate(DigitGrid::rebuild_metadata)
    }

    // ========================================================================
    // Carryover
    // ========================================================================

    /// Carry manually at `xy`, then bring the touched digits back in range.
    pub fn carryover(&self, xy: Coord, carry: Digit) -> MdnResult<CleanupReport> {
        self.mutate(|g| {
            let touched = g.carryover(xy, carry)?;
            let mut report = g.carryover_cleanup(touched)?;
            report.carries += 1;
            Ok(report)
        })
    }

    pub fn carryover_cleanup<I>(&self, coords: I) -> MdnResult<CleanupReport>
    where
        I: IntoIterator<Item = Coord>,
    {
        self.mutate(|g| g.carryover_cleanup(coords))
    }

    pub fn carryover_cleanup_all(&self) -> MdnResult<CleanupReport> {
        self.mutate(DigitGrid::carryover_cleanup_all)
    }

    pub fn shift(&self, dx: i32, dy: i32) -> MdnResult<()> {
        self.mutate(|g| g.shift(dx, dy))
    }

    pub fn transpose(&self) -> MdnResult<()> {
        self.mutate(DigitGrid::transpose)
    }

    // ========================================================================
    // Placement
    // ========================================================================

    pub fn add_integer(&self, xy: Coord, value: i64) -> MdnResult<CleanupReport> {
        self.mutate(|g| g.add_integer(xy, value))
    }

    pub fn add_real(
        &self,
        xy: Coord,
        value: f64,
        n_digits: usize,
        overwrite: bool,
        fraxis: Fraxis,
    ) -> MdnResult<CleanupReport> {
        self.mutate(|g| g.add_real(xy, value, n_digits, overwrite, fraxis))
    }

    pub fn add_decimal(
        &self,
        xy: Coord,
        value: Decimal,
        n_digits: usize,
        overwrite: bool,
        fraxis: Fraxis,
    ) -> MdnResult<CleanupReport> {
        self.mutate(|g| g.add_decimal(xy, value, n_digits, overwrite, fraxis))
    }

    pub fn add_digits(
        &self,
        xy: Coord,
        negative: bool,
        int_part: &str,
        frac_part: &str,
        overwrite: bool,
        fraxis: Fraxis,
    ) -> MdnResult<CleanupReport> {
        self.mutate(|g| g.add_digits(xy, negative, int_part, frac_part, overwrite, fraxis))
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// `ans = self + rhs`. `ans` must be a different instance from both
    /// operands.
    pub fn plus(&self, rhs: &Mdn2d, ans: &Mdn2d) -> MdnResult<CleanupReport> {
        self.lock_binary(rhs, ans, "plus", |a, b, out| a.plus(b, out))
    }

    /// `ans = self - rhs`
    pub fn minus(&self, rhs: &Mdn2d, ans: &Mdn2d) -> MdnResult<CleanupReport> {
        self.lock_binary(rhs, ans, "minus", |a, b, out| a.minus(b, out))
    }

    /// `ans = self * rhs`
    pub fn multiply(&self, rhs: &Mdn2d, ans: &Mdn2d) -> MdnResult<CleanupReport> {
        self.lock_binary(rhs, ans, "multiply", |a, b, out| a.multiply(b, out))
    }

    /// `ans ~= self / rhs`; see `DigitGrid::divide` for the return value.
    pub fn divide(&self, rhs: &Mdn2d, ans: &Mdn2d, fraxis: Fraxis) -> MdnResult<f64> {
        self.lock_binary(rhs, ans, "divide", |a, b, out| a.divide(b, out, fraxis))
    }

    pub fn plus_assign(&self, rhs: &Mdn2d) -> MdnResult<CleanupReport> {
        self.lock_assign(rhs, |a, b| a.plus_assign(b))
    }

    pub fn minus_assign(&self, rhs: &Mdn2d) -> MdnResult<CleanupReport> {
        self.lock_assign(rhs, |a, b| a.minus_assign(b))
    }

    pub fn multiply_assign(&self, rhs: &Mdn2d) -> MdnResult<CleanupReport> {
        self.lock_assign(rhs, |a, b| a.multiply_assign(b))
    }

    pub fn multiply_scalar(&self, k: i64) -> MdnResult<CleanupReport> {
        self.mutate(|g| g.multiply_scalar(k))
    }

    pub fn negate(&self) -> MdnResult<()> {
        self.mutate(|g| {
            g.negate();
            Ok(())
        })
    }

    pub fn divide_scalar(&self, k: i64) -> MdnResult<f64> {
        self.mutate(|g| g.divide_scalar(k))
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// What applying `next` would do; nothing is changed.
    pub fn assess_config_change(&self, next: &Mdn2dConfig) -> Mdn2dConfigImpact {
        self.read(|g| g.config().assess_change(next, !g.is_empty()))
    }

    /// Apply `next` and perform the clear, purge or cleanup it implies.
    pub fn set_config(&self, next: Mdn2dConfig) -> MdnResult<Mdn2dConfigImpact> {
        self.mutate(|g| g.reconfigure(next))
    }

    // ========================================================================
    // Observers
    // ========================================================================

    pub fn register_observer(&self, observer: Weak<dyn Observer>) -> ObserverId {
        self.observers.register(observer)
    }

    pub fn unregister_observer(&self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Move every observer to `successor`, telling each about the move.
    pub fn hand_over_observers(&self, successor: &Mdn2d) -> MdnResult<usize> {
        if ptr::eq(self, successor) {
            return Err(MdnError::IllegalSelfReference("hand_over_observers"));
        }
        let event = ObserverEvent::Reallocating {
            from: self.name(),
            to: successor.name(),
            timestamp: Utc::now(),
        };
        let moved = self.observers.drain();
        for observer in &moved {
            successor.observers.register(observer.clone());
        }
        for observer in moved.iter().filter_map(Weak::upgrade) {
            observer.on_event(event.clone());
        }
        Ok(moved.len())
    }
}

impl Drop for Mdn2d {
    fn drop(&mut self) {
        let name = self.state.get_mut().name.clone();
        self.observers.notify(&ObserverEvent::Farewell {
            name: name.clone(),
            timestamp: Utc::now(),
        });
        self.framework.release_mdn_name(&name);
        tracing::debug!(%name, "number dropped");
    }
}

impl PartialEq for Mdn2d {
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        let (a, b) = if self.id < other.id {
            let a = self.state.read();
            (a, other.state.read())
        } else {
            let b = other.state.read();
            (self.state.read(), b)
        };
        a.grid == b.grid
    }
}

impl fmt::Display for Mdn2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.read(|g| render_pretty(g, &TextOptions::default()));
        f.write_str(&text)
    }
}

impl fmt::Debug for Mdn2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Mdn2d")
            .field("id", &self.id)
            .field("name", &state.name)
            .field("framework", &self.framework.class_name())
            .field("digits", &state.grid.len())
            .field("bounds", &state.grid.bounds())
            .finish()
    }
}

fn debug_validate(grid: &DigitGrid) -> MdnResult<()> {
    if cfg!(debug_assertions) {
        grid.validate_metadata()?;
    }
    Ok(())
}

fn missing_guard() -> MdnError {
    MdnError::InvalidState("lock guard missing after acquisition".to_string())
}
