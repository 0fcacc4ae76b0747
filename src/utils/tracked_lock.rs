// ============================================================================
// Tracked Reader/Writer Lock
// One counted lock per number, with slow-acquire and long-hold warnings
// ============================================================================
//
// # Lock Discipline
//
// Every public number operation takes this lock exactly once and then works
// on the borrowed state. Nothing below the public surface locks again, so a
// composite operation cannot deadlock on itself.
//
// # Diagnostics
//
// - Acquisitions are counted (shared, exclusive, contended)
// - Waiting longer than `WAIT_WARNING` logs a possible deadlock, then keeps
//   waiting; acquisition never aborts
// - Holding a guard longer than `HOLD_WARNING` logs on release
//
// # Usage
//
// ```ignore
// let lock = TrackedLock::new(state);
// {
//     let guard = lock.read();
//     inspect(&guard);
// }
// lock.write().mutate();
// ```
// ============================================================================

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Waiting longer than this for a lock is reported as a possible deadlock.
pub const WAIT_WARNING: Duration = Duration::from_secs(2);

/// Holding a guard longer than this is reported when it is released.
pub const HOLD_WARNING: Duration = Duration::from_secs(1);

/// Snapshot of a lock's acquisition counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockStats {
    pub shared: u64,
    pub exclusive: u64,
    /// Acquisitions that waited past `WAIT_WARNING`
    pub contended: u64,
}

/// A `parking_lot::RwLock` that counts acquisitions and reports slow ones.
#[derive(Debug, Default)]
pub struct TrackedLock<T> {
    inner: RwLock<T>,
    shared: AtomicU64,
    exclusive: AtomicU64,
    contended: AtomicU64,
}

impl<T> TrackedLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
            shared: AtomicU64::new(0),
            exclusive: AtomicU64::new(0),
            contended: AtomicU64::new(0),
        }
    }

    /// Acquire shared access.
    pub fn read(&self) -> TrackedReadGuard<'_, T> {
        let guard = match self.inner.try_read_for(WAIT_WARNING) {
            Some(guard) => guard,
            None => {
                self.contended.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    waited = ?WAIT_WARNING,
                    "shared lock still unavailable; possible deadlock"
                );
                self.inner.read()
            },
        };
        self.shared.fetch_add(1, Ordering::Relaxed);
        TrackedReadGuard {
            guard,
            acquired: Instant::now(),
        }
    }

    /// Acquire exclusive access.
    pub fn write(&self) -> TrackedWriteGuard<'_, T> {
        let guard = match self.inner.try_write_for(WAIT_WARNING) {
            Some(guard) => guard,
            None => {
                self.contended.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    waited = ?WAIT_WARNING,
                    "exclusive lock still unavailable; possible deadlock"
                );
                self.inner.write()
            },
        };
        self.exclusive.fetch_add(1, Ordering::Relaxed);
        TrackedWriteGuard {
            guard,
            acquired: Instant::now(),
        }
    }

    /// Direct access when the caller owns the lock outright.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    pub fn stats(&self) -> LockStats {
        LockStats {
            shared: self.shared.load(Ordering::Relaxed),
            exclusive: self.exclusive.load(Ordering::Relaxed),
            contended: self.contended.load(Ordering::Relaxed),
        }
    }
}

fn report_hold(kind: &'static str, acquired: Instant) {
    let held = acquired.elapsed();
    if held > HOLD_WARNING {
        tracing::warn!(kind, held = ?held, "lock held unusually long");
    }
}

/// Shared guard; releases on drop.
pub struct TrackedReadGuard<'a, T> {
    guard: RwLockReadGuard<'a, T>,
    acquired: Instant,
}

impl<T> Deref for TrackedReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> Drop for TrackedReadGuard<'_, T> {
    fn drop(&mut self) {
        report_hold("shared", self.acquired);
    }
}

/// Exclusive guard; releases on drop.
pub struct TrackedWriteGuard<'a, T> {
    guard: RwLockWriteGuard<'a, T>,
    acquired: Instant,
}

impl<T> Deref for TrackedWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for TrackedWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for TrackedWriteGuard<'_, T> {
    fn drop(&mut self) {
        report_hold("exclusive", self.acquired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counts_acquisitions() {
        let lock = TrackedLock::new(5);
        {
            let a = lock.read();
            let b = lock.read();
            assert_eq!(*a + *b, 10);
        }
        *lock.write() += 1;
        assert_eq!(*lock.read(), 6);

        let stats = lock.stats();
        assert_eq!(stats.shared, 3);
        assert_eq!(stats.exclusive, 1);
        assert_eq!(stats.contended, 0);
    }

    #[test]
    fn test_exclusive_across_threads() {
        let lock = Arc::new(TrackedLock::new(0u64));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for _ in 0..100 {
                        *lock.write() += 1;
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*lock.read(), 400);
        assert_eq!(lock.stats().exclusive, 400);
    }
}
