// ============================================================================
// Utilities Module
// Locking helpers shared by the number wrapper
// ============================================================================

mod tracked_lock;

pub use tracked_lock::{
    LockStats, TrackedLock, TrackedReadGuard, TrackedWriteGuard, HOLD_WARNING, WAIT_WARNING,
};
