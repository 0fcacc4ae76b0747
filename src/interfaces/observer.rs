// ============================================================================
// Observer Interface
// Lifecycle notifications for code that tracks a number without owning it
// ============================================================================

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Handle returned by registration, used to unregister.
pub type ObserverId = u64;

/// Events delivered to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    /// The number is being destroyed
    Farewell {
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// The number's role moved to another instance
    Reallocating {
        from: String,
        to: String,
        timestamp: DateTime<Utc>,
    },
}

/// Observer trait for number lifecycle events.
///
/// Called outside the number's lock; implementations may freely query other
/// numbers.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: ObserverEvent);
}

/// No-op observer for testing
pub struct NoOpObserver;

impl Observer for NoOpObserver {
    fn on_event(&self, _event: ObserverEvent) {}
}

/// Logging observer
pub struct LoggingObserver;

impl Observer for LoggingObserver {
    fn on_event(&self, event: ObserverEvent) {
        tracing::debug!("Number lifecycle event: {:?}", event);
    }
}

/// Id-keyed registry of weakly held observers.
///
/// The registry never keeps an observer alive; dead entries are pruned when
/// notifications are sent.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: AtomicU64,
    entries: Mutex<BTreeMap<ObserverId, Weak<dyn Observer>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Weak<dyn Observer>) -> ObserverId {
        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        self.entries.lock().insert(id, observer);
        id
    }

    pub fn unregister(&self, id: ObserverId) -> bool {
        self.entries.lock().remove(&id).is_some()
    }

    /// Number of registrations whose observer is still alive
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every live observer.
    ///
    /// The registry mutex is released before any observer runs.
    pub fn notify(&self, event: &ObserverEvent) {
        let live: Vec<Arc<dyn Observer>> = {
            let mut entries = self.entries.lock();
            entries.retain(|_, w| w.strong_count() > 0);
            entries.values().filter_map(Weak::upgrade).collect()
        };
        for observer in live {
            observer.on_event(event.clone());
        }
    }

    /// Remove and return every live registration.
    pub(crate) fn drain(&self) -> Vec<Weak<dyn Observer>> {
        let mut entries = self.entries.lock();
        let drained = std::mem::take(&mut *entries);
        drained
            .into_values()
            .filter(|w| w.strong_count() > 0)
            .collect()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("live", &self.len())
            .finish()
    }
}
