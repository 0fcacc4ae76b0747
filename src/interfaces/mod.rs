// ============================================================================
// Interfaces Module
// Contracts with the code that owns and observes numbers
// ============================================================================

mod framework;
mod observer;

pub use framework::{Framework, StandaloneFramework};
pub use observer::{
    LoggingObserver, NoOpObserver, Observer, ObserverEvent, ObserverId, ObserverRegistry,
};
