// ============================================================================
// Framework Interface
// Naming authority consulted by every number for unique names
// ============================================================================

use parking_lot::RwLock;
use std::collections::BTreeSet;

/// The owner of a set of numbers (a project, a document, a test harness).
///
/// Numbers never decide name uniqueness themselves; they ask the framework
/// they were created with.
pub trait Framework: Send + Sync {
    /// Type name of the framework, for diagnostics
    fn class_name(&self) -> &str;

    /// The framework's own name
    fn name(&self) -> String;

    fn set_name(&self, name: &str);

    /// Whether a number with this name is currently known
    fn mdn_name_exists(&self, name: &str) -> bool;

    /// Ask to rename `old` to `new`; returns the name the number must use
    /// (either `new`, or `old` when the request is refused).
    fn request_mdn_name_change(&self, old: &str, new: &str) -> String;

    /// A unique name derived from `hint`
    fn suggest_name(&self, hint: &str) -> String;

    /// A unique name for a copy of the number called `hint`
    fn suggest_copy_name(&self, hint: &str) -> String;

    /// The number called `name` no longer exists
    fn release_mdn_name(&self, _name: &str) {}
}

/// Self-contained framework keeping an in-memory name registry.
///
/// Suggested names are reserved immediately, so two suggestions never
/// collide. Used by tests and by embeddings that have no project layer.
#[derive(Debug)]
pub struct StandaloneFramework {
    name: RwLock<String>,
    names: RwLock<BTreeSet<String>>,
}

impl StandaloneFramework {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: RwLock::new(name.into()),
            names: RwLock::new(BTreeSet::new()),
        }
    }

    /// Number of names currently reserved
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    fn reserve_unique(&self, stem: &str) -> String {
        let stem = if stem.trim().is_empty() {
            "Mdn"
        } else {
            stem.trim()
        };
        let mut names = self.names.write();
        let mut candidate = stem.to_string();
        let mut counter = 1u64;
        while names.contains(&candidate) {
            candidate = format!("{stem}{counter}");
            counter += 1;
        }
        names.insert(candidate.clone());
        candidate
    }
}

impl Default for StandaloneFramework {
    fn default() -> Self {
        Self::new("standalone")
    }
}

impl Framework for StandaloneFramework {
    fn class_name(&self) -> &str {
        "StandaloneFramework"
    }

    fn name(&self) -> String {
        self.name.read().clone()
    }

    fn set_name(&self, name: &str) {
        *self.name.write() = name.to_string();
    }

    fn mdn_name_exists(&self, name: &str) -> bool {
        self.names.read().contains(name)
    }

    fn request_mdn_name_change(&self, old: &str, new: &str) -> String {
        if old == new {
            return old.to_string();
        }
        let mut names = self.names.write();
        if new.trim().is_empty() || names.contains(new) {
            tracing::debug!(old, new, "name change refused");
            return old.to_string();
        }
        names.remove(old);
        names.insert(new.to_string());
        new.to_string()
    }

    fn suggest_name(&self, hint: &str) -> String {
        self.reserve_unique(hint)
    }

    fn suggest_copy_name(&self, hint: &str) -> String {
        self.reserve_unique(&format!("{}_copy", hint.trim()))
    }

    fn release_mdn_name(&self, name: &str) {
        self.names.write().remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_are_unique() {
        let fw = StandaloneFramework::default();
        assert_eq!(fw.suggest_name("a"), "a");
        assert_eq!(fw.suggest_name("a"), "a1");
        assert_eq!(fw.suggest_name("a"), "a2");
        assert_eq!(fw.suggest_name(""), "Mdn");
        assert!(fw.mdn_name_exists("a1"));
        assert_eq!(fw.len(), 4);
    }

    #[test]
    fn test_copy_names() {
        let fw = StandaloneFramework::default();
        assert_eq!(fw.suggest_copy_name("x"), "x_copy");
        assert_eq!(fw.suggest_copy_name("x"), "x_copy1");
    }

    #[test]
    fn test_name_change() {
        let fw = StandaloneFramework::default();
        let a = fw.suggest_name("a");
        let b = fw.suggest_name("b");

        // taken
        assert_eq!(fw.request_mdn_name_change(&a, &b), "a");
        // free
        assert_eq!(fw.request_mdn_name_change(&a, "c"), "c");
        assert!(!fw.mdn_name_exists("a"));
        assert!(fw.mdn_name_exists("c"));

        fw.release_mdn_name("c");
        assert!(!fw.mdn_name_exists("c"));
    }

    #[test]
    fn test_framework_name() {
        let fw = StandaloneFramework::new("project");
        assert_eq!(fw.class_name(), "StandaloneFramework");
        fw.set_name("renamed");
        assert_eq!(fw.name(), "renamed");
    }
}
