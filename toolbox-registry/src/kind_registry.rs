//! Generic process-wide kind registry (§2 component A, §4.1).
//!
//! Three instances of this registry exist, one each for sources, tools, and
//! auth services (see `source_registry`, `tool_registry`, `auth_registry`).
//! Registration happens once at process start, typically from each backend
//! driver crate's own `inventory`-style init call; a duplicate kind string is
//! a programming error between two packages and is treated as fatal rather
//! than silently shadowed.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Maps a lowercase-hyphen kind string to a factory of type `F`.
///
/// Read-heavy after startup: every config-load decode goes through `get`, while
/// `register` only runs during process initialization.
pub struct KindRegistry<F: ?Sized> {
    label: &'static str,
    factories: RwLock<HashMap<&'static str, Arc<F>>>,
}

impl<F: ?Sized> KindRegistry<F> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Register `factory` under `kind`.
    ///
    /// # Panics
    /// Panics if `kind` is already registered (§4.1: "collision is a fatal
    /// startup panic"). This is intentional: a collision means two packages
    /// claim the same kind, which is unrecoverable and must not be masked.
    pub fn register(&self, kind: &'static str, factory: Arc<F>) {
        let mut factories = self.factories.write().expect("kind registry lock poisoned");
        if factories.contains_key(kind) {
            panic!(
                "duplicate {} kind registration for '{kind}': two packages claim the same kind",
                self.label
            );
        }
        factories.insert(kind, factory);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<F>> {
        self.factories
            .read()
            .expect("kind registry lock poisoned")
            .get(kind)
            .cloned()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> =
            self.factories.read().expect("kind registry lock poisoned").keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}
