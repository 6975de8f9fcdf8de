//! External verification trigger registry
//!
//! The locker script is an opaque external collaborator: a closure
//! registered globally under a fixed name. At LOCKED entry the engine
//! looks it up and invokes it with no arguments, ignoring any outcome.
//! An absent trigger is an expected path, reported only as a diagnostic.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;

use crate::LOCKER_TRIGGER_NAME;

pub type TriggerFn = Arc<dyn Fn() + Send + Sync>;

lazy_static! {
    static ref TRIGGERS: RwLock<HashMap<String, TriggerFn>> = RwLock::new(HashMap::new());
}

/// Register (or replace) a named trigger
pub fn register_trigger(name: &str, trigger: TriggerFn) {
    if let Ok(mut map) = TRIGGERS.write() {
        map.insert(name.to_string(), trigger);
    }
}

/// Remove a named trigger
pub fn unregister_trigger(name: &str) {
    if let Ok(mut map) = TRIGGERS.write() {
        map.remove(name);
    }
}

/// Invoke the locker trigger if one is registered under the fixed name.
/// Returns whether it fired.
pub fn fire_locker_trigger() -> bool {
    let trigger = TRIGGERS
        .read()
        .ok()
        .and_then(|map| map.get(LOCKER_TRIGGER_NAME).cloned());
    match trigger {
        Some(f) => {
            f();
            true
        }
        None => {
            tracing::debug!(name = LOCKER_TRIGGER_NAME, "locker trigger not registered; skipping");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Single test: the registry is process-global, so the absent and
    // present cases must run in sequence.
    #[test]
    fn test_trigger_lifecycle() {
        unregister_trigger(LOCKER_TRIGGER_NAME);
        assert!(!fire_locker_trigger());

        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        register_trigger(LOCKER_TRIGGER_NAME, Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(fire_locker_trigger());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        unregister_trigger(LOCKER_TRIGGER_NAME);
        assert!(!fire_locker_trigger());
    }
}
