//! The process-wide function registry looked up by `!apply`, grounded on
//! `examples/alliecatowo-lumen`'s `vm/intrinsics.rs` dispatch-by-name
//! convention — a read-mostly map behind a single `RwLock`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde_json::Value as Json;

/// A registered user function: one JSON value in, one JSON value out.
pub type MorphFn = Arc<dyn Fn(&Json) -> Json + Send + Sync>;

static REGISTRY: Lazy<RwLock<HashMap<String, MorphFn>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers (or replaces) a function under `name`. Safe to call
/// concurrently with other registrations and with `lookup`.
pub fn register_function<F>(name: impl Into<String>, f: F)
where
    F: Fn(&Json) -> Json + Send + Sync + 'static,
{
    let mut guard = REGISTRY.write().expect("function registry lock poisoned");
    guard.insert(name.into(), Arc::new(f));
}

/// Looks up a registered function by exact name.
pub fn lookup(name: &str) -> Option<MorphFn> {
    let guard = REGISTRY.read().expect("function registry lock poisoned");
    guard.get(name).cloned()
}

/// Removes every registered function. Exposed for test isolation only —
/// production embedders register once at startup and never clear.
pub fn clear() {
    let mut guard = REGISTRY.write().expect("function registry lock poisoned");
    guard.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registers_and_looks_up_by_name() {
        clear();
        register_function("double", |v: &Json| match v.as_i64() {
            Some(i) => json!(i * 2),
            None => Json::Null,
        });
        let f = lookup("double").expect("registered function must be found");
        assert_eq!(f(&json!(21)), json!(42));
        clear();
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        clear();
        assert!(lookup("nonexistent").is_none());
    }
}
