//! Reactive Objects
//!
//! A [`ReactiveObject`] is the explicit-handle replacement for intercepted
//! property access. Each property lives in a slot; a reactive slot owns
//! exactly one [`Dep`] for as long as the slot exists.
//!
//! # Reads and Writes
//!
//! - [`ReactiveObject::get`] reads without tracking.
//! - [`ReactiveObject::get_tracked`] registers the subscriber currently
//!   resolving in the given context, then reads.
//! - [`ReactiveObject::set`] ignores equal writes; otherwise it stores the
//!   value, walks it if it is an object, and notifies in registration order.
//!
//! # Plain Slots
//!
//! Properties added through [`ReactiveObject::insert_raw`] are not reactive:
//! reads never register and writes never notify. They become reactive only
//! once the object is walked again (see [`ReactiveObject::walk`]).

use std::cell::{OnceCell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::context::ReactiveContext;
use super::dep::Dep;
use super::value::Value;
use crate::error::Result;

/// Counter for generating unique object IDs.
static OBJECT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_object_id() -> u64 {
    OBJECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Storage for one property.
struct Slot {
    value: RefCell<Value>,
    /// Set once when the slot becomes reactive; never replaced afterwards.
    dep: OnceCell<Dep>,
}

impl Slot {
    fn reactive(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
            dep: OnceCell::from(Dep::new()),
        }
    }

    fn plain(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
            dep: OnceCell::new(),
        }
    }
}

struct ObjectInner {
    id: u64,
    slots: RefCell<IndexMap<String, Rc<Slot>>>,
}

/// Shared handle to an ordered map of reactive properties.
///
/// Cloning the handle shares the underlying object.
#[derive(Clone)]
pub struct ReactiveObject {
    inner: Rc<ObjectInner>,
}

impl ReactiveObject {
    /// Create an empty object.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                id: next_object_id(),
                slots: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// Create an object whose every property, recursively, is reactive.
    pub fn observe<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let obj = Self::new();
        for (key, value) in entries {
            obj.define(key, value);
        }
        obj
    }

    /// Parse a JSON object into a reactive object.
    ///
    /// Non-object JSON yields an empty object.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match Value::from_json(json) {
            Value::Object(obj) => obj,
            _ => Self::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Whether both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Install `key` as a reactive property with a fresh registry.
    ///
    /// An existing slot under the same key is replaced, registry included.
    pub fn define(&self, key: impl Into<String>, value: Value) {
        if let Value::Object(nested) = &value {
            nested.walk();
        }
        self.inner
            .slots
            .borrow_mut()
            .insert(key.into(), Rc::new(Slot::reactive(value)));
    }

    /// Add a plain, untracked property. Replaces any existing slot.
    pub fn insert_raw(&self, key: impl Into<String>, value: Value) {
        self.inner
            .slots
            .borrow_mut()
            .insert(key.into(), Rc::new(Slot::plain(value)));
    }

    /// Make every plain slot reactive, recursing into nested objects.
    ///
    /// Slots that are already reactive keep their registry.
    pub fn walk(&self) {
        let mut visited = HashSet::new();
        self.walk_inner(&mut visited);
    }

    fn walk_inner(&self, visited: &mut HashSet<u64>) {
        if !visited.insert(self.id()) {
            return;
        }
        for slot in self.slot_snapshot() {
            let _ = slot.dep.get_or_init(Dep::new);
            let nested = slot.value.borrow().as_object().cloned();
            if let Some(nested) = nested {
                nested.walk_inner(visited);
            }
        }
    }

    fn slot(&self, key: &str) -> Option<Rc<Slot>> {
        self.inner.slots.borrow().get(key).cloned()
    }

    fn slot_snapshot(&self) -> Vec<Rc<Slot>> {
        self.inner.slots.borrow().values().cloned().collect()
    }

    /// Read a property without registering any dependency.
    ///
    /// Returns `None` when the property does not exist.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.slot(key).map(|slot| slot.value.borrow().clone())
    }

    /// Read a property, registering the context's resolving subscriber (if
    /// any) with the property's registry.
    pub fn get_tracked(&self, key: &str, ctx: &ReactiveContext) -> Option<Value> {
        let slot = self.slot(key)?;
        if let Some(dep) = slot.dep.get() {
            ctx.track(dep);
        }
        let value = slot.value.borrow().clone();
        Some(value)
    }

    /// Write a property.
    ///
    /// Returns `Ok(false)` when the value is equal to the current one (no
    /// notification). A missing key is added as a plain slot. Errors come
    /// from subscribers that failed during notification.
    pub fn set(&self, key: &str, value: Value) -> Result<bool> {
        let Some(slot) = self.slot(key) else {
            self.insert_raw(key, value);
            return Ok(true);
        };

        if *slot.value.borrow() == value {
            return Ok(false);
        }

        let Some(dep) = slot.dep.get().cloned() else {
            *slot.value.borrow_mut() = value;
            return Ok(true);
        };

        tracing::trace!(
            object = self.id(),
            key,
            old = ?slot.value.borrow(),
            new = ?value,
            "property changed"
        );
        if let Value::Object(nested) = &value {
            nested.walk();
        }
        *slot.value.borrow_mut() = value;

        dep.notify()?;
        Ok(true)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.slots.borrow().contains_key(key)
    }

    /// Whether `key` exists and owns a dependency registry.
    pub fn is_reactive(&self, key: &str) -> bool {
        self.slot(key).is_some_and(|slot| slot.dep.get().is_some())
    }

    /// Number of live subscribers registered on `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.slot(key)
            .and_then(|slot| slot.dep.get().map(Dep::len))
            .unwrap_or(0)
    }

    /// Property names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.slots.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot the object as JSON without tracking.
    ///
    /// Cyclic references are cut off as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut visiting = HashSet::new();
        self.to_json_inner(&mut visiting)
    }

    fn to_json_inner(&self, visiting: &mut HashSet<u64>) -> serde_json::Value {
        if !visiting.insert(self.id()) {
            return serde_json::Value::Null;
        }
        let entries: Vec<(String, Value)> = self
            .inner
            .slots
            .borrow()
            .iter()
            .map(|(k, slot)| (k.clone(), slot.value.borrow().clone()))
            .collect();
        let mut map = serde_json::Map::new();
        for (key, value) in entries {
            let json = match &value {
                Value::Object(nested) => nested.to_json_inner(visiting),
                other => other.to_json(),
            };
            map.insert(key, json);
        }
        visiting.remove(&self.id());
        serde_json::Value::Object(map)
    }
}

impl Default for ReactiveObject {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("id", &self.id())
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn observe_makes_nested_properties_reactive() {
        let obj = ReactiveObject::from_json(&json!({ "user": { "name": "a" }, "n": 1 }));
        assert!(obj.is_reactive("user"));
        assert!(obj.is_reactive("n"));

        let user = obj.get("user").unwrap();
        assert!(user.as_object().unwrap().is_reactive("name"));
    }

    #[test]
    fn equal_write_is_noop() {
        let obj = ReactiveObject::from_json(&json!({ "n": 1 }));
        assert!(!obj.set("n", Value::from(1)).unwrap());
        assert!(obj.set("n", Value::from(2)).unwrap());
        assert_eq!(obj.get("n"), Some(Value::from(2)));
    }

    #[test]
    fn raw_slots_stay_plain_until_walked() {
        let obj = ReactiveObject::new();
        obj.insert_raw("late", Value::from("x"));
        assert!(!obj.is_reactive("late"));

        obj.walk();
        assert!(obj.is_reactive("late"));
    }

    #[test]
    fn set_on_missing_key_adds_plain_slot() {
        let obj = ReactiveObject::new();
        assert!(obj.set("added", Value::from(1)).unwrap());
        assert_eq!(obj.get("added"), Some(Value::from(1)));
        assert!(!obj.is_reactive("added"));
    }

    #[test]
    fn assigning_object_walks_it() {
        let obj = ReactiveObject::from_json(&json!({ "user": null }));
        let fresh = ReactiveObject::new();
        fresh.insert_raw("name", Value::from("b"));

        obj.set("user", Value::from(fresh.clone())).unwrap();
        assert!(fresh.is_reactive("name"));
    }

    #[test]
    fn walk_tolerates_cycles() {
        let obj = ReactiveObject::new();
        obj.insert_raw("me", Value::from(obj.clone()));
        obj.walk();
        assert!(obj.is_reactive("me"));
        assert_eq!(obj.to_json(), json!({ "me": null }));
    }

    #[test]
    fn keys_keep_insertion_order() {
        let obj = ReactiveObject::observe([
            ("b", Value::from(1)),
            ("a", Value::from(2)),
            ("c", Value::from(3)),
        ]);
        assert_eq!(obj.keys(), vec!["b", "a", "c"]);
        assert_eq!(obj.len(), 3);
    }
}
