//! Subscriber types for the reactive system.
//!
//! A [`Subscriber`] is one live binding between a dot-path expression and a
//! render callback. Creating it resolves the expression inside its context,
//! which registers it with every property read along the path. When any of
//! those properties changes, [`Subscriber::update`] re-resolves the path and
//! fires the callback only if the resolved value actually changed.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::context::ReactiveContext;
use super::dep::Reactive;
use super::object::ReactiveObject;
use super::path::Path;
use super::value::Value;
use crate::error::Result;

/// Unique identifier for a subscriber.
///
/// Each subscriber gets a unique ID when created. This ID is used to avoid
/// duplicate subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Render callback invoked with `(new_value, old_value)`.
pub type Callback = Box<dyn Fn(&Value, &Value) -> Result<()>>;

/// A live binding of one expression path to one render callback.
pub struct Subscriber {
    id: SubscriberId,
    this: Weak<Subscriber>,
    ctx: Rc<ReactiveContext>,
    root: ReactiveObject,
    path: Path,
    callback: Callback,
    /// Last resolved value, used to suppress unchanged updates.
    value: RefCell<Value>,
    /// Registries joined by completed resolutions.
    deps: RefCell<HashSet<u64>>,
    /// Registries joined by the resolution in flight.
    pending: RefCell<Vec<u64>>,
}

impl Subscriber {
    /// Create a subscriber and resolve its expression once.
    ///
    /// The callback is not invoked here; callers render the initial value
    /// themselves from [`Subscriber::value`].
    pub fn new<F>(
        ctx: Rc<ReactiveContext>,
        root: ReactiveObject,
        path: Path,
        callback: F,
    ) -> Result<Rc<Self>>
    where
        F: Fn(&Value, &Value) -> Result<()> + 'static,
    {
        let subscriber = Rc::new_cyclic(|this| Self {
            id: SubscriberId::new(),
            this: this.clone(),
            ctx,
            root,
            path,
            callback: Box::new(callback),
            value: RefCell::new(Value::Undefined),
            deps: RefCell::new(HashSet::new()),
            pending: RefCell::new(Vec::new()),
        });

        let value = subscriber.resolve()?;
        tracing::trace!(
            subscriber = ?subscriber.id,
            path = %subscriber.path,
            value = ?value,
            "subscriber created"
        );
        *subscriber.value.borrow_mut() = value;
        Ok(subscriber)
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last resolved value.
    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Resolve the path with this subscriber occupying the context slot.
    fn resolve(&self) -> Result<Value> {
        let this: Rc<dyn Reactive> = match self.this.upgrade() {
            Some(this) => this,
            // Not reachable through an `Rc` any more; resolve untracked.
            None => return self.path.resolve(&self.root, None, self.ctx.strict_paths()),
        };
        let _guard = self.ctx.enter(this, self.path.as_str())?;
        let result = self
            .path
            .resolve(&self.root, Some(&self.ctx), self.ctx.strict_paths());

        let joined = std::mem::take(&mut *self.pending.borrow_mut());
        self.deps.borrow_mut().extend(joined);
        result
    }

    /// Number of distinct registries this subscriber has joined.
    pub fn dependency_count(&self) -> usize {
        self.deps.borrow().len()
    }
}

impl Reactive for Subscriber {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    /// Re-resolve and fire the callback if the value changed.
    ///
    /// Resolution is tracked again, so objects assigned since the last run
    /// pick up this subscriber too.
    fn update(&self) -> Result<()> {
        let _frame = self.ctx.enter_frame()?;

        let new_value = self.resolve()?;
        let old_value = self.value.borrow().clone();
        if new_value == old_value {
            return Ok(());
        }

        tracing::debug!(
            subscriber = ?self.id,
            path = %self.path,
            old = ?old_value,
            new = ?new_value,
            "binding changed"
        );
        *self.value.borrow_mut() = new_value.clone();
        (self.callback)(&new_value, &old_value)
    }

    fn context(&self) -> Option<&ReactiveContext> {
        Some(&self.ctx)
    }

    fn holds_dependency(&self, dep_id: u64) -> bool {
        self.deps.borrow().contains(&dep_id)
    }

    fn note_dependency(&self, dep_id: u64) {
        self.pending.borrow_mut().push(dep_id);
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("value", &*self.value.borrow())
            .finish()
    }
}
