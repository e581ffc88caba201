//! Dependency Registry
//!
//! Every reactive property owns one [`Dep`]: the ordered list of everything
//! that read the property while resolving. Writing the property calls
//! [`Dep::notify`], which updates each registered subscriber synchronously,
//! in registration order.
//!
//! # Ownership
//!
//! The registry holds weak references. Bindings are owned by whoever
//! compiled them (normally the engine); a registry never keeps a binding
//! alive and silently skips entries whose owner has gone away.
//!
//! # Failures
//!
//! When a subscriber fails, its context decides what happens next: with
//! failure isolation the error is logged and recorded and notification
//! continues, otherwise the remaining subscribers are skipped and the
//! error propagates to the writer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::context::ReactiveContext;
use super::subscriber::SubscriberId;
use crate::error::Result;

/// Counter for generating unique registry IDs.
static DEP_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_dep_id() -> u64 {
    DEP_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A trait for types that can be notified when a property they read changes.
pub trait Reactive {
    /// Get the subscriber ID for this reactive value.
    fn subscriber_id(&self) -> SubscriberId;

    /// Re-evaluate after a dependency changed.
    fn update(&self) -> Result<()>;

    /// The evaluation context this subscriber belongs to, if any.
    ///
    /// Used to decide whether a failed update is isolated or propagated.
    fn context(&self) -> Option<&ReactiveContext> {
        None
    }

    /// Whether an earlier, completed resolution already registered this
    /// subscriber with the registry `dep_id`.
    fn holds_dependency(&self, _dep_id: u64) -> bool {
        false
    }

    /// Remember that the resolution in flight registered with `dep_id`.
    fn note_dependency(&self, _dep_id: u64) {}
}

struct Entry {
    id: SubscriberId,
    subscriber: Weak<dyn Reactive>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.subscriber.strong_count() > 0
    }
}

struct DepInner {
    id: u64,
    subscribers: RefCell<Vec<Entry>>,
}

/// Per-property list of interested subscribers.
///
/// Cloning shares the list.
#[derive(Clone)]
pub struct Dep {
    inner: Rc<DepInner>,
}

impl Dep {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DepInner {
                id: next_dep_id(),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Append a subscriber.
    ///
    /// With `dedup`, a subscriber that is already registered is not added
    /// again. Without it the same subscriber may appear (and be notified)
    /// several times.
    pub fn add_subscriber(&self, subscriber: &Rc<dyn Reactive>, dedup: bool) {
        let id = subscriber.subscriber_id();
        let mut subscribers = self.inner.subscribers.borrow_mut();
        subscribers.retain(Entry::is_live);
        if dedup && subscribers.iter().any(|entry| entry.id == id) {
            return;
        }
        tracing::trace!(dep = self.id(), subscriber = ?id, "subscriber registered");
        subscribers.push(Entry {
            id,
            subscriber: Rc::downgrade(subscriber),
        });
    }

    /// Remove every registration of a subscriber.
    pub fn remove_subscriber(&self, id: SubscriberId) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|entry| entry.id != id);
    }

    /// Update every registered subscriber, in registration order.
    ///
    /// Subscribers registered while notifying are not visited by this pass.
    /// Entries whose subscriber was dropped are pruned first.
    pub fn notify(&self) -> Result<()> {
        let snapshot: Vec<Weak<dyn Reactive>> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.retain(Entry::is_live);
            subscribers
                .iter()
                .map(|entry| entry.subscriber.clone())
                .collect()
        };

        tracing::trace!(dep = self.id(), count = snapshot.len(), "notifying subscribers");

        for weak in snapshot {
            let Some(subscriber) = weak.upgrade() else {
                continue;
            };
            if let Err(err) = subscriber.update() {
                match subscriber.context() {
                    Some(ctx) if ctx.isolates_failures() => {
                        tracing::warn!(
                            subscriber = ?subscriber.subscriber_id(),
                            error = %err,
                            "subscriber update failed; continuing notification"
                        );
                        ctx.record_failure(err);
                    }
                    _ => return Err(err),
                }
            }
        }

        Ok(())
    }

    /// Number of live registrations, duplicates included.
    pub fn len(&self) -> usize {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .filter(|entry| entry.is_live())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Dep {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.id())
            .field("subscriber_count", &self.len())
            .finish()
    }
}
