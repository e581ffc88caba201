//! Reactive Context
//!
//! The reactive context tracks which subscriber is currently resolving its
//! expression. Tracked property reads consult it to register that
//! subscriber with the property's registry.
//!
//! # Implementation
//!
//! The context is a single slot owned by one engine and passed explicitly
//! to tracked reads; it is not process-wide. At most one resolution may be
//! in flight: entering an occupied slot fails with
//! [`BindError::ReentrantResolution`]. The slot is cleared by an RAII guard,
//! so it is restored even when resolution returns early with an error.
//!
//! The context also bounds write-triggered propagation. Every subscriber
//! update enters a [`PropagationFrame`]; nesting deeper than the configured
//! maximum fails with [`BindError::PropagationDepthExceeded`] instead of
//! recursing without limit.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::dep::{Dep, Reactive};
use crate::config::EngineConfig;
use crate::error::{BindError, Result};

/// Single-slot evaluation context shared by the subscribers of one engine.
pub struct ReactiveContext {
    current: RefCell<Option<Rc<dyn Reactive>>>,
    depth: Cell<usize>,
    max_depth: usize,
    dedup: bool,
    isolate_failures: bool,
    strict_paths: bool,
    failures: RefCell<Vec<BindError>>,
}

impl ReactiveContext {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            current: RefCell::new(None),
            depth: Cell::new(0),
            max_depth: config.max_propagation_depth,
            dedup: config.dedup_subscribers,
            isolate_failures: config.isolate_failures,
            strict_paths: config.strict_paths,
            failures: RefCell::new(Vec::new()),
        }
    }

    /// Make `subscriber` the one currently resolving.
    ///
    /// The slot is cleared when the returned guard is dropped. `label` only
    /// feeds the error message.
    pub fn enter(&self, subscriber: Rc<dyn Reactive>, label: &str) -> Result<ResolutionGuard<'_>> {
        let mut current = self.current.borrow_mut();
        if current.is_some() {
            return Err(BindError::ReentrantResolution(label.to_string()));
        }
        *current = Some(subscriber);
        Ok(ResolutionGuard { ctx: self })
    }

    /// Check if a subscriber is currently resolving.
    pub fn is_active(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Get the subscriber currently resolving, if any.
    pub fn current(&self) -> Option<Rc<dyn Reactive>> {
        self.current.borrow().clone()
    }

    /// Register the resolving subscriber (if any) with `dep`.
    ///
    /// Without deduplication, a registry the subscriber joined during an
    /// earlier resolution is skipped; only repeated reads within the same
    /// resolution produce duplicate entries.
    pub fn track(&self, dep: &Dep) {
        let Some(subscriber) = self.current() else {
            return;
        };
        if !self.dedup && subscriber.holds_dependency(dep.id()) {
            return;
        }
        dep.add_subscriber(&subscriber, self.dedup);
        subscriber.note_dependency(dep.id());
    }

    /// Enter one level of write-triggered propagation.
    pub fn enter_frame(&self) -> Result<PropagationFrame<'_>> {
        let depth = self.depth.get();
        if depth >= self.max_depth {
            return Err(BindError::PropagationDepthExceeded(self.max_depth));
        }
        self.depth.set(depth + 1);
        Ok(PropagationFrame { ctx: self })
    }

    /// Current propagation nesting.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn isolates_failures(&self) -> bool {
        self.isolate_failures
    }

    pub fn strict_paths(&self) -> bool {
        self.strict_paths
    }

    /// Remember a failure that was isolated instead of propagated.
    pub fn record_failure(&self, err: BindError) {
        self.failures.borrow_mut().push(err);
    }

    /// Drain the isolated failures recorded so far.
    pub fn take_failures(&self) -> Vec<BindError> {
        std::mem::take(&mut *self.failures.borrow_mut())
    }

    pub fn failure_count(&self) -> usize {
        self.failures.borrow().len()
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl std::fmt::Debug for ReactiveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveContext")
            .field("active", &self.is_active())
            .field("depth", &self.depth())
            .field("max_depth", &self.max_depth)
            .field("failures", &self.failure_count())
            .finish()
    }
}

/// Guard that clears the resolving slot when dropped.
pub struct ResolutionGuard<'a> {
    ctx: &'a ReactiveContext,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.ctx.current.borrow_mut().take();
    }
}

/// Guard that leaves one propagation level when dropped.
pub struct PropagationFrame<'a> {
    ctx: &'a ReactiveContext,
}

impl Drop for PropagationFrame<'_> {
    fn drop(&mut self) {
        let depth = self.ctx.depth.get();
        self.ctx.depth.set(depth.saturating_sub(1));
    }
}
