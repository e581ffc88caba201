//! Reactive Primitives
//!
//! This module implements the reactivity core: reactive objects, their
//! per-property dependency registries, and the subscribers that bind an
//! expression to a render callback.
//!
//! # Concepts
//!
//! ## Reactive Objects
//!
//! A [`ReactiveObject`] holds dynamically typed [`Value`]s. Every property
//! installed by observing or walking owns one [`Dep`]. Nested objects are
//! walked recursively, including objects assigned later.
//!
//! ## Subscribers
//!
//! A [`Subscriber`] resolves a [`Path`] against a root object. While it
//! resolves, it occupies the [`ReactiveContext`] slot, so every tracked read
//! along the path registers it. A later write to any of those properties
//! re-resolves the path and fires the callback if the value changed.
//!
//! # Implementation Notes
//!
//! Propagation is synchronous and depth first: a callback that writes a
//! property runs that property's notifications to completion before the
//! outer notification continues. The context bounds this nesting.

mod context;
mod dep;
mod object;
mod path;
mod subscriber;
mod value;

pub use context::{PropagationFrame, ReactiveContext, ResolutionGuard};
pub use dep::{Dep, Reactive};
pub use object::ReactiveObject;
pub use path::Path;
pub use subscriber::{Callback, Subscriber, SubscriberId};
pub use value::Value;
