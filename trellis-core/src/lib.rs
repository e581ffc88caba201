//! Trellis Core
//!
//! This crate provides the core runtime for the Trellis reactive
//! view-binding engine. It implements:
//!
//! - Reactive objects with per-property dependency tracking
//! - Subscribers binding dot-path expressions to render callbacks
//! - A directive compiler turning template markup into live bindings
//! - View updaters for text, markup, class and form values
//!
//! Updates are synchronous: writing a property re-renders every bound node
//! before the write returns.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: reactive objects, dependency registries, subscribers
//! - `compile`: directive compiler, directive handlers and view updaters
//! - `dom`: the in-memory document tree the engine renders into
//! - `viewmodel`: data root plus method table consumed by the compiler
//! - `engine`: construction surface tying it all together
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_core::{Document, Engine, ViewModel};
//! use serde_json::json;
//!
//! let doc = Document::from_json(r#"{ "tag": "div", "attrs": { "id": "app" },
//!     "children": [ { "tag": "p", "children": ["{{ user.name }}"] } ] }"#)?;
//!
//! let vm = ViewModel::from_json(&json!({ "user": { "name": "a" } }));
//! let engine = Engine::new(&doc, "#app", vm)?;
//!
//! // Writing the property re-renders the paragraph synchronously.
//! engine.vm().set("user.name", "b")?;
//! assert_eq!(doc.query_selector("p").unwrap().text_content(), "b");
//! ```

pub mod compile;
pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod reactive;
pub mod viewmodel;

pub use config::EngineConfig;
pub use dom::{Document, Event, Node, Template};
pub use engine::{Engine, Root};
pub use error::{BindError, Result};
pub use reactive::{Path, ReactiveObject, Subscriber, Value};
pub use viewmodel::{Method, ViewModel};
