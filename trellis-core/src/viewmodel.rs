//! Viewmodel
//!
//! The minimal contract the binding engine consumes: a reactive data root
//! that expressions resolve against, and a table of named methods that
//! event directives attach to elements.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::Event;
use crate::error::Result;
use crate::reactive::{Path, ReactiveObject, Value};

/// A viewmodel method, invoked with the viewmodel as its context.
pub type Method = Rc<dyn Fn(&ViewModel, &Event) -> Result<()>>;

/// Data root plus method table. Cloning shares both.
#[derive(Clone)]
pub struct ViewModel {
    data: ReactiveObject,
    methods: Rc<IndexMap<String, Method>>,
}

impl ViewModel {
    pub fn new(data: ReactiveObject) -> Self {
        Self {
            data,
            methods: Rc::new(IndexMap::new()),
        }
    }

    /// Build a viewmodel whose data is the given JSON object, made reactive.
    pub fn from_json(json: &serde_json::Value) -> Self {
        Self::new(ReactiveObject::from_json(json))
    }

    /// Add a named method.
    pub fn with_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&ViewModel, &Event) -> Result<()> + 'static,
    {
        Rc::make_mut(&mut self.methods).insert(name.into(), Rc::new(method));
        self
    }

    pub fn data(&self) -> &ReactiveObject {
        &self.data
    }

    pub fn method(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }

    /// Read a dot-path without tracking. Missing segments yield `Undefined`.
    pub fn get(&self, expr: &str) -> Result<Value> {
        Path::parse(expr)?.resolve(&self.data, None, false)
    }

    /// Write a dot-path through the reactive proxy.
    pub fn set(&self, expr: &str, value: impl Into<Value>) -> Result<bool> {
        Path::parse(expr)?.assign(&self.data, value.into())
    }
}

impl std::fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModel")
            .field("data", &self.data)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
