//! Engine
//!
//! The construction surface. An [`Engine`] locates its root element,
//! compiles the template under it against a viewmodel, and keeps the
//! resulting bindings alive for as long as it exists.
//!
//! A root that cannot be found is not an error: the engine is created
//! unmounted and does nothing.

use std::rc::Rc;

use crate::compile::Compiler;
use crate::config::EngineConfig;
use crate::dom::{Document, Node};
use crate::error::{BindError, Result};
use crate::reactive::{ReactiveContext, ReactiveObject, Subscriber};
use crate::viewmodel::ViewModel;

/// Where to mount an engine.
#[derive(Debug, Clone)]
pub enum Root<'a> {
    /// First element matching a selector in the document.
    Selector(&'a str),
    /// A specific node; must be an element.
    Node(Node),
}

impl<'a> From<&'a str> for Root<'a> {
    fn from(selector: &'a str) -> Self {
        Root::Selector(selector)
    }
}

impl From<Node> for Root<'_> {
    fn from(node: Node) -> Self {
        Root::Node(node)
    }
}

impl From<&Node> for Root<'_> {
    fn from(node: &Node) -> Self {
        Root::Node(node.clone())
    }
}

/// A mounted (or inert) view binding.
pub struct Engine {
    root: Option<Node>,
    vm: ViewModel,
    config: EngineConfig,
    ctx: Rc<ReactiveContext>,
    bindings: Vec<Rc<Subscriber>>,
    listeners: usize,
}

impl Engine {
    /// Mount with the default configuration.
    pub fn new<'a>(document: &Document, root: impl Into<Root<'a>>, vm: ViewModel) -> Result<Self> {
        Self::with_config(document, root, vm, EngineConfig::default())
    }

    /// Mount with an explicit configuration.
    ///
    /// Errors only surface when failure isolation is disabled; otherwise
    /// failed bindings are recorded (see [`Engine::take_failures`]).
    pub fn with_config<'a>(
        document: &Document,
        root: impl Into<Root<'a>>,
        vm: ViewModel,
        config: EngineConfig,
    ) -> Result<Self> {
        let ctx = Rc::new(ReactiveContext::new(&config));
        let root = match root.into() {
            Root::Selector(selector) => document.query_selector(selector),
            Root::Node(node) => Some(node).filter(Node::is_element),
        };

        let mut engine = Self {
            root: None,
            vm,
            config,
            ctx,
            bindings: Vec::new(),
            listeners: 0,
        };

        let Some(root) = root else {
            tracing::debug!("root element not found; nothing to compile");
            return Ok(engine);
        };

        let mut compiler = Compiler::new(&engine.config, Rc::clone(&engine.ctx));
        compiler.compile(&root, &engine.vm)?;
        engine.listeners = compiler.listener_count();
        engine.bindings = compiler.into_bindings();
        engine.root = Some(root);

        tracing::debug!(
            bindings = engine.bindings.len(),
            listeners = engine.listeners,
            "engine mounted"
        );
        Ok(engine)
    }

    /// Whether a root element was found and compiled.
    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn vm(&self) -> &ViewModel {
        &self.vm
    }

    /// The reactive data root.
    pub fn data(&self) -> &ReactiveObject {
        self.vm.data()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Live subscribers, one per data binding.
    pub fn bindings(&self) -> &[Rc<Subscriber>] {
        &self.bindings
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Event listeners attached by event directives.
    pub fn listener_count(&self) -> usize {
        self.listeners
    }

    /// Drain failures that were isolated instead of propagated, both at
    /// compile time and during later notifications.
    pub fn take_failures(&self) -> Vec<BindError> {
        self.ctx.take_failures()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("mounted", &self.is_mounted())
            .field("bindings", &self.bindings.len())
            .field("listeners", &self.listeners)
            .field("context", &self.ctx)
            .finish()
    }
}
