//! Directive Compiler
//!
//! One depth-first pass over a template turns directive attributes and text
//! interpolations into live bindings.
//!
//! # Algorithm
//!
//! 1. Move the root's children into a detached fragment.
//! 2. Walk the fragment depth first:
//!    - elements: every attribute starting with the directive prefix is
//!      removed and dispatched to its handler (unknown kinds are dropped);
//!    - text nodes: the first `{{ expr }}` placeholder becomes a text
//!      binding over the whole node;
//!    - children are always compiled, whatever the node kind.
//! 3. Move the processed children back under the root.
//!
//! Every data binding renders once immediately and leaves one subscriber
//! behind to re-render on change.

use std::rc::Rc;

use super::directive::{self, DirectiveKind};
use super::interpolation::find_interpolation;
use super::updater::Updater;
use crate::config::EngineConfig;
use crate::dom::Node;
use crate::error::Result;
use crate::reactive::{Path, ReactiveContext, Subscriber};
use crate::viewmodel::ViewModel;

/// Compiles templates into bindings that share one reactive context.
pub struct Compiler {
    config: EngineConfig,
    ctx: Rc<ReactiveContext>,
    bindings: Vec<Rc<Subscriber>>,
    listeners: usize,
}

impl Compiler {
    pub fn new(config: &EngineConfig, ctx: Rc<ReactiveContext>) -> Self {
        Self {
            config: config.clone(),
            ctx,
            bindings: Vec::new(),
            listeners: 0,
        }
    }

    /// Compile everything under `root` against `vm`.
    ///
    /// The root's children are re-attached even when compilation fails.
    pub fn compile(&mut self, root: &Node, vm: &ViewModel) -> Result<()> {
        let fragment = Node::fragment();
        for child in root.take_children() {
            fragment.append_child(&child);
        }

        let result = self.compile_children(&fragment, vm);
        root.append_child(&fragment);

        tracing::debug!(
            bindings = self.bindings.len(),
            listeners = self.listeners,
            "template compiled"
        );
        result
    }

    /// Subscribers created so far.
    pub fn bindings(&self) -> &[Rc<Subscriber>] {
        &self.bindings
    }

    /// Hand over the created subscribers; they stay live while held.
    pub fn into_bindings(self) -> Vec<Rc<Subscriber>> {
        self.bindings
    }

    /// Number of event listeners attached by event directives.
    pub fn listener_count(&self) -> usize {
        self.listeners
    }

    fn compile_children(&mut self, parent: &Node, vm: &ViewModel) -> Result<()> {
        for node in parent.children() {
            if node.is_element() {
                self.compile_element(&node, vm)?;
            } else if node.is_text() {
                self.compile_text(&node, vm)?;
            }

            if node.child_count() > 0 {
                self.compile_children(&node, vm)?;
            }
        }
        Ok(())
    }

    fn compile_element(&mut self, node: &Node, vm: &ViewModel) -> Result<()> {
        if self.config.directive_prefix.is_empty() {
            return Ok(());
        }

        for (name, expr) in node.attributes() {
            let Some(directive) = name.strip_prefix(self.config.directive_prefix.as_str()) else {
                continue;
            };

            let kind = DirectiveKind::parse(directive, &self.config.event_marker);
            tracing::trace!(tag = %node.tag_name(), directive, expr = %expr, "directive found");

            let outcome = self.apply_directive(node, vm, &kind, &expr);
            node.remove_attribute(&name);
            self.handle(outcome)?;
        }
        Ok(())
    }

    fn compile_text(&mut self, node: &Node, vm: &ViewModel) -> Result<()> {
        let text = node.text_content();
        let Some(expr) = find_interpolation(
            &text,
            &self.config.interpolation_open,
            &self.config.interpolation_close,
        ) else {
            return Ok(());
        };

        let outcome = Path::parse(expr)
            .and_then(|path| directive::bind(&self.ctx, node, vm, path, Updater::Text));
        let outcome = outcome.map(|subscriber| self.bindings.push(subscriber));
        self.handle(outcome)
    }

    fn apply_directive(
        &mut self,
        node: &Node,
        vm: &ViewModel,
        kind: &DirectiveKind,
        expr: &str,
    ) -> Result<()> {
        match kind {
            DirectiveKind::On(event) => {
                if directive::bind_event(node, vm, event.as_deref(), expr.trim()) {
                    self.listeners += 1;
                }
                Ok(())
            }
            DirectiveKind::Model => {
                let path = Path::parse(expr)?;
                let subscriber = directive::bind_model(&self.ctx, node, vm, path)?;
                self.bindings.push(subscriber);
                Ok(())
            }
            DirectiveKind::Unknown(name) => {
                tracing::debug!(directive = %name, "unknown directive ignored");
                Ok(())
            }
            DirectiveKind::Text | DirectiveKind::Html | DirectiveKind::Class => {
                let Some(updater) = kind.updater() else {
                    return Ok(());
                };
                let path = Path::parse(expr)?;
                let subscriber = directive::bind(&self.ctx, node, vm, path, updater)?;
                self.bindings.push(subscriber);
                Ok(())
            }
        }
    }

    /// Record a failed binding and carry on, or propagate it, depending on
    /// the failure policy.
    fn handle(&self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(err) if self.ctx.isolates_failures() => {
                tracing::warn!(error = %err, "binding skipped");
                self.ctx.record_failure(err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("bindings", &self.bindings.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Template;
    use crate::error::BindError;
    use serde_json::json;

    fn compile(
        template: &str,
        vm: &ViewModel,
        config: &EngineConfig,
    ) -> (Node, Compiler, Rc<ReactiveContext>) {
        let root = Template::from_json(template).unwrap().build();
        let ctx = Rc::new(ReactiveContext::new(config));
        let mut compiler = Compiler::new(config, Rc::clone(&ctx));
        compiler.compile(&root, vm).unwrap();
        (root, compiler, ctx)
    }

    #[test]
    fn strips_every_directive() {
        let vm = ViewModel::from_json(&json!({ "a": "x", "cls": "on" }));
        let (root, compiler, _) = compile(
            r#"{ "tag": "div", "children": [
                { "tag": "p", "attrs": {
                    "v-text": "a", "v-class": "cls", "v-bogus": "a", "title": "t"
                } },
                { "tag": "button", "attrs": { "v-on:click": "missing" } }
            ] }"#,
            &vm,
            &EngineConfig::default(),
        );

        let mut leftover = Vec::new();
        root.for_each_descendant(&mut |node| {
            for (name, _) in node.attributes() {
                if name.starts_with("v-") {
                    leftover.push(name);
                }
            }
        });
        assert!(leftover.is_empty(), "left: {leftover:?}");
        assert_eq!(compiler.bindings().len(), 2);
        assert_eq!(
            root.outer_html(),
            r#"<div><p title="t" class="on">x</p><button></button></div>"#
        );
    }

    #[test]
    fn children_of_bound_elements_are_compiled() {
        let vm = ViewModel::from_json(&json!({ "outer": "o", "inner": "i" }));
        let (root, compiler, _) = compile(
            r#"{ "tag": "div", "children": [
                { "tag": "section", "attrs": { "v-class": "outer" }, "children": [
                    { "tag": "span", "children": ["{{ inner }}"] }
                ] }
            ] }"#,
            &vm,
            &EngineConfig::default(),
        );

        assert_eq!(compiler.bindings().len(), 2);
        assert_eq!(root.text_content(), "i");
    }

    #[test]
    fn interpolation_replaces_whole_text() {
        let vm = ViewModel::from_json(&json!({ "name": "a" }));
        let (root, _, _) = compile(
            r#"{ "tag": "div", "children": ["Hello {{ name }}!"] }"#,
            &vm,
            &EngineConfig::default(),
        );
        assert_eq!(root.text_content(), "a");

        vm.set("name", "b").unwrap();
        assert_eq!(root.text_content(), "b");
    }

    #[test]
    fn invalid_expression_is_isolated_by_default() {
        let vm = ViewModel::from_json(&json!({ "a": "x" }));
        let (root, compiler, ctx) = compile(
            r#"{ "tag": "div", "children": [
                { "tag": "p", "attrs": { "v-text": "a..b" } },
                { "tag": "p", "attrs": { "v-text": "a" } }
            ] }"#,
            &vm,
            &EngineConfig::default(),
        );

        assert_eq!(compiler.bindings().len(), 1);
        let failures = ctx.take_failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], BindError::InvalidPath(_)));
        assert_eq!(root.text_content(), "x");
    }

    #[test]
    fn failure_propagates_without_isolation_and_reattaches() {
        let config = EngineConfig {
            isolate_failures: false,
            ..EngineConfig::default()
        };
        let vm = ViewModel::from_json(&json!({}));
        let root = Template::from_json(
            r#"{ "tag": "div", "children": [ { "tag": "p", "attrs": { "v-text": "" } } ] }"#,
        )
        .unwrap()
        .build();
        let ctx = Rc::new(ReactiveContext::new(&config));
        let mut compiler = Compiler::new(&config, ctx);

        assert!(compiler.compile(&root, &vm).is_err());
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn custom_prefix() {
        let config = EngineConfig {
            directive_prefix: "x-".into(),
            ..EngineConfig::default()
        };
        let vm = ViewModel::from_json(&json!({ "a": 1 }));
        let (root, compiler, _) = compile(
            r#"{ "tag": "div", "children": [
                { "tag": "p", "attrs": { "x-text": "a", "v-text": "a" } }
            ] }"#,
            &vm,
            &config,
        );

        assert_eq!(compiler.bindings().len(), 1);
        let p = root.first_child().unwrap();
        assert!(p.has_attribute("v-text"));
        assert_eq!(p.text_content(), "1");
    }
}
