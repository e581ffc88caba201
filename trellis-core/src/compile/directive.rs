//! Directive Handlers
//!
//! Maps each directive kind to its binding logic:
//!
//! - `text`, `html`, `class`: one subscriber driving an [`Updater`].
//! - `model`: a `Model` updater subscriber plus an `input` listener that
//!   writes the typed value back through the reactive proxy.
//! - `on:<event>`: a static listener calling a viewmodel method. No
//!   subscriber, no dependency tracking.

use std::cell::RefCell;
use std::rc::Rc;

use super::updater::Updater;
use crate::dom::Node;
use crate::error::Result;
use crate::reactive::{Path, ReactiveContext, Subscriber, Value};
use crate::viewmodel::ViewModel;

/// A recognized directive, taken from the attribute name after the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    Text,
    Html,
    Model,
    Class,
    /// Event binding; `None` when no event name follows the colon.
    On(Option<String>),
    /// Stripped from the markup but otherwise ignored.
    Unknown(String),
}

impl DirectiveKind {
    /// Parse the directive name (`text`, `on:click`, ...).
    ///
    /// Any name starting with `event_marker` is an event directive; the
    /// event type is the piece after the first colon.
    pub fn parse(name: &str, event_marker: &str) -> Self {
        if !event_marker.is_empty() && name.starts_with(event_marker) {
            let event = name
                .split(':')
                .nth(1)
                .filter(|event| !event.is_empty())
                .map(str::to_string);
            return DirectiveKind::On(event);
        }

        match name {
            "text" => DirectiveKind::Text,
            "html" => DirectiveKind::Html,
            "model" => DirectiveKind::Model,
            "class" => DirectiveKind::Class,
            other => DirectiveKind::Unknown(other.to_string()),
        }
    }

    /// The updater a data directive drives, if any.
    pub fn updater(&self) -> Option<Updater> {
        match self {
            DirectiveKind::Text => Some(Updater::Text),
            DirectiveKind::Html => Some(Updater::Html),
            DirectiveKind::Model => Some(Updater::Model),
            DirectiveKind::Class => Some(Updater::Class),
            DirectiveKind::On(_) | DirectiveKind::Unknown(_) => None,
        }
    }
}

/// Create the subscriber for one data binding and render it once.
pub fn bind(
    ctx: &Rc<ReactiveContext>,
    node: &Node,
    vm: &ViewModel,
    path: Path,
    updater: Updater,
) -> Result<Rc<Subscriber>> {
    let target = node.clone();
    let subscriber = Subscriber::new(
        Rc::clone(ctx),
        vm.data().clone(),
        path,
        move |value, old_value| {
            updater.apply(&target, value, old_value);
            Ok(())
        },
    )?;

    updater.apply(node, &subscriber.value(), &Value::Undefined);
    Ok(subscriber)
}

/// Bind a two-way `model` directive.
///
/// The `input` listener keeps its own cache of the last value it saw and
/// writes back only when the typed value differs from it.
pub fn bind_model(
    ctx: &Rc<ReactiveContext>,
    node: &Node,
    vm: &ViewModel,
    path: Path,
) -> Result<Rc<Subscriber>> {
    let subscriber = bind(ctx, node, vm, path.clone(), Updater::Model)?;

    let cache = RefCell::new(subscriber.value());
    let vm = vm.clone();
    node.add_event_listener("input", move |event| {
        let typed = Value::from(event.target().value());
        if *cache.borrow() == typed {
            return Ok(());
        }

        tracing::debug!(path = %path, value = ?typed, "model input");
        path.assign(vm.data(), typed.clone())?;
        *cache.borrow_mut() = typed;
        Ok(())
    });

    Ok(subscriber)
}

/// Attach the viewmodel method `method` as a listener for `event`.
///
/// Returns whether a listener was registered; a missing event name or
/// method registers nothing.
pub fn bind_event(node: &Node, vm: &ViewModel, event: Option<&str>, method: &str) -> bool {
    let (Some(event), Some(handler)) = (event, vm.method(method)) else {
        tracing::debug!(?event, method, "event directive skipped");
        return false;
    };

    let vm = vm.clone();
    node.add_event_listener(event, move |e| handler(&vm, e));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn parses_known_kinds() {
        assert_eq!(DirectiveKind::parse("text", "on"), DirectiveKind::Text);
        assert_eq!(DirectiveKind::parse("html", "on"), DirectiveKind::Html);
        assert_eq!(DirectiveKind::parse("model", "on"), DirectiveKind::Model);
        assert_eq!(DirectiveKind::parse("class", "on"), DirectiveKind::Class);
        assert_eq!(
            DirectiveKind::parse("show", "on"),
            DirectiveKind::Unknown("show".into())
        );
    }

    #[test]
    fn parses_event_names() {
        assert_eq!(
            DirectiveKind::parse("on:click", "on"),
            DirectiveKind::On(Some("click".into()))
        );
        assert_eq!(
            DirectiveKind::parse("on:click:extra", "on"),
            DirectiveKind::On(Some("click".into()))
        );
        assert_eq!(DirectiveKind::parse("onclick", "on"), DirectiveKind::On(None));
        assert_eq!(DirectiveKind::parse("on:", "on"), DirectiveKind::On(None));
    }

    #[test]
    fn bind_renders_immediately() {
        let ctx = Rc::new(ReactiveContext::default());
        let vm = ViewModel::from_json(&json!({ "msg": "hello" }));
        let node = Node::element("p");

        let path = Path::parse("msg").unwrap();
        let subscriber = bind(&ctx, &node, &vm, path, Updater::Text).unwrap();
        assert_eq!(node.text_content(), "hello");

        vm.set("msg", "bye").unwrap();
        assert_eq!(node.text_content(), "bye");
        drop(subscriber);
    }

    #[test]
    fn model_writes_back_only_on_change() {
        let ctx = Rc::new(ReactiveContext::default());
        let vm = ViewModel::from_json(&json!({ "msg": "" }));
        let input = Node::element("input");
        let _subscriber = bind_model(&ctx, &input, &vm, Path::parse("msg").unwrap()).unwrap();

        let writes = Rc::new(Cell::new(0));
        let writes_clone = writes.clone();
        let _watch = Subscriber::new(
            Rc::clone(&ctx),
            vm.data().clone(),
            Path::parse("msg").unwrap(),
            move |_, _| {
                writes_clone.set(writes_clone.get() + 1);
                Ok(())
            },
        )
        .unwrap();

        input.set_input_value("").unwrap();
        assert_eq!(writes.get(), 0);

        input.set_input_value("hi").unwrap();
        assert_eq!(writes.get(), 1);
        assert_eq!(vm.get("msg").unwrap(), Value::from("hi"));
        assert_eq!(input.value(), "hi");
    }

    #[test]
    fn event_binding_requires_event_and_method() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let vm = ViewModel::from_json(&json!({})).with_method("go", move |_, _| {
            calls_clone.set(calls_clone.get() + 1);
            Ok(())
        });
        let button = Node::element("button");

        assert!(!bind_event(&button, &vm, None, "go"));
        assert!(!bind_event(&button, &vm, Some("click"), "missing"));
        assert!(bind_event(&button, &vm, Some("click"), "go"));

        button.dispatch_event("click").unwrap();
        assert_eq!(calls.get(), 1);
    }
}
