//! Document Nodes
//!
//! An in-memory element tree standing in for the host document. It exposes
//! exactly the capabilities the binding engine calls into: node creation and
//! removal, attribute read/remove, text/markup/value assignment, and event
//! listener registration and dispatch.
//!
//! Nodes are shared handles; a child refers to its parent weakly.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::error::Result;

/// What kind of node this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Detached container; appending it moves its children instead.
    Fragment,
    /// Opaque markup assigned through [`Node::set_inner_html`].
    Markup,
}

/// Event listener callback.
pub type Listener = Rc<dyn Fn(&Event) -> Result<()>>;

/// A dispatched event.
#[derive(Clone)]
pub struct Event {
    event_type: String,
    target: Node,
}

impl Event {
    pub fn new(event_type: impl Into<String>, target: Node) -> Self {
        Self {
            event_type: event_type.into(),
            target,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> &Node {
        &self.target
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.event_type)
            .field("target", &self.target.tag_name())
            .finish()
    }
}

struct NodeData {
    kind: NodeKind,
    tag: String,
    /// Text for text nodes, raw markup for markup nodes.
    text: String,
    attributes: IndexMap<String, String>,
    /// The form `value` property, distinct from the `value` attribute.
    value: String,
    children: Vec<Node>,
    parent: Weak<RefCell<NodeData>>,
    listeners: IndexMap<String, Vec<Listener>>,
    /// Bumped on every mutation of this node's own state.
    revision: u64,
}

impl NodeData {
    fn new(kind: NodeKind, tag: &str, text: &str) -> Self {
        Self {
            kind,
            tag: tag.to_ascii_lowercase(),
            text: text.to_string(),
            attributes: IndexMap::new(),
            value: String::new(),
            children: Vec::new(),
            parent: Weak::new(),
            listeners: IndexMap::new(),
            revision: 0,
        }
    }
}

/// Shared handle to a document node.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
    pub fn element(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(NodeData::new(NodeKind::Element, tag, ""))))
    }

    pub fn text(text: &str) -> Self {
        Self(Rc::new(RefCell::new(NodeData::new(NodeKind::Text, "", text))))
    }

    pub fn fragment() -> Self {
        Self(Rc::new(RefCell::new(NodeData::new(NodeKind::Fragment, "", ""))))
    }

    fn markup(markup: &str) -> Self {
        Self(Rc::new(RefCell::new(NodeData::new(NodeKind::Markup, "", markup))))
    }

    pub fn kind(&self) -> NodeKind {
        self.0.borrow().kind
    }

    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    pub fn is_text(&self) -> bool {
        self.kind() == NodeKind::Text
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Mutation counter for this node.
    ///
    /// Every change to the node's attributes, form value, text or child
    /// list increments it by one. Descendants keep their own counters.
    pub fn revision(&self) -> u64 {
        self.0.borrow().revision
    }

    /// Lowercase tag name; empty for non-elements.
    pub fn tag_name(&self) -> String {
        self.0.borrow().tag.clone()
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut data = self.0.borrow_mut();
        data.attributes.insert(name.to_string(), value.to_string());
        data.revision += 1;
    }

    /// Remove an attribute, keeping the order of the others.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let mut data = self.0.borrow_mut();
        let removed = data.attributes.shift_remove(name);
        if removed.is_some() {
            data.revision += 1;
        }
        removed
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.borrow().attributes.contains_key(name)
    }

    /// Snapshot of `(name, value)` pairs in document order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0
            .borrow()
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// The `class` attribute, empty when absent.
    pub fn class_name(&self) -> String {
        self.get_attribute("class").unwrap_or_default()
    }

    pub fn set_class_name(&self, class: &str) {
        self.set_attribute("class", class);
    }

    /// Whether the whitespace-separated class list contains `token`.
    pub fn has_class(&self, token: &str) -> bool {
        self.class_name().split_whitespace().any(|c| c == token)
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// The form value property.
    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    pub fn set_value(&self, value: &str) {
        let mut data = self.0.borrow_mut();
        data.value = value.to_string();
        data.revision += 1;
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match data.kind {
            NodeKind::Text | NodeKind::Markup => data.text.clone(),
            NodeKind::Element | NodeKind::Fragment => {
                data.children.iter().map(Node::text_content).collect()
            }
        }
    }

    /// Replace the text of a text node, or all children of an element with
    /// a single text node.
    pub fn set_text_content(&self, text: &str) {
        match self.kind() {
            NodeKind::Text | NodeKind::Markup => {
                let mut data = self.0.borrow_mut();
                data.text = text.to_string();
                data.revision += 1;
            }
            NodeKind::Element | NodeKind::Fragment => {
                self.take_children();
                if !text.is_empty() {
                    self.append_child(&Node::text(text));
                }
            }
        }
    }

    /// Serialized markup of the children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.write_html(&mut out);
        }
        out
    }

    /// Replace all children with the given markup, stored verbatim.
    pub fn set_inner_html(&self, markup: &str) {
        self.take_children();
        if !markup.is_empty() {
            self.append_child(&Node::markup(markup));
        }
    }

    /// Serialized markup of this node.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        match data.kind {
            NodeKind::Text => out.push_str(&escape_text(&data.text)),
            NodeKind::Markup => out.push_str(&data.text),
            NodeKind::Fragment => {
                for child in &data.children {
                    child.write_html(out);
                }
            }
            NodeKind::Element => {
                out.push('<');
                out.push_str(&data.tag);
                for (name, value) in &data.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                for child in &data.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&data.tag);
                out.push('>');
            }
        }
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.borrow().children.first().cloned()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    /// Append `child`, detaching it from its current parent first.
    ///
    /// Appending a fragment moves the fragment's children instead.
    pub fn append_child(&self, child: &Node) {
        if child.kind() == NodeKind::Fragment {
            for grandchild in child.take_children() {
                self.append_child(&grandchild);
            }
            return;
        }

        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        let mut data = self.0.borrow_mut();
        data.children.push(child.clone());
        data.revision += 1;
    }

    /// Remove `child` from this node. Returns whether it was a child.
    pub fn remove_child(&self, child: &Node) -> bool {
        let removed = {
            let mut data = self.0.borrow_mut();
            let before = data.children.len();
            data.children.retain(|c| !c.ptr_eq(child));
            let removed = before != data.children.len();
            if removed {
                data.revision += 1;
            }
            removed
        };
        if removed {
            child.0.borrow_mut().parent = Weak::new();
        }
        removed
    }

    /// Detach this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// Remove and return all children.
    pub fn take_children(&self) -> Vec<Node> {
        let children = {
            let mut data = self.0.borrow_mut();
            if !data.children.is_empty() {
                data.revision += 1;
            }
            std::mem::take(&mut data.children)
        };
        for child in &children {
            child.0.borrow_mut().parent = Weak::new();
        }
        children
    }

    /// Depth-first search over this node and its descendants.
    pub fn find(&self, predicate: &dyn Fn(&Node) -> bool) -> Option<Node> {
        if predicate(self) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find(predicate))
    }

    /// Visit this node and every descendant, depth first.
    pub fn for_each_descendant(&self, visit: &mut dyn FnMut(&Node)) {
        visit(self);
        for child in self.children() {
            child.for_each_descendant(visit);
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_event_listener<F>(&self, event_type: &str, listener: F)
    where
        F: Fn(&Event) -> Result<()> + 'static,
    {
        self.0
            .borrow_mut()
            .listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Rc::new(listener));
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.0
            .borrow()
            .listeners
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Run every listener for `event_type` in registration order.
    ///
    /// All listeners run even if one fails; the first error is returned.
    pub fn dispatch_event(&self, event_type: &str) -> Result<()> {
        let listeners = self
            .0
            .borrow()
            .listeners
            .get(event_type)
            .cloned()
            .unwrap_or_default();

        let event = Event::new(event_type, self.clone());
        let mut first_error = None;
        for listener in listeners {
            if let Err(err) = listener(&event) {
                tracing::warn!(event = event_type, error = %err, "event listener failed");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Simulate the user typing `value`: set the value property, then
    /// dispatch `input`.
    pub fn set_input_value(&self, value: &str) -> Result<()> {
        self.set_value(value);
        self.dispatch_event("input")
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Element => write!(f, "Element(<{}>)", self.tag_name()),
            NodeKind::Text => write!(f, "Text({:?})", self.text_content()),
            NodeKind::Fragment => write!(f, "Fragment({} children)", self.child_count()),
            NodeKind::Markup => write!(f, "Markup({:?})", self.text_content()),
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
