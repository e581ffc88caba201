//! Documents
//!
//! A [`Document`] owns a `body` element and answers simple selector queries.
//! Supported selectors: `#id`, `.class`, and bare tag names.

use super::node::Node;
use super::template::Template;
use crate::error::Result;

/// Root of an element tree.
#[derive(Debug, Clone)]
pub struct Document {
    body: Node,
}

impl Document {
    pub fn new() -> Self {
        Self {
            body: Node::element("body"),
        }
    }

    /// Create a document whose body contains the built template.
    pub fn from_template(template: &Template) -> Self {
        let document = Self::new();
        document.body.append_child(&template.build());
        document
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_template(&Template::from_json(json)?))
    }

    pub fn body(&self) -> &Node {
        &self.body
    }

    /// First element matching `selector`, depth first from the body.
    pub fn query_selector(&self, selector: &str) -> Option<Node> {
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }

        self.body.find(&|node| node.is_element() && matches(node, selector))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(node: &Node, selector: &str) -> bool {
    if let Some(id) = selector.strip_prefix('#') {
        node.get_attribute("id").as_deref() == Some(id)
    } else if let Some(class) = selector.strip_prefix('.') {
        node.has_class(class)
    } else {
        node.tag_name().eq_ignore_ascii_case(selector)
    }
}
