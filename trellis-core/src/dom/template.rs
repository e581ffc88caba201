//! JSON Templates
//!
//! Templates are described as JSON: a string is a text node, an object is
//! an element with optional attributes and children.
//!
//! ```json
//! { "tag": "div", "attrs": { "id": "app" }, "children": [
//!     { "tag": "p", "children": ["{{ user.name }}"] }
//! ] }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::node::Node;
use crate::error::{BindError, Result};

/// A declarative element-tree template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Template {
    /// A text node.
    Text(String),
    /// An element.
    Element {
        tag: String,
        #[serde(default)]
        attrs: IndexMap<String, String>,
        #[serde(default)]
        children: Vec<Template>,
    },
}

impl Template {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(BindError::Template)
    }

    /// Build a detached node tree.
    pub fn build(&self) -> Node {
        match self {
            Template::Text(text) => Node::text(text),
            Template::Element {
                tag,
                attrs,
                children,
            } => {
                let element = Node::element(tag);
                for (name, value) in attrs {
                    element.set_attribute(name, value);
                }
                for child in children {
                    element.append_child(&child.build());
                }
                element
            }
        }
    }
}
