//! View Updaters
//!
//! Pure functions applying a resolved value to a node. Each runs once at
//! compile time and again on every change of the bound value.

use crate::dom::Node;
use crate::reactive::Value;

/// Which updater a binding drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Updater {
    Text,
    Html,
    Class,
    Model,
}

impl Updater {
    pub fn apply(self, node: &Node, value: &Value, old_value: &Value) {
        match self {
            Updater::Text => text_updater(node, value),
            Updater::Html => html_updater(node, value),
            Updater::Class => class_updater(node, value, old_value),
            Updater::Model => model_updater(node, value),
        }
    }
}

/// Set the text content; `Undefined` and `Null` render as the empty string.
pub fn text_updater(node: &Node, value: &Value) {
    node.set_text_content(&value.to_view_string());
}

/// Set the inner markup verbatim; `Undefined` and `Null` render as the
/// empty string.
pub fn html_updater(node: &Node, value: &Value) {
    node.set_inner_html(&value.to_view_string());
}

/// Swap the previously applied class token for the new one.
///
/// The first occurrence of the old token is cut from the class string and a
/// single trailing whitespace character is trimmed. The new value is then
/// appended, separated by a space only when both sides are non-empty.
///
/// Unlike the other updaters, `Null` is stringified (`"null"`); only
/// `Undefined` counts as no token.
pub fn class_updater(node: &Node, value: &Value, old_value: &Value) {
    let mut class_name = node.class_name();

    let old = class_token(old_value);
    if !old.is_empty() {
        if let Some(pos) = class_name.find(&old) {
            class_name.replace_range(pos..pos + old.len(), "");
        }
    }
    if class_name.ends_with(char::is_whitespace) {
        class_name.pop();
    }

    let value = class_token(value);
    if !class_name.is_empty() && !value.is_empty() {
        class_name.push(' ');
    }
    class_name.push_str(&value);

    node.set_class_name(&class_name);
}

fn class_token(value: &Value) -> String {
    match value {
        Value::Undefined => String::new(),
        other => other.to_string(),
    }
}

/// Set the form value property; `Undefined` and `Null` render as the empty
/// string.
pub fn model_updater(node: &Node, value: &Value) {
    node.set_value(&value.to_view_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_updater_maps_absent_values_to_empty() {
        let node = Node::element("p");
        text_updater(&node, &Value::from("a"));
        assert_eq!(node.text_content(), "a");

        text_updater(&node, &Value::Undefined);
        assert_eq!(node.text_content(), "");

        text_updater(&node, &Value::Null);
        assert_eq!(node.text_content(), "");
    }

    #[test]
    fn html_updater_is_unsanitized() {
        let node = Node::element("div");
        html_updater(&node, &Value::from("<i>x</i>"));
        assert_eq!(node.inner_html(), "<i>x</i>");

        html_updater(&node, &Value::Null);
        assert_eq!(node.inner_html(), "");
    }

    #[test]
    fn class_updater_swaps_tokens() {
        let node = Node::element("div");
        node.set_class_name("a b");

        class_updater(&node, &Value::from("c"), &Value::from("b"));
        assert_eq!(node.class_name(), "a c");
    }

    #[test]
    fn class_updater_initial_render_appends() {
        let node = Node::element("div");
        class_updater(&node, &Value::from("x"), &Value::Undefined);
        assert_eq!(node.class_name(), "x");

        node.set_class_name("a");
        class_updater(&node, &Value::from("x"), &Value::Undefined);
        assert_eq!(node.class_name(), "a x");
    }

    #[test]
    fn class_updater_clearing_value() {
        let node = Node::element("div");
        node.set_class_name("a b");
        class_updater(&node, &Value::from(""), &Value::from("b"));
        assert_eq!(node.class_name(), "a");
    }

    #[test]
    fn model_updater_sets_value_property() {
        let node = Node::element("input");
        model_updater(&node, &Value::from(5));
        assert_eq!(node.value(), "5");
        model_updater(&node, &Value::Undefined);
        assert_eq!(node.value(), "");
        model_updater(&node, &Value::from(5));
        model_updater(&node, &Value::Null);
        assert_eq!(node.value(), "");
    }

    #[test]
    fn class_updater_stringifies_null() {
        let node = Node::element("div");
        node.set_class_name("a");
        class_updater(&node, &Value::Null, &Value::Undefined);
        assert_eq!(node.class_name(), "a null");

        class_updater(&node, &Value::from("b"), &Value::Null);
        assert_eq!(node.class_name(), "a b");
    }
}
