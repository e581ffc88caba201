//! Document Tree
//!
//! The host document the engine renders into. The engine only creates,
//! moves and removes nodes, reads and removes attributes, assigns
//! text/markup/value, and registers event listeners.

mod document;
mod node;
mod template;

pub use document::Document;
pub use node::{Event, Listener, Node, NodeKind};
pub use template::Template;
