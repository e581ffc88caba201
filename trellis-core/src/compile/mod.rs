//! Directive Compilation
//!
//! Turns a template's directive attributes and text interpolations into
//! live bindings.
//!
//! # Directive Syntax
//!
//! | Markup                   | Effect                                      |
//! |--------------------------|---------------------------------------------|
//! | `v-text="path"`          | text content follows `path`                 |
//! | `v-html="path"`          | inner markup follows `path` (unsanitized)   |
//! | `v-class="path"`         | class token follows `path`                  |
//! | `v-model="path"`         | form value follows `path`; input writes back|
//! | `v-on:click="method"`    | `click` calls viewmodel method `method`     |
//! | `{{ path }}` (in text)   | whole text node follows `path`              |
//!
//! The prefix, event marker and interpolation delimiters come from
//! [`EngineConfig`](crate::config::EngineConfig).

mod compiler;
mod directive;
mod interpolation;
mod updater;

pub use compiler::Compiler;
pub use directive::{bind, bind_event, bind_model, DirectiveKind};
pub use interpolation::find_interpolation;
pub use updater::{class_updater, html_updater, model_updater, text_updater, Updater};
