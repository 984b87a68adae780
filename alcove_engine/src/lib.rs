#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! Alcove: description templates and item lists for text-adventure content.
//!
//! Descriptions are authored as marked-up templates. [`render`] turns one into
//! display text for a player [`Context`], and [`add_item`] / [`remove_item`]
//! rewrite a template's item list as items enter or leave a container.

pub const ALCOVE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod condition;
pub mod config;
pub mod context;
pub mod data_paths;
pub mod item_list;
pub mod lint;
pub mod loader;
pub mod markup;
pub mod render;
pub mod style;

pub use condition::{Condition, EvalError, Operator};
pub use context::{Context, Value};
pub use item_list::{Mutation, NoOpReason, add_item, plan_add_item, plan_remove_item, remove_item};
pub use lint::{LintIssue, lint_content};
pub use markup::{Node, NodeKind, ParseError, parse};
pub use render::{RenderError, evaluate, render, render_node};

pub use alcove_data::{ItemDescriptor, Quantity};
