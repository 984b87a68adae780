//! Loaders for authored content and sample player contexts.
//!
//! Content lives in a RON `ContentDef`; sample contexts used by the CLI and the
//! lint pass are JSON or TOML documents flattened to dotted paths.

pub mod content;
pub mod context;

pub use content::load_content;
pub use context::load_context;
