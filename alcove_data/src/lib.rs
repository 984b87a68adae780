//! Shared data model for Alcove content.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_content};
