//! Description markup: tokenizer and block parser.
//!
//! Alcove content is authored as marked-up template strings. The markup is a
//! small XML-flavoured tag set that the renderer resolves against a player
//! [`Context`](crate::Context) and the item-list mutator rewrites in place.
//!
//! # Syntax
//! - `<desc>...</desc>` wraps one full description. Redundant nesting
//!   (`<desc><desc>...</desc></desc>`) collapses into one wrapper.
//! - `<s>...</s>` is one sentence, the unit of rendering and elision.
//! - `<if cond="player.intelligence >= 5">...</if>` includes its contents only
//!   when the comparison holds. `condition=` is accepted as a synonym.
//! - `<il>...</il>` / `<il name="LEFT POCKET">...</il>` is an item list.
//! - `<item>...</item>` marks one itemized phrase inside a list; untagged
//!   phrases in a list are members too.
//! - `<var v="this.uses">` / `<var v="this.uses" />` prints a context value.
//!
//! A `<` only opens a tag when a known tag name follows it directly, so prose
//! such as `x < 3 && x > -2` or unknown tags like `<b>` stay literal text.
//! Malformed markup is reported as a [`ParseError`], never repaired.

mod scan;
mod tree;

use thiserror::Error;

use crate::condition::ConditionSyntaxError;

pub use scan::{Attr, TagName, Token, tokenize};
pub use tree::{Node, NodeKind, Span};

/// Errors raised while tokenizing or parsing description markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated <{tag}> tag starting at byte {offset}")]
    UnterminatedTag { tag: &'static str, offset: usize },
    #[error("malformed <{tag}> tag at byte {offset}: {reason}")]
    MalformedTag {
        tag: &'static str,
        offset: usize,
        reason: &'static str,
    },
    #[error("<{tag}> tag at byte {offset} is missing its '{attr}' attribute")]
    MissingAttribute {
        tag: &'static str,
        attr: &'static str,
        offset: usize,
    },
    #[error("<{tag}> opened at byte {offset} is never closed")]
    Unclosed { tag: &'static str, offset: usize },
    #[error("</{found}> at byte {offset} does not close the open <{expected}>")]
    MismatchedClose {
        expected: &'static str,
        found: &'static str,
        offset: usize,
    },
    #[error("</{tag}> at byte {offset} has no matching open tag")]
    UnexpectedClose { tag: &'static str, offset: usize },
    #[error("<{tag}> at byte {offset} is not allowed inside <{parent}>")]
    Misplaced {
        tag: &'static str,
        parent: &'static str,
        offset: usize,
    },
    #[error("invalid condition in <if> at byte {offset}: {source}")]
    Condition {
        offset: usize,
        #[source]
        source: ConditionSyntaxError,
    },
}

/// Parse a template into its node tree.
///
/// The returned root is always a [`NodeKind::Wrapper`]; templates without an
/// explicit `<desc>` are wrapped implicitly.
///
/// # Errors
/// Returns a [`ParseError`] for unterminated or mismatched tags, missing
/// attributes, misplaced elements, or invalid condition expressions.
pub fn parse(template: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(template)?;
    tree::build(template, tokens)
}
