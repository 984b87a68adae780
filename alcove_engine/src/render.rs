//! Renders parsed templates to display text for one player context.

use thiserror::Error;

use crate::condition::{Condition, EvalError};
use crate::context::Context;
use crate::item_list::{join_members, split_plain};
use crate::markup::{Node, NodeKind, ParseError, parse};

/// Rendering fails as a whole; no partial output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Render a template against a context.
///
/// Sentences holding an item list with no members are dropped entirely, and
/// the surviving sentences are joined with single spaces.
///
/// ```
/// use alcove_engine::{Context, render};
///
/// let ctx = Context::new().with("player.intelligence", 6);
/// let template = "<desc><s>A dusty room.</s> \
///     <if cond=\"player.intelligence >= 5\"><s>A draft comes from the wall.</s></if> \
///     <s>On the floor is <il></il>.</s></desc>";
/// assert_eq!(render(template, &ctx).unwrap(), "A dusty room. A draft comes from the wall.");
/// ```
///
/// # Errors
/// Returns a [`RenderError`] if the template does not parse or a condition
/// or variable cannot be resolved.
pub fn render(template: &str, ctx: &Context) -> Result<String, RenderError> {
    let root = parse(template)?;
    render_node(&root, ctx)
}

/// Render an already parsed tree.
///
/// # Errors
/// Returns [`RenderError::Eval`] for unresolvable conditions or variables.
pub fn render_node(root: &Node, ctx: &Context) -> Result<String, RenderError> {
    let mut units = Units::default();
    collect(root, ctx, &mut units)?;
    units.flush();
    Ok(units.done.join(" "))
}

/// Parse and evaluate a standalone condition expression.
///
/// # Errors
/// Syntax errors surface as [`RenderError::Parse`], evaluation errors as
/// [`RenderError::Eval`].
pub fn evaluate(expr: &str, ctx: &Context) -> Result<bool, RenderError> {
    let condition = Condition::parse(expr).map_err(|source| ParseError::Condition { offset: 0, source })?;
    Ok(condition.evaluate(ctx)?)
}

/// Output units: finished sentences plus runs of loose top-level text.
#[derive(Default)]
struct Units {
    done: Vec<String>,
    pending: String,
}

impl Units {
    fn flush(&mut self) {
        let text = self.pending.trim();
        if !text.is_empty() {
            self.done.push(text.to_string());
        }
        self.pending.clear();
    }

    fn sentence(&mut self, text: &str) {
        self.flush();
        let text = text.trim();
        if !text.is_empty() {
            self.done.push(text.to_string());
        }
    }
}

fn collect(node: &Node, ctx: &Context, units: &mut Units) -> Result<(), EvalError> {
    match &node.kind {
        NodeKind::Wrapper { children } => {
            for child in children {
                collect(child, ctx, units)?;
            }
        },
        NodeKind::Conditional { condition, children } => {
            if condition.evaluate(ctx)? {
                for child in children {
                    collect(child, ctx, units)?;
                }
            }
        },
        NodeKind::Sentence { children } => {
            let mut text = String::new();
            if render_inline(children, ctx, &mut text)? {
                units.sentence(&text);
            } else {
                units.flush();
            }
        },
        NodeKind::Text { .. } | NodeKind::ItemList { .. } | NodeKind::ItemEntry { .. } | NodeKind::Var { .. } => {
            let mut text = String::new();
            if render_inline(std::slice::from_ref(node), ctx, &mut text)? {
                units.pending.push_str(&text);
            }
        },
    }
    Ok(())
}

/// Render inline content into `out`. Returns `false` when an item list
/// resolved to no members, which elides the enclosing sentence.
fn render_inline(nodes: &[Node], ctx: &Context, out: &mut String) -> Result<bool, EvalError> {
    let mut keep = true;
    for node in nodes {
        match &node.kind {
            NodeKind::Text { raw } => out.push_str(raw),
            NodeKind::ItemEntry { text } => out.push_str(text),
            NodeKind::Var { path } => match ctx.get(path) {
                Some(value) => out.push_str(&value.to_string()),
                None => return Err(EvalError::UnknownPath { path: path.clone() }),
            },
            NodeKind::Conditional { condition, children } => {
                if condition.evaluate(ctx)? {
                    keep &= render_inline(children, ctx, out)?;
                }
            },
            NodeKind::ItemList { children, .. } => {
                let members = list_members(children, ctx)?;
                if members.is_empty() {
                    keep = false;
                } else {
                    out.push_str(&join_members(&members));
                }
            },
            NodeKind::Wrapper { children } | NodeKind::Sentence { children } => {
                keep &= render_inline(children, ctx, out)?;
            },
        }
    }
    Ok(keep)
}

/// Resolve a list's members: entries plus untagged phrases of its text,
/// after dropping false conditionals.
fn list_members(children: &[Node], ctx: &Context) -> Result<Vec<String>, EvalError> {
    let mut members = Vec::new();
    let mut loose = String::new();
    gather_members(children, ctx, &mut members, &mut loose)?;
    members.extend(split_plain(&loose).into_iter().map(str::to_string));
    Ok(members)
}

fn gather_members(
    children: &[Node],
    ctx: &Context,
    members: &mut Vec<String>,
    loose: &mut String,
) -> Result<(), EvalError> {
    for child in children {
        match &child.kind {
            NodeKind::ItemEntry { text } => {
                members.extend(split_plain(loose).into_iter().map(str::to_string));
                loose.clear();
                let text = text.trim();
                if !text.is_empty() {
                    members.push(text.to_string());
                }
            },
            NodeKind::Text { raw } => loose.push_str(raw),
            NodeKind::Conditional { condition, children } => {
                if condition.evaluate(ctx)? {
                    gather_members(children, ctx, members, loose)?;
                }
            },
            _ => {},
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::new()
            .with("player.intelligence", 4)
            .with("player.talent", "Iris")
            .with("this.uses", 3)
    }

    #[test]
    fn sentences_join_with_single_spaces() {
        assert_eq!(
            render("<desc>\n  <s>One.</s>\n\n  <s> Two. </s></desc>", &ctx()).unwrap(),
            "One. Two."
        );
    }

    #[test]
    fn empty_list_elides_sentence() {
        assert_eq!(render("<s>A.</s> <s>B <il></il>.</s>", &ctx()).unwrap(), "A.");
    }

    #[test]
    fn list_emptied_by_conditionals_elides_sentence() {
        let template = r#"<s>A.</s><s>You find <il><if cond="player.intelligence > 10"><item>a MAP</item></if></il>.</s>"#;
        assert_eq!(render(template, &ctx()).unwrap(), "A.");
    }

    #[test]
    fn conditional_members_rejoin_connectors() {
        let template = r#"<s>On the wall hang <il><item>a SAW</item>, <if cond="player.talent != 'Iris'"><item>a HAMMER</item>, </if>and <item>a pair of HEDGE TRIMMERS</item></il>.</s>"#;
        assert_eq!(
            render(template, &ctx()).unwrap(),
            "On the wall hang a SAW and a pair of HEDGE TRIMMERS."
        );
        let iris_free = Context::new().with("player.talent", "Kyra");
        assert_eq!(
            render(template, &iris_free).unwrap(),
            "On the wall hang a SAW, a HAMMER, and a pair of HEDGE TRIMMERS."
        );
    }

    #[test]
    fn conditionals_splice_without_spacing() {
        let template = r#"<s>The lock is <if cond="player.intelligence >= 5">simple</if><if cond="player.intelligence < 5">baffling</if>.</s>"#;
        assert_eq!(render(template, &ctx()).unwrap(), "The lock is baffling.");
    }

    #[test]
    fn vars_print_context_values() {
        assert_eq!(
            render(r#"<s>It has <var v="this.uses"/> uses left.</s>"#, &ctx()).unwrap(),
            "It has 3 uses left."
        );
        assert_eq!(
            render(r#"<s><var v="this.charges"></s>"#, &ctx()),
            Err(RenderError::Eval(EvalError::UnknownPath {
                path: "this.charges".into()
            }))
        );
    }

    #[test]
    fn loose_text_outside_sentences_is_kept() {
        assert_eq!(render("Just prose,   <s>then a sentence.</s>", &ctx()).unwrap(), "Just prose, then a sentence.");
    }

    #[test]
    fn unknown_condition_path_fails_the_render() {
        let err = render(r#"<if cond="player.luck > 2"><s>Lucky.</s></if>"#, &ctx()).unwrap_err();
        assert!(matches!(err, RenderError::Eval(EvalError::UnknownPath { .. })));
    }

    #[test]
    fn standalone_evaluate() {
        assert_eq!(evaluate("player.talent == 'Iris'", &ctx()), Ok(true));
        assert!(matches!(evaluate("player.talent", &ctx()), Err(RenderError::Parse(_))));
    }
}
