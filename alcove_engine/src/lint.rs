//! Authoring checks over a whole `ContentDef`.
//!
//! Combines the data-level validation from `alcove_data` with checks that
//! need the engine: every template parses, placements point at lists that
//! exist, and (given a sample context) every template renders.

use std::collections::BTreeSet;

use alcove_data::{ContentDef, DescriptionDef, ValidationError, validate_content};
use log::debug;
use thiserror::Error;

use crate::condition::EvalError;
use crate::context::Context;
use crate::markup::{Node, ParseError, parse};
use crate::render::{RenderError, render_node};

/// One problem found by [`lint_content`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintIssue {
    #[error(transparent)]
    Content(ValidationError),
    #[error("{location}: {source}")]
    Markup { location: String, source: ParseError },
    #[error("{location}: reads unknown context path '{path}'")]
    UnknownPath { location: String, path: String },
    #[error("{location}: {source}")]
    Render { location: String, source: EvalError },
    #[error("placement of '{item}' targets list '{list}', which '{container}' does not have")]
    MissingList {
        container: String,
        list: String,
        item: String,
    },
    #[error("placement of '{item}' targets '{container}', whose description has no item list")]
    NoList { container: String, item: String },
}

/// Run every check and collect the issues in content order.
pub fn lint_content(content: &ContentDef, ctx: Option<&Context>) -> Vec<LintIssue> {
    let mut issues: Vec<LintIssue> = validate_content(content).into_iter().map(LintIssue::Content).collect();

    for desc in &content.descriptions {
        for (solved, template) in templates(desc) {
            let location = location(desc, solved);
            match parse(template) {
                Ok(root) => {
                    if let Some(ctx) = ctx {
                        check_render(&root, ctx, &location, &mut issues);
                    }
                },
                Err(source) => issues.push(LintIssue::Markup { location, source }),
            }
        }
    }

    for placement in &content.placements {
        let Some(container) = content.description(&placement.container) else {
            continue;
        };
        let roots: Vec<Node> = templates(container)
            .into_iter()
            .filter_map(|(_, template)| parse(template).ok())
            .collect();
        if roots.is_empty() {
            continue;
        }

        let wanted = placement.list.as_deref().map(str::trim).filter(|l| !l.is_empty());
        let found = roots.iter().any(|root| match wanted {
            Some(wanted) => root.list_names().iter().any(|name| name.eq_ignore_ascii_case(wanted)),
            None => !root.item_lists().is_empty(),
        });
        if !found {
            issues.push(match wanted {
                Some(list) => LintIssue::MissingList {
                    container: container.id.clone(),
                    list: list.to_string(),
                    item: placement.item.clone(),
                },
                None => LintIssue::NoList {
                    container: container.id.clone(),
                    item: placement.item.clone(),
                },
            });
        }
    }

    debug!("lint found {} issue(s)", issues.len());
    issues
}

fn templates(desc: &DescriptionDef) -> Vec<(bool, &str)> {
    let mut out = vec![(false, desc.text.as_str())];
    if let Some(solved) = &desc.solved_text {
        out.push((true, solved.as_str()));
    }
    out
}

fn location(desc: &DescriptionDef, solved: bool) -> String {
    if solved {
        format!("{} '{}' (solved)", desc.kind.as_str(), desc.id)
    } else {
        format!("{} '{}'", desc.kind.as_str(), desc.id)
    }
}

/// Report unknown paths up front; only fully resolvable templates are rendered.
fn check_render(root: &Node, ctx: &Context, location: &str, issues: &mut Vec<LintIssue>) {
    let unknown: BTreeSet<&str> = root.context_paths().into_iter().filter(|p| !ctx.contains(p)).collect();
    if !unknown.is_empty() {
        issues.extend(unknown.into_iter().map(|path| LintIssue::UnknownPath {
            location: location.to_string(),
            path: path.to_string(),
        }));
        return;
    }
    match render_node(root, ctx) {
        Ok(_) => {},
        Err(RenderError::Eval(source)) => issues.push(LintIssue::Render {
            location: location.to_string(),
            source,
        }),
        Err(RenderError::Parse(source)) => issues.push(LintIssue::Markup {
            location: location.to_string(),
            source,
        }),
    }
}
