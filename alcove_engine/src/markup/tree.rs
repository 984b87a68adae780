//! Block parser: token stream to node tree.

use log::debug;

use super::scan::{Attr, TagName, Token};
use super::ParseError;
use crate::condition::Condition;
use crate::context::is_valid_path;

/// Byte range into a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    pub fn slice(self, source: &str) -> &str {
        &source[self.range()]
    }

    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }
}

/// A parsed markup element.
///
/// `span` covers the whole element including its tags; `inner` covers only the
/// content between the opening and closing tag. For text nodes both are equal,
/// and for void elements `inner` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub inner: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Wrapper { children: Vec<Node> },
    Sentence { children: Vec<Node> },
    Conditional { condition: Condition, children: Vec<Node> },
    ItemList { name: Option<String>, children: Vec<Node> },
    ItemEntry { text: String },
    Var { path: String },
    Text { raw: String },
}

impl Node {
    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Wrapper { children }
            | NodeKind::Sentence { children }
            | NodeKind::Conditional { children, .. }
            | NodeKind::ItemList { children, .. } => children,
            NodeKind::ItemEntry { .. } | NodeKind::Var { .. } | NodeKind::Text { .. } => &[],
        }
    }

    /// True for a text node made only of whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(&self.kind, NodeKind::Text { raw } if raw.trim().is_empty())
    }

    pub fn is_wrapper(&self) -> bool {
        matches!(self.kind, NodeKind::Wrapper { .. })
    }

    /// Visit this node and all descendants in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Every context path this template reads, from conditions and variables.
    pub fn context_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.walk(&mut |node| match &node.kind {
            NodeKind::Conditional { condition, .. } => paths.push(condition.path.as_str()),
            NodeKind::Var { path } => paths.push(path.as_str()),
            _ => {},
        });
        paths
    }

    /// All item lists in document order.
    pub fn item_lists(&self) -> Vec<&Node> {
        let mut lists = Vec::new();
        self.walk(&mut |node| {
            if matches!(node.kind, NodeKind::ItemList { .. }) {
                lists.push(node);
            }
        });
        lists
    }

    /// Names of the named item lists in document order.
    pub fn list_names(&self) -> Vec<&str> {
        self.item_lists()
            .into_iter()
            .filter_map(|list| match &list.kind {
                NodeKind::ItemList { name: Some(name), .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Element data captured at the opening tag, completed when it closes.
enum Pending {
    Root,
    Desc,
    Sentence,
    If(Condition),
    List(Option<String>),
    Item,
}

struct Frame {
    tag: Option<TagName>,
    pending: Pending,
    open: Span,
    children: Vec<Node>,
}

pub(super) fn build(template: &str, tokens: Vec<Token<'_>>) -> Result<Node, ParseError> {
    let mut stack = vec![Frame {
        tag: None,
        pending: Pending::Root,
        open: Span::new(0, 0),
        children: Vec::new(),
    }];

    for token in tokens {
        match token {
            Token::Text { text, span } => {
                top(&mut stack).children.push(Node {
                    kind: NodeKind::Text { raw: text.to_string() },
                    span,
                    inner: span,
                });
            },
            Token::Open {
                tag,
                attrs,
                self_closing,
                span,
            } => {
                check_placement(tag, &stack, span.start)?;
                let pending = open_element(tag, &attrs, span.start)?;
                match pending {
                    Some(pending) if !self_closing => stack.push(Frame {
                        tag: Some(tag),
                        pending,
                        open: span,
                        children: Vec::new(),
                    }),
                    Some(pending) => {
                        let node = finish(template, pending, span, Span::new(span.end, span.end), Vec::new());
                        top(&mut stack).children.push(node);
                    },
                    None => {
                        let node = void_element(tag, &attrs, span)?;
                        top(&mut stack).children.push(node);
                    },
                }
            },
            Token::Close { tag, span } => {
                let Some(open_tag) = stack.last().and_then(|f| f.tag) else {
                    return Err(ParseError::UnexpectedClose {
                        tag: tag.as_str(),
                        offset: span.start,
                    });
                };
                if open_tag != tag {
                    if tag.is_void() || !stack.iter().any(|f| f.tag == Some(tag)) {
                        return Err(ParseError::UnexpectedClose {
                            tag: tag.as_str(),
                            offset: span.start,
                        });
                    }
                    return Err(ParseError::MismatchedClose {
                        expected: open_tag.as_str(),
                        found: tag.as_str(),
                        offset: span.start,
                    });
                }
                let Some(frame) = stack.pop() else {
                    unreachable!("a tagged frame was just inspected");
                };
                let node = finish(
                    template,
                    frame.pending,
                    Span::new(frame.open.start, span.end),
                    Span::new(frame.open.end, span.start),
                    frame.children,
                );
                top(&mut stack).children.push(node);
            },
        }
    }

    if stack.len() > 1 {
        let frame = &stack[stack.len() - 1];
        return Err(ParseError::Unclosed {
            tag: frame.tag.map_or("desc", TagName::as_str),
            offset: frame.open.start,
        });
    }

    let Some(root) = stack.pop() else {
        unreachable!("the root frame is never popped by a close tag");
    };
    let mut children = root.children;
    let root = match sole_wrapper(&children) {
        Some(idx) => children.swap_remove(idx),
        None => {
            let whole = Span::new(0, template.len());
            Node {
                kind: NodeKind::Wrapper { children },
                span: whole,
                inner: whole,
            }
        },
    };
    debug!("parsed template ({} bytes) into {} top-level node(s)", template.len(), root.children().len());
    Ok(root)
}

fn top(stack: &mut [Frame]) -> &mut Frame {
    let Some(frame) = stack.last_mut() else {
        unreachable!("the root frame stays on the stack");
    };
    frame
}

/// Reject elements that may not appear under any currently open ancestor.
fn check_placement(tag: TagName, stack: &[Frame], offset: usize) -> Result<(), ParseError> {
    let misplaced = |parent: TagName| ParseError::Misplaced {
        tag: tag.as_str(),
        parent: parent.as_str(),
        offset,
    };

    for parent in stack.iter().rev().filter_map(|f| f.tag) {
        let forbidden = match parent {
            TagName::Item => true,
            TagName::Sentence => matches!(tag, TagName::Sentence | TagName::Desc),
            TagName::List => matches!(tag, TagName::List | TagName::Sentence | TagName::Desc | TagName::Var),
            TagName::Desc | TagName::If | TagName::Var => false,
        };
        if forbidden {
            return Err(misplaced(parent));
        }
    }

    if tag == TagName::Item && !stack.iter().any(|f| f.tag == Some(TagName::List)) {
        let parent = stack.iter().rev().find_map(|f| f.tag).unwrap_or(TagName::Desc);
        return Err(misplaced(parent));
    }
    Ok(())
}

fn attr<'a>(attrs: &'a [Attr], keys: &[&str]) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| keys.contains(&a.key.as_str()))
        .map(|a| a.value.as_str())
}

/// Capture element data from an opening tag. Void tags return `None`.
fn open_element(tag: TagName, attrs: &[Attr], offset: usize) -> Result<Option<Pending>, ParseError> {
    Ok(Some(match tag {
        TagName::Desc => Pending::Desc,
        TagName::Sentence => Pending::Sentence,
        TagName::Item => Pending::Item,
        TagName::List => Pending::List(
            attr(attrs, &["name"])
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        ),
        TagName::If => {
            let Some(expr) = attr(attrs, &["cond", "condition"]) else {
                return Err(ParseError::MissingAttribute {
                    tag: "if",
                    attr: "cond",
                    offset,
                });
            };
            let condition = Condition::parse(expr).map_err(|source| ParseError::Condition { offset, source })?;
            Pending::If(condition)
        },
        TagName::Var => return Ok(None),
    }))
}

fn void_element(tag: TagName, attrs: &[Attr], span: Span) -> Result<Node, ParseError> {
    debug_assert!(tag.is_void());
    let Some(path) = attr(attrs, &["v", "value"]) else {
        return Err(ParseError::MissingAttribute {
            tag: tag.as_str(),
            attr: "v",
            offset: span.start,
        });
    };
    let path = path.trim();
    if !is_valid_path(path) {
        return Err(ParseError::MalformedTag {
            tag: tag.as_str(),
            offset: span.start,
            reason: "variable path must be dotted identifiers",
        });
    }
    Ok(Node {
        kind: NodeKind::Var { path: path.to_string() },
        span,
        inner: Span::new(span.end, span.end),
    })
}

fn finish(template: &str, pending: Pending, span: Span, inner: Span, children: Vec<Node>) -> Node {
    let kind = match pending {
        Pending::Desc | Pending::Root => collapse(children),
        Pending::Sentence => NodeKind::Sentence { children },
        Pending::If(condition) => NodeKind::Conditional { condition, children },
        Pending::List(name) => NodeKind::ItemList { name, children },
        Pending::Item => NodeKind::ItemEntry {
            text: inner.slice(template).to_string(),
        },
    };
    Node { kind, span, inner }
}

/// `<desc><desc>x</desc></desc>` is the same as `<desc>x</desc>`.
fn collapse(mut children: Vec<Node>) -> NodeKind {
    match sole_wrapper(&children) {
        Some(idx) => children.swap_remove(idx).kind,
        None => NodeKind::Wrapper { children },
    }
}

/// Index of the only non-blank child, if that child is a wrapper.
fn sole_wrapper(children: &[Node]) -> Option<usize> {
    let mut significant = children.iter().enumerate().filter(|(_, c)| !c.is_blank_text());
    match (significant.next(), significant.next()) {
        (Some((idx, node)), None) if node.is_wrapper() => Some(idx),
        _ => None,
    }
}
