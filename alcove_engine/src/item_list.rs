//! Item-list mutator.
//!
//! Rewrites a description template when an item enters or leaves a container.
//! Only the affected spans change: the target list's entry (quantity rewrites)
//! or its inner markup (insertions and removals), plus an adjacent `is`/`are`
//! when the number of members crosses between one and many. Everything else
//! passes through byte-for-byte.
//!
//! A list's members are its `<item>` entries and the untagged phrases between
//! them. Structural edits regenerate the connectors (`A and B`, `A, B, and C`),
//! so they are refused for lists whose members sit inside `<if>` branches.

mod connectors;
mod phrase;

use alcove_data::{ItemDescriptor, Quantity};
use log::{debug, warn};

use crate::markup::{Node, NodeKind, ParseError, Span, parse};

pub(crate) use connectors::{join_members, split_plain};

/// Outcome of a planned list edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Changed(String),
    Unchanged(NoOpReason),
}

impl Mutation {
    /// The edited template, or `original` when nothing changed.
    pub fn into_template(self, original: &str) -> String {
        match self {
            Mutation::Changed(template) => template,
            Mutation::Unchanged(_) => original.to_string(),
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Mutation::Changed(_))
    }
}

/// Why a planned edit left the template alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// No list with the requested name (or no list at all).
    NoList,
    /// The item's quantity is uncountable, so it is never itemized.
    Uncountable,
    /// Removal found no entry mentioning the item.
    NoMatchingEntry,
    /// An insertion with a total of zero.
    ZeroQuantity,
    /// The list holds conditional members and cannot be restructured.
    ConditionalList,
}

impl NoOpReason {
    pub fn describe(self) -> &'static str {
        match self {
            NoOpReason::NoList => "no matching item list",
            NoOpReason::Uncountable => "item quantity is uncountable",
            NoOpReason::NoMatchingEntry => "no entry mentions the item",
            NoOpReason::ZeroQuantity => "nothing to add",
            NoOpReason::ConditionalList => "list contains conditional members",
        }
    }
}

/// Insert an item into a list, or update its quantity if already listed.
///
/// `item.quantity` is the total after the addition.
///
/// # Errors
/// Returns the [`ParseError`] of a malformed template.
pub fn add_item(template: &str, item: &ItemDescriptor, list_name: Option<&str>) -> Result<String, ParseError> {
    Ok(plan_add_item(template, item, list_name)?.into_template(template))
}

/// Remove an item from a list, or lower its quantity.
///
/// `item.quantity` is the total after the removal; zero deletes the entry.
///
/// # Errors
/// Returns the [`ParseError`] of a malformed template.
pub fn remove_item(template: &str, item: &ItemDescriptor, list_name: Option<&str>) -> Result<String, ParseError> {
    Ok(plan_remove_item(template, item, list_name)?.into_template(template))
}

/// Like [`add_item`], reporting why nothing changed.
///
/// # Errors
/// Returns the [`ParseError`] of a malformed template.
pub fn plan_add_item(template: &str, item: &ItemDescriptor, list_name: Option<&str>) -> Result<Mutation, ParseError> {
    let Quantity::Count(count) = item.quantity else {
        return Ok(unchanged(NoOpReason::Uncountable, item));
    };
    let root = parse(template)?;
    let Some(site) = find_list(&root, list_name) else {
        return Ok(unchanged(NoOpReason::NoList, item));
    };
    if count == 0 {
        return Ok(unchanged(NoOpReason::ZeroQuantity, item));
    }

    if let Some(entry) = find_entry(site.list, item) {
        return Ok(requantify_entry(template, entry, item, count));
    }
    if site.has_conditional() {
        return Ok(refused(item, "add"));
    }

    let mut members = flatten(site.list);
    let before = members.len();
    let mut phrase = phrase::quantity_phrase(item, count);
    if site.sentence_initial {
        phrase = phrase::capitalize(&phrase);
        if let Some(first) = members.first_mut() {
            first.text = phrase::decapitalize(&first.text);
        }
    }
    members.insert(
        0,
        Member {
            text: phrase,
            tagged: true,
            source: None,
        },
    );

    debug!("adding '{}' to a list of {before} member(s)", item.name);
    Ok(restructure(template, &site, &members, before))
}

/// Like [`remove_item`], reporting why nothing changed.
///
/// # Errors
/// Returns the [`ParseError`] of a malformed template.
pub fn plan_remove_item(
    template: &str,
    item: &ItemDescriptor,
    list_name: Option<&str>,
) -> Result<Mutation, ParseError> {
    let Quantity::Count(count) = item.quantity else {
        return Ok(unchanged(NoOpReason::Uncountable, item));
    };
    let root = parse(template)?;
    let Some(site) = find_list(&root, list_name) else {
        return Ok(unchanged(NoOpReason::NoList, item));
    };
    let Some(entry) = find_entry(site.list, item) else {
        return Ok(unchanged(NoOpReason::NoMatchingEntry, item));
    };

    if count > 0 {
        return Ok(requantify_entry(template, entry, item, count));
    }
    if site.has_conditional() {
        return Ok(refused(item, "remove"));
    }

    let mut members = flatten(site.list);
    let before = members.len();
    let Some(idx) = members.iter().position(|m| m.source == Some(entry.span)) else {
        return Ok(unchanged(NoOpReason::NoMatchingEntry, item));
    };
    members.remove(idx);
    if site.sentence_initial
        && idx == 0
        && let Some(first) = members.first_mut()
    {
        first.text = phrase::capitalize(&first.text);
    }

    debug!("removing '{}' from a list of {before} member(s)", item.name);
    Ok(restructure(template, &site, &members, before))
}

fn unchanged(reason: NoOpReason, item: &ItemDescriptor) -> Mutation {
    debug!("list edit for '{}' skipped: {}", item.name, reason.describe());
    Mutation::Unchanged(reason)
}

fn refused(item: &ItemDescriptor, action: &str) -> Mutation {
    warn!(
        "refusing to {action} '{}': {}",
        item.name,
        NoOpReason::ConditionalList.describe()
    );
    Mutation::Unchanged(NoOpReason::ConditionalList)
}

/// An item list together with where it sits in its parent.
struct ListSite<'a> {
    list: &'a Node,
    siblings: &'a [Node],
    index: usize,
    /// The list opens its sentence.
    sentence_initial: bool,
}

impl ListSite<'_> {
    fn has_conditional(&self) -> bool {
        self.list
            .children()
            .iter()
            .any(|c| matches!(c.kind, NodeKind::Conditional { .. }))
    }
}

fn find_list<'a>(root: &'a Node, list_name: Option<&str>) -> Option<ListSite<'a>> {
    let mut sites = Vec::new();
    collect_sites(root, &mut sites);

    match list_name.map(str::trim).filter(|n| !n.is_empty()) {
        None => sites.into_iter().next(),
        Some(wanted) => sites.into_iter().find(|site| match &site.list.kind {
            NodeKind::ItemList { name: Some(name), .. } => name.eq_ignore_ascii_case(wanted),
            _ => false,
        }),
    }
}

fn collect_sites<'a>(root: &'a Node, out: &mut Vec<ListSite<'a>>) {
    collect_sites_in(root, matches!(root.kind, NodeKind::Sentence { .. }), out);
}

/// `opens_sentence`: `parent` is a sentence, or a conditional standing at the
/// start of one.
fn collect_sites_in<'a>(parent: &'a Node, opens_sentence: bool, out: &mut Vec<ListSite<'a>>) {
    let siblings = parent.children();
    for (index, child) in siblings.iter().enumerate() {
        let leading = opens_sentence && siblings[..index].iter().all(Node::is_blank_text);
        match child.kind {
            NodeKind::ItemList { .. } => out.push(ListSite {
                list: child,
                siblings,
                index,
                sentence_initial: leading,
            }),
            NodeKind::Sentence { .. } => collect_sites_in(child, true, out),
            NodeKind::Conditional { .. } => collect_sites_in(child, leading, out),
            _ => collect_sites_in(child, false, out),
        }
    }
}

/// First entry mentioning the item's name or plural phrase, at any depth.
fn find_entry<'a>(node: &'a Node, item: &ItemDescriptor) -> Option<&'a Node> {
    let pattern = phrase::mention_pattern(item)?;

    let mut found = None;
    node.walk(&mut |n| {
        if found.is_some() {
            return;
        }
        if let NodeKind::ItemEntry { text } = &n.kind
            && pattern.is_match(text)
        {
            found = Some(n);
        }
    });
    found
}

fn requantify_entry(template: &str, entry: &Node, item: &ItemDescriptor, count: u32) -> Mutation {
    let current = entry.inner.slice(template);
    let updated = phrase::requantify(current, item, count);
    debug!("requantifying '{current}' as '{updated}'");
    Mutation::Changed(apply_edits(template, vec![(entry.inner, updated)]))
}

/// One list member as it will be written back.
#[derive(Debug, Clone)]
struct Member {
    text: String,
    tagged: bool,
    /// Span of the `<item>` element this member came from.
    source: Option<Span>,
}

impl Member {
    fn markup(&self) -> String {
        if self.tagged {
            format!("<item>{}</item>", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Members of a list without conditionals, in order.
fn flatten(list: &Node) -> Vec<Member> {
    let mut members = Vec::new();
    for child in list.children() {
        match &child.kind {
            NodeKind::ItemEntry { text } => members.push(Member {
                text: text.clone(),
                tagged: true,
                source: Some(child.span),
            }),
            NodeKind::Text { raw } => members.extend(split_plain(raw).into_iter().map(|phrase| Member {
                text: phrase.to_string(),
                tagged: false,
                source: None,
            })),
            _ => {},
        }
    }
    members
}

/// Rewrite the list's inner markup from `members`, fixing the copula.
fn restructure(template: &str, site: &ListSite<'_>, members: &[Member], before: usize) -> Mutation {
    let markup: Vec<String> = members.iter().map(Member::markup).collect();
    let mut edits = vec![list_edit(template, site.list, join_members(&markup))];

    let after = members.len();
    let plural = after >= 2 || members.iter().any(|m| phrase::is_plural_phrase(&m.text));
    if after > 0
        && (before >= 2) != (after >= 2)
        && let Some(edit) = copula_edit(template, site, plural)
    {
        edits.push(edit);
    }
    Mutation::Changed(apply_edits(template, edits))
}

/// Replace a list's contents, expanding a self-closing `<il/>` as needed.
fn list_edit(template: &str, list: &Node, inner: String) -> (Span, String) {
    let whole = list.span.slice(template);
    if list.inner.is_empty() && whole.ends_with("/>") {
        let open = whole.trim_end_matches("/>").trim_end();
        return (list.span, format!("{open}>{inner}</il>"));
    }
    (list.inner, inner)
}

/// Edit swapping the `is`/`are` right before or right after the list.
fn copula_edit(template: &str, site: &ListSite<'_>, plural: bool) -> Option<(Span, String)> {
    let text_sibling = |idx: usize| {
        site.siblings
            .get(idx)
            .filter(|n| matches!(n.kind, NodeKind::Text { .. }))
    };

    let before = site.index.checked_sub(1).and_then(text_sibling);
    let after = text_sibling(site.index + 1);
    let found = before
        .and_then(|n| phrase::COPULA_BEFORE.captures(n.span.slice(template)).map(|c| (n, c)))
        .or_else(|| after.and_then(|n| phrase::COPULA_AFTER.captures(n.span.slice(template)).map(|c| (n, c))))?;

    let (node, captures) = found;
    let word = captures.get(1)?;
    let span = Span::new(node.span.start + word.start(), node.span.start + word.end());
    Some((span, phrase::agree_copula(word.as_str(), plural)))
}

/// Apply non-overlapping span edits from the back so earlier offsets hold.
fn apply_edits(template: &str, mut edits: Vec<(Span, String)>) -> String {
    edits.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));
    let mut out = template.to_string();
    for (span, replacement) in edits {
        out.replace_range(span.range(), &replacement);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: u32, singular: &str) -> ItemDescriptor {
        ItemDescriptor::new(name, quantity, singular)
    }

    #[test]
    fn named_list_lookup_is_trimmed_and_case_insensitive() {
        let root = parse(r#"<s><il name="LEFT POCKET"></il> <il name="Right Pocket"></il></s>"#).expect("parses");
        let site = find_list(&root, Some("  right pocket ")).expect("list found");
        assert_eq!(site.index, 2);
        assert!(find_list(&root, Some("BACK POCKET")).is_none());
        assert_eq!(find_list(&root, None).map(|s| s.index), Some(0));
    }

    #[test]
    fn sentence_initial_detection() {
        let root = parse("<s> <il></il> are here.</s><s>Here are <il></il>.</s>").expect("parses");
        let mut sites = Vec::new();
        collect_sites(&root, &mut sites);
        assert!(sites[0].sentence_initial);
        assert!(!sites[1].sentence_initial);
    }

    #[test]
    fn leading_conditionals_keep_a_list_sentence_initial() {
        let root = parse(
            r#"<s><if cond="this.open == true"> <il></il> sit here.</if></s><s>You see <if cond="this.open == true"><il></il></if>.</s>"#,
        )
        .expect("parses");
        let mut sites = Vec::new();
        collect_sites(&root, &mut sites);
        assert!(sites[0].sentence_initial);
        assert!(!sites[1].sentence_initial);
    }

    #[test]
    fn entry_lookup_descends_into_conditionals() {
        let template = r#"<il><if cond="player.talent == 'Iris'"><item>a ROSE</item></if></il>"#;
        let root = parse(template).expect("parses");
        let entry = find_entry(&root, &item("ROSE", 0, "a ROSE")).expect("entry found");
        assert_eq!(entry.inner.slice(template), "a ROSE");
    }

    #[test]
    fn plans_report_reasons() {
        let rose = item("ROSE", 0, "a ROSE");
        assert_eq!(
            plan_add_item("<s>Nothing here.</s>", &item("ROSE", 1, "a ROSE"), None),
            Ok(Mutation::Unchanged(NoOpReason::NoList))
        );
        assert_eq!(
            plan_add_item("<s><il></il></s>", &rose, None),
            Ok(Mutation::Unchanged(NoOpReason::ZeroQuantity))
        );
        assert_eq!(
            plan_remove_item("<s><il>a ROSE</il></s>", &rose, None),
            Ok(Mutation::Unchanged(NoOpReason::NoMatchingEntry))
        );
        let coins = ItemDescriptor::new("COIN", Quantity::Uncountable, "a COIN");
        assert_eq!(
            plan_add_item("not even <s>markup", &coins, None),
            Ok(Mutation::Unchanged(NoOpReason::Uncountable))
        );
    }

    #[test]
    fn conditional_lists_refuse_structural_edits_but_requantify() {
        let template = r#"<s>You see <il><item>2 SAWS</item><if cond="player.talent == 'Iris'"> and <item>a ROSE</item></if></il>.</s>"#;
        assert_eq!(
            plan_add_item(template, &item("HAMMER", 1, "a HAMMER"), None),
            Ok(Mutation::Unchanged(NoOpReason::ConditionalList))
        );
        assert_eq!(
            plan_remove_item(template, &item("ROSE", 0, "a ROSE"), None),
            Ok(Mutation::Unchanged(NoOpReason::ConditionalList))
        );
        let saw = item("SAW", 3, "a SAW").with_plural("SAWS");
        assert_eq!(
            add_item(template, &saw, None).expect("parses"),
            template.replace("2 SAWS", "3 SAWS")
        );
    }

    #[test]
    fn self_closing_list_is_expanded() {
        let out = add_item(r#"<s>You find <il name="BIN" />.</s>"#, &item("CAN", 1, "a CAN"), Some("bin")).expect("parses");
        assert_eq!(out, r#"<s>You find <il name="BIN"><item>a CAN</item></il>.</s>"#);
    }

    #[test]
    fn copula_after_list_is_swapped() {
        let out = add_item(
            "<s><il><item>A BROOM</item></il> Is propped up here.</s>",
            &item("MOP", 1, "a MOP"),
            None,
        )
        .expect("parses");
        assert_eq!(out, "<s><il><item>A MOP</item> and <item>a BROOM</item></il> Are propped up here.</s>");
    }

    #[test]
    fn malformed_templates_propagate_parse_errors() {
        assert!(add_item("<s><il></s>", &item("MOP", 1, "a MOP"), None).is_err());
        assert!(remove_item("<s><il></s>", &item("MOP", 0, "a MOP"), None).is_err());
    }
}
