//! Quantity phrases, capitalization and copula agreement.

use std::sync::LazyLock;

use alcove_data::ItemDescriptor;
use regex::Regex;

/// `is`/`are` as the last word of the text before a list.
pub(crate) static COPULA_BEFORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(is|are)\s+$").expect("copula regex is valid"));

/// `is`/`are` as the first word of the text after a list.
pub(crate) static COPULA_AFTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s+(is|are)\b").expect("copula regex is valid"));

/// Matches the item's name or plural as whole words, ignoring case.
///
/// `PEN` matches `a red PEN` but not `15 PENCILS`. `None` when the item has
/// no usable name.
pub(crate) fn mention_pattern(item: &ItemDescriptor) -> Option<Regex> {
    let alternatives: Vec<String> = [Some(item.name.as_str()), item.plural.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)(?:^|\W)(?:{})(?:\W|$)", alternatives.join("|"))).ok()
}

/// The entry reads as more than one thing: a leading count above one, or a
/// plural quantifier such as `several`.
pub(crate) fn is_plural_phrase(entry: &str) -> bool {
    let mut words = entry.split_whitespace().map(str::to_lowercase);
    match words.next().as_deref() {
        Some(first) if first.bytes().all(|b| b.is_ascii_digit()) => first.parse::<u64>().is_ok_and(|n| n > 1),
        Some("several" | "many") => true,
        Some("a") => words.next().as_deref() == Some("few"),
        _ => false,
    }
}

/// Phrase for `count` of an item: the singular phrase for one, else `"{count} {plural}"`.
pub(crate) fn quantity_phrase(item: &ItemDescriptor, count: u32) -> String {
    if count == 1 {
        item.singular.clone()
    } else {
        format!("{count} {}", item.plural_or_name())
    }
}

/// Rewrite an existing entry's text for a new count.
///
/// A leading number is replaced in place (`15 PENCILS` → `16 PENCILS`);
/// anything else becomes the fresh quantity phrase. Surrounding whitespace and
/// a Title-case leading word survive.
pub(crate) fn requantify(entry: &str, item: &ItemDescriptor, count: u32) -> String {
    let body = entry.trim();
    let lead = &entry[..entry.len() - entry.trim_start().len()];
    let trail = &entry[entry.trim_end().len()..];

    let first = first_word(body);
    let phrase = if count > 1 && !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()) {
        format!("{count}{}", &body[first.len()..])
    } else {
        quantity_phrase(item, count)
    };
    let phrase = if is_title_word(first) { capitalize(&phrase) } else { phrase };
    format!("{lead}{phrase}{trail}")
}

/// Uppercase the first character after any leading whitespace.
pub(crate) fn capitalize(text: &str) -> String {
    let body_start = text.len() - text.trim_start().len();
    let mut chars = text[body_start..].chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", &text[..body_start], first.to_uppercase(), chars.as_str()),
        None => text.to_string(),
    }
}

/// Lowercase a Title-case leading word (`A bottle` → `a bottle`).
///
/// All-caps names (`ROSE OF SHARON`) and the pronoun `I` are left alone.
pub(crate) fn decapitalize(text: &str) -> String {
    let body_start = text.len() - text.trim_start().len();
    let body = &text[body_start..];
    let first = first_word(body);
    if first == "I" || !is_title_word(first) {
        return text.to_string();
    }
    let mut chars = body.chars();
    match chars.next() {
        Some(initial) => format!("{}{}{}", &text[..body_start], initial.to_lowercase(), chars.as_str()),
        None => text.to_string(),
    }
}

/// Swap a copula for the new member count, keeping its capitalization.
pub(crate) fn agree_copula(word: &str, plural: bool) -> String {
    let target = if plural { "are" } else { "is" };
    if word.chars().all(|c| c.is_uppercase()) && word.chars().count() > 1 {
        target.to_uppercase()
    } else if word.starts_with(char::is_uppercase) {
        capitalize(target)
    } else {
        target.to_string()
    }
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// `A`, `Hung`, `Two`: an uppercase initial followed by no other capitals.
fn is_title_word(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(char::is_uppercase) && !chars.any(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pencil(count: u32) -> ItemDescriptor {
        ItemDescriptor::new("PENCIL", count, "a PENCIL").with_plural("PENCILS")
    }

    #[test]
    fn leading_numbers_are_replaced_in_place() {
        assert_eq!(requantify("15 PENCILS", &pencil(16), 16), "16 PENCILS");
        assert_eq!(requantify("9 loose PENCILS", &pencil(10), 10), "10 loose PENCILS");
    }

    #[test]
    fn articles_become_counts_and_back() {
        assert_eq!(requantify("a PENCIL", &pencil(2), 2), "2 PENCILS");
        assert_eq!(requantify("15 PENCILS", &pencil(1), 1), "a PENCIL");
        assert_eq!(requantify(" A PENCIL ", &pencil(1), 1), " A PENCIL ");
    }

    #[test]
    fn mentions_match_whole_words_only() {
        let pen = mention_pattern(&ItemDescriptor::new("PEN", 1, "a PEN")).expect("pattern");
        assert!(pen.is_match("a red pen"));
        assert!(pen.is_match("PEN, uncapped"));
        assert!(!pen.is_match("15 PENCILS"));
        assert!(!pen.is_match("a SPEN"));

        let pencil = mention_pattern(&pencil(2)).expect("pattern");
        assert!(pencil.is_match("15 PENCILS"));
        assert!(mention_pattern(&ItemDescriptor::new(" ", 1, "a thing")).is_none());
    }

    #[test]
    fn plural_phrases() {
        assert!(is_plural_phrase("3 CLARINETS"));
        assert!(is_plural_phrase("A few KNIVES"));
        assert!(is_plural_phrase("several MAPS"));
        assert!(!is_plural_phrase("1 CLARINET"));
        assert!(!is_plural_phrase("a bottle of ZZZQUIL"));
        assert!(!is_plural_phrase("ROSE OF SHARON"));
    }

    #[test]
    fn plural_falls_back_to_name() {
        let saw = ItemDescriptor::new("SAW", 3, "a SAW");
        assert_eq!(quantity_phrase(&saw, 3), "3 SAW");
        assert_eq!(quantity_phrase(&saw, 1), "a SAW");
    }

    #[test]
    fn capitalization_helpers() {
        assert_eq!(capitalize("hung on the wall"), "Hung on the wall");
        assert_eq!(capitalize(" a bottle"), " A bottle");
        assert_eq!(decapitalize("A bottle of LAXATIVES"), "a bottle of LAXATIVES");
        assert_eq!(decapitalize("ROSE OF SHARON"), "ROSE OF SHARON");
        assert_eq!(decapitalize("I left it here"), "I left it here");
        assert_eq!(decapitalize("a wooden ruler"), "a wooden ruler");
    }

    #[test]
    fn copula_agreement_keeps_case() {
        assert_eq!(agree_copula("is", true), "are");
        assert_eq!(agree_copula("Are", false), "Is");
        assert_eq!(agree_copula("IS", true), "ARE");
        assert!(COPULA_BEFORE.is_match("On these shelves is "));
        assert!(!COPULA_BEFORE.is_match("This island "));
        assert!(COPULA_AFTER.is_match(" are on these shelves."));
        assert!(!COPULA_AFTER.is_match(" arena"));
    }
}
