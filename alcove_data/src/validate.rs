use std::collections::HashSet;
use std::fmt;

use crate::*;

/// A content problem found by [`validate_content`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String },
    /// A placement names an item or description that does not exist.
    MissingReference { kind: &'static str, id: String, placement: String },
    /// A required text field is blank.
    EmptyField { owner: String, field: &'static str },
    /// Only puzzles carry a solved description.
    SolvedTextOutsidePuzzle { id: String },
    ZeroPlacement { placement: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id } => write!(f, "duplicate {kind} id '{id}'"),
            ValidationError::MissingReference { kind, id, placement } => {
                write!(f, "{placement} refers to unknown {kind} '{id}'")
            },
            ValidationError::EmptyField { owner, field } => write!(f, "{owner} has an empty {field}"),
            ValidationError::SolvedTextOutsidePuzzle { id } => {
                write!(f, "'{id}' has a solved description but is not a puzzle")
            },
            ValidationError::ZeroPlacement { placement } => write!(f, "{placement} places zero items"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate cross-references and basic invariants in a `ContentDef`.
///
/// Markup is not inspected here; the engine's lint pass parses templates.
///
/// ```
/// use alcove_data::{ContentDef, DescriptionDef, EntityKind, ItemDef, PlacementDef, Quantity, validate_content};
///
/// let content = ContentDef {
///     descriptions: vec![DescriptionDef {
///         id: "locker".into(),
///         kind: EntityKind::Object,
///         text: "<s>Inside, you find <il></il>.</s>".into(),
///         solved_text: None,
///     }],
///     items: vec![ItemDef {
///         id: "towel".into(),
///         name: "TOWEL".into(),
///         singular: "a TOWEL".into(),
///         plural: Some("TOWELS".into()),
///     }],
///     placements: vec![PlacementDef {
///         item: "towel".into(),
///         container: "locker".into(),
///         list: None,
///         quantity: Quantity::Count(1),
///     }],
/// };
/// assert!(validate_content(&content).is_empty());
/// ```
pub fn validate_content(content: &ContentDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut descriptions = HashSet::new();
    let mut items = HashSet::new();

    track_ids(
        "description",
        content.descriptions.iter().map(|d| d.id.as_str()),
        &mut descriptions,
        &mut errors,
    );
    track_ids("item", content.items.iter().map(|i| i.id.as_str()), &mut items, &mut errors);

    for desc in &content.descriptions {
        let owner = format!("{} '{}'", desc.kind.as_str(), desc.id);
        if desc.text.trim().is_empty() {
            errors.push(empty(&owner, "description"));
        }
        if let Some(solved) = &desc.solved_text {
            if desc.kind != EntityKind::Puzzle {
                errors.push(ValidationError::SolvedTextOutsidePuzzle { id: desc.id.clone() });
            } else if solved.trim().is_empty() {
                errors.push(empty(&owner, "solved description"));
            }
        }
    }

    for item in &content.items {
        let owner = format!("item '{}'", item.id);
        if item.name.trim().is_empty() {
            errors.push(empty(&owner, "name"));
        }
        if item.singular.trim().is_empty() {
            errors.push(empty(&owner, "singular phrase"));
        }
        if item.plural.as_deref().is_some_and(|p| p.trim().is_empty()) {
            errors.push(empty(&owner, "plural phrase"));
        }
    }

    for (idx, placement) in content.placements.iter().enumerate() {
        let label = format!("placement #{idx} of '{}' in '{}'", placement.item, placement.container);
        check_ref("item", &placement.item, &items, &label, &mut errors);
        check_ref("description", &placement.container, &descriptions, &label, &mut errors);
        if placement.quantity == Quantity::Count(0) {
            errors.push(ValidationError::ZeroPlacement { placement: label.clone() });
        }
        if placement.list.as_deref().is_some_and(|l| l.trim().is_empty()) {
            errors.push(empty(&label, "list name"));
        }
    }

    errors
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    seen: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for id in ids {
        if !seen.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, id: &str, ids: &HashSet<String>, placement: &str, errors: &mut Vec<ValidationError>) {
    if !ids.contains(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            placement: placement.to_string(),
        });
    }
}

fn empty(owner: &str, field: &'static str) -> ValidationError {
    ValidationError::EmptyField {
        owner: owner.to_string(),
        field,
    }
}
