use serde::{Deserialize, Serialize};

/// Stable identifier used across content references.
pub type Id = String;

/// Top-level content file loaded by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContentDef {
    #[serde(default)]
    pub descriptions: Vec<DescriptionDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub placements: Vec<PlacementDef>,
}

impl ContentDef {
    /// Look up a description by id.
    pub fn description(&self, id: &str) -> Option<&DescriptionDef> {
        self.descriptions.iter().find(|d| d.id == id)
    }

    /// Look up an item definition by id.
    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.id == id)
    }
}

/// The kind of game entity a description belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Room,
    Object,
    Puzzle,
    Item,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Room => "room",
            EntityKind::Object => "object",
            EntityKind::Puzzle => "puzzle",
            EntityKind::Item => "item",
        }
    }
}

/// A describable entity and its markup template(s).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionDef {
    pub id: Id,
    pub kind: EntityKind,
    pub text: String,
    /// Description shown once a puzzle has been solved.
    #[serde(default)]
    pub solved_text: Option<String>,
}

impl DescriptionDef {
    /// The template to use for the given solved state, falling back to `text`.
    pub fn template(&self, solved: bool) -> &str {
        match (&self.solved_text, solved) {
            (Some(solved_text), true) => solved_text,
            _ => &self.text,
        }
    }
}

/// Item definition: the phrases used when the item is itemized in a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: Id,
    pub name: String,
    /// Phrase for a single item, article included (`a bottle of PAINKILLERS`).
    pub singular: String,
    /// Phrase used after a count (`bottles of PAINKILLERS`).
    #[serde(default)]
    pub plural: Option<String>,
}

impl ItemDef {
    /// Build the mutator input for this item at the given total quantity.
    pub fn descriptor(&self, quantity: Quantity) -> ItemDescriptor {
        ItemDescriptor {
            name: self.name.clone(),
            quantity,
            singular: self.singular.clone(),
            plural: self.plural.clone(),
        }
    }
}

/// Authoring-time placement of an item inside a container's description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementDef {
    pub item: Id,
    pub container: Id,
    /// Named list inside the container description; `None` targets the first list.
    #[serde(default)]
    pub list: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: Quantity,
}

fn default_quantity() -> Quantity {
    Quantity::Count(1)
}

/// Total number of an item after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quantity {
    Count(u32),
    /// Infinite or uncountable stock, never itemized individually.
    Uncountable,
}

impl Quantity {
    /// Convert a loosely typed number, mapping NaN, infinities, negatives and
    /// fractions to `Uncountable`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
            Quantity::Count(value as u32)
        } else {
            Quantity::Uncountable
        }
    }

    pub fn count(self) -> Option<u32> {
        match self {
            Quantity::Count(n) => Some(n),
            Quantity::Uncountable => None,
        }
    }

    pub fn is_uncountable(self) -> bool {
        matches!(self, Quantity::Uncountable)
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Quantity::Count(value)
    }
}

/// Mutator input: which item is entering or leaving a list, and how many remain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub name: String,
    pub quantity: Quantity,
    pub singular: String,
    #[serde(default)]
    pub plural: Option<String>,
}

impl ItemDescriptor {
    pub fn new(name: impl Into<String>, quantity: impl Into<Quantity>, singular: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            singular: singular.into(),
            plural: None,
        }
    }

    #[must_use]
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    /// Phrase that follows a count, falling back to the bare name.
    pub fn plural_or_name(&self) -> &str {
        self.plural
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(&self.name)
    }
}
