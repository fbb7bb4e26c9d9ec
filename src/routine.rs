//! Routine definitions and their JSON input format.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::errors::{CardError, Result};

/// Variant-specific data for a tracking item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Checkbox,
    Number { unit: Option<String> },
    Scale { has_notes: bool },
    Text,
    /// A `type` this version does not know how to draw. Kept so the renderer
    /// can skip it in place.
    Unrecognized(String),
}

impl ItemKind {
    pub fn type_name(&self) -> &str {
        match self {
            ItemKind::Checkbox => "checkbox",
            ItemKind::Number { .. } => "number",
            ItemKind::Scale { .. } => "scale",
            ItemKind::Text => "text",
            ItemKind::Unrecognized(name) => name,
        }
    }
}

/// One row of a tracking card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub order: i64,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(name: impl Into<String>, order: i64, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            order,
            kind,
        }
    }

    pub fn checkbox(name: impl Into<String>, order: i64) -> Self {
        Self::new(name, order, ItemKind::Checkbox)
    }

    pub fn number(name: impl Into<String>, order: i64, unit: Option<&str>) -> Self {
        Self::new(
            name,
            order,
            ItemKind::Number {
                unit: unit.map(str::to_string),
            },
        )
    }

    pub fn scale(name: impl Into<String>, order: i64, has_notes: bool) -> Self {
        Self::new(name, order, ItemKind::Scale { has_notes })
    }

    pub fn text(name: impl Into<String>, order: i64) -> Self {
        Self::new(name, order, ItemKind::Text)
    }
}

/// A named, versioned list of items, held in ascending `order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    name: String,
    items: Vec<Item>,
    version: i64,
}

impl Routine {
    /// Build a routine, stably sorting items by `order` so ties keep their input position.
    pub fn new(name: impl Into<String>, mut items: Vec<Item>, version: i64) -> Self {
        items.sort_by_key(|item| item.order);
        Self {
            name: name.into(),
            items,
            version,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn version(&self) -> i64 {
        self.version
    }
}

/// Wire form of an item as it appears in the input document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_notes: Option<bool>,
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        let kind = match record.kind.as_str() {
            "checkbox" => ItemKind::Checkbox,
            "number" => ItemKind::Number { unit: record.unit },
            "scale" => ItemKind::Scale {
                has_notes: record.has_notes.unwrap_or(false),
            },
            "text" => ItemKind::Text,
            _ => ItemKind::Unrecognized(record.kind),
        };
        Item {
            name: record.name,
            order: record.order,
            kind,
        }
    }
}

fn default_version() -> i64 {
    1
}

fn default_quantity() -> u32 {
    1
}

/// Top-level input document: a routine plus how many cards to print.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutineInput {
    pub name: String,
    pub items: Vec<ItemRecord>,
    #[serde(default = "default_version")]
    pub version: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl RoutineInput {
    /// Decode and validate an input document held in memory.
    pub fn from_json(input: &str) -> Result<Self> {
        let parsed: RoutineInput = serde_json::from_str(input)?;
        parsed.validate()
    }

    /// Decode and validate an input document from a reader, consuming it fully first.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let parsed: RoutineInput = serde_json::from_reader(reader)?;
        parsed.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.name.trim().is_empty() {
            return Err(CardError::EmptyName);
        }
        if self.quantity == 0 {
            return Err(CardError::ZeroQuantity);
        }
        Ok(self)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn to_routine(&self) -> Routine {
        let items = self.items.iter().cloned().map(Item::from).collect();
        Routine::new(self.name.clone(), items, self.version)
    }
}
