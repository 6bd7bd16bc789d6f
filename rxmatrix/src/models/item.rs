use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ItemType {
    #[default]
    #[serde(alias = "drug")]
    Drug,
    #[serde(alias = "supplement")]
    Supplement,
    #[serde(alias = "food")]
    Food,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drug => write!(f, "Drug"),
            Self::Supplement => write!(f, "Supplement"),
            Self::Food => write!(f, "Food"),
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drug" => Ok(Self::Drug),
            "supplement" => Ok(Self::Supplement),
            "food" => Ok(Self::Food),
            _ => Err(format!("Unknown item type: {s}")),
        }
    }
}

/// Identifiers the item is known by in upstream sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rxcui: Option<String>,
    /// DailyMed SPL set id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_id: Option<String>,
}

impl ExternalIds {
    pub fn is_empty(&self) -> bool {
        self.rxcui.is_none() && self.set_id.is_none()
    }
}

/// A substance resolved to a stable identifier.
///
/// Equality and hashing look at `id` only: two items are the same entity iff
/// their ids match, whatever their display names say.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalItem {
    pub id: String,
    pub display: String,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "ExternalIds::is_empty")]
    pub external_ids: ExternalIds,
}

impl CanonicalItem {
    pub fn new(id: impl Into<String>, display: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
            item_type,
            external_ids: ExternalIds::default(),
        }
    }

    pub fn with_rxcui(mut self, rxcui: impl Into<String>) -> Self {
        self.external_ids.rxcui = Some(rxcui.into());
        self
    }
}

impl PartialEq for CanonicalItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CanonicalItem {}

impl Hash for CanonicalItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
