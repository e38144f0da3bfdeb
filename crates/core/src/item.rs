//! Item system - the resource units moved between blocks.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Item type identifier.
///
/// The derived ordering doubles as the deterministic take priority: when a
/// container holds several item types, the lowest-ordered type leaves first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ItemType {
    /// Basic conductor ore, the most common resource.
    Copper = 0,
    /// Dense ore used for ammunition and plating.
    Lead = 1,
    /// Processed carbon, burns and conducts.
    Graphite = 2,
    /// Refined semiconductor material.
    Silicon = 3,
    /// Light structural metal found deep underground.
    Titanium = 4,
}

/// All item types in take-priority order.
pub const ITEM_TYPES: &[ItemType] = &[
    ItemType::Copper,
    ItemType::Lead,
    ItemType::Graphite,
    ItemType::Silicon,
    ItemType::Titanium,
];

/// Error returned when an item name does not match any known type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown item name: {0}")]
pub struct UnknownItem(
    /// The name that failed to parse.
    pub String,
);

impl ItemType {
    /// Stable lowercase name used in configs and event logs.
    pub fn name(self) -> &'static str {
        match self {
            ItemType::Copper => "copper",
            ItemType::Lead => "lead",
            ItemType::Graphite => "graphite",
            ItemType::Silicon => "silicon",
            ItemType::Titanium => "titanium",
        }
    }

    /// Parse an item from its stable name.
    pub fn from_name(name: &str) -> Result<Self, UnknownItem> {
        ITEM_TYPES
            .iter()
            .copied()
            .find(|item| item.name() == name)
            .ok_or_else(|| UnknownItem(name.to_string()))
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
