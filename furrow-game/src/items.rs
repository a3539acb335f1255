//! Item vocabulary for the farming economy.
use serde::{Deserialize, Serialize};

/// Everything a player can hold in inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Wheat,
    Carrot,
    Pumpkin,
    Wood,
    Stone,
    Coal,
    Iron,
}

impl ItemKind {
    /// Stable string key used in logs and asset lookups.
    #[must_use]
    pub const fn asset_key(self) -> &'static str {
        match self {
            Self::Wheat => "wheat",
            Self::Carrot => "carrot",
            Self::Pumpkin => "pumpkin",
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Coal => "coal",
            Self::Iron => "iron",
        }
    }
}

/// Crop subset of [`ItemKind`]; each crop yields exactly its own item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropKind {
    Wheat,
    Carrot,
    Pumpkin,
}

impl CropKind {
    /// The inventory item produced by watering this crop.
    #[must_use]
    pub const fn item(self) -> ItemKind {
        match self {
            Self::Wheat => ItemKind::Wheat,
            Self::Carrot => ItemKind::Carrot,
            Self::Pumpkin => ItemKind::Pumpkin,
        }
    }
}
