//! Centralized balance and tuning constants for the Furrow economy.
//!
//! Rebalancing happens here and nowhere else; config structs pick up their
//! defaults from these values.

use crate::items::ItemKind;

// Stamina and gathering ----------------------------------------------------
pub(crate) const STAMINA_MAX_DEFAULT: u32 = 50;
pub(crate) const WATER_CROP_COST: u32 = 2;
pub(crate) const CHOP_TREE_COST: u32 = 6;
pub(crate) const MINE_STONE_COST: u32 = 8;

/// Mining outcome table: stone is the common haul, iron the rare one.
pub(crate) const MINE_TABLE: [(ItemKind, u32); 3] = [
    (ItemKind::Stone, 70),
    (ItemKind::Coal, 20),
    (ItemKind::Iron, 10),
];

// Case tuning --------------------------------------------------------------
pub(crate) const DAILY_CASE_CAP: u32 = 3;
pub(crate) const CASE_WINDOW_HOURS: i64 = 24;
pub(crate) const TIER_WEIGHT_COMMON: u32 = 75;
pub(crate) const TIER_WEIGHT_ADVANCED: u32 = 22;
pub(crate) const TIER_WEIGHT_EPIC: u32 = 3;
pub(crate) const DECOY_SEQUENCE_LEN: usize = 50;
pub(crate) const DECOY_SPLICE_INDEX: usize = 25;

// Burn tuning --------------------------------------------------------------
pub(crate) const DAY_END_BURN_MIN_PCT: u32 = 30;
pub(crate) const DAY_END_BURN_MAX_PCT: u32 = 50;

// Fame and chest tuning ----------------------------------------------------
pub(crate) const CHEST_FAME_THRESHOLD: u32 = 100;
pub(crate) const CHEST_REWARD_MIN_CENTS: i64 = 500;
pub(crate) const CHEST_REWARD_MAX_CENTS: i64 = 1_500;

// Settlement ---------------------------------------------------------------
pub(crate) const ENTRY_FEE_CENTS_DEFAULT: i64 = 0;
pub(crate) const DEFAULT_SPAWN_WEIGHT: u32 = 10;
