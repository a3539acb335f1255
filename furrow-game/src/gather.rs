//! Stamina-gated gathering actions.
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{CHOP_TREE_COST, MINE_STONE_COST, MINE_TABLE, WATER_CROP_COST};
use crate::error::ValidationError;
use crate::items::{CropKind, ItemKind};
use crate::state::{ActionRecord, PlayerSession};
use crate::weighted::choose_weighted;

/// A harvest action a player can spend stamina on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatherAction {
    WaterCrop { crop: CropKind },
    ChopTree,
    MineStone,
}

impl GatherAction {
    /// Stamina consumed by this action.
    #[must_use]
    pub const fn stamina_cost(self) -> u32 {
        match self {
            Self::WaterCrop { .. } => WATER_CROP_COST,
            Self::ChopTree => CHOP_TREE_COST,
            Self::MineStone => MINE_STONE_COST,
        }
    }

    /// Stable string key used in logs.
    #[must_use]
    pub const fn log_key(self) -> &'static str {
        match self {
            Self::WaterCrop { .. } => "water_crop",
            Self::ChopTree => "chop_tree",
            Self::MineStone => "mine_stone",
        }
    }
}

/// What one gathering action produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherOutcome {
    pub action: GatherAction,
    pub item: ItemKind,
    pub stamina_spent: u32,
}

/// Resolve one gathering action against an active session: checks stamina,
/// decrements it, adds exactly one item, and appends an action record.
///
/// Crop and wood actions yield their deterministic item; mining draws over
/// the stone/coal/iron table.
///
/// # Errors
///
/// Returns `ValidationError::InsufficientStamina` when the session cannot
/// cover the action's cost; the session is left untouched.
pub fn resolve_gather<R: Rng>(
    session: &mut PlayerSession,
    action: GatherAction,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<GatherOutcome, ValidationError> {
    let cost = action.stamina_cost();
    if session.stamina < cost {
        return Err(ValidationError::InsufficientStamina {
            required: cost,
            available: session.stamina,
        });
    }

    let item = roll_yield(action, rng);
    session.stamina -= cost;
    session.inventory.add(item, 1);
    session.actions.push(ActionRecord {
        at: now,
        action,
        item,
        stamina_cost: cost,
    });

    Ok(GatherOutcome {
        action,
        item,
        stamina_spent: cost,
    })
}

fn roll_yield<R: Rng>(action: GatherAction, rng: &mut R) -> ItemKind {
    match action {
        GatherAction::WaterCrop { crop } => crop.item(),
        GatherAction::ChopTree => ItemKind::Wood,
        GatherAction::MineStone => choose_weighted(&MINE_TABLE, rng)
            .copied()
            .unwrap_or(ItemKind::Stone),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Inventory;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashMap;

    fn fresh_session(stamina: u32) -> PlayerSession {
        let mut session =
            PlayerSession::open(1, stamina, Inventory::new(), None, false, Utc::now());
        session.stamina = stamina;
        session
    }

    #[test]
    fn watering_yields_the_crop_item() {
        let mut session = fresh_session(10);
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = resolve_gather(
            &mut session,
            GatherAction::WaterCrop {
                crop: CropKind::Pumpkin,
            },
            &mut rng,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(outcome.item, ItemKind::Pumpkin);
        assert_eq!(session.stamina, 8);
        assert_eq!(session.inventory.count(ItemKind::Pumpkin), 1);
        assert_eq!(session.actions.len(), 1);
    }

    #[test]
    fn gathering_fails_when_stamina_short() {
        let mut session = fresh_session(5);
        let mut rng = SmallRng::seed_from_u64(2);
        let err = resolve_gather(&mut session, GatherAction::MineStone, &mut rng, Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientStamina {
                required: 8,
                available: 5,
            }
        );
        assert_eq!(session.stamina, 5);
        assert!(session.inventory.is_empty());
        assert!(session.actions.is_empty());
    }

    #[test]
    fn stamina_drains_to_exactly_zero() {
        let mut session = fresh_session(50);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..25 {
            resolve_gather(
                &mut session,
                GatherAction::WaterCrop {
                    crop: CropKind::Wheat,
                },
                &mut rng,
                Utc::now(),
            )
            .unwrap();
        }
        assert_eq!(session.stamina, 0);
        assert_eq!(session.inventory.count(ItemKind::Wheat), 25);

        let err = resolve_gather(
            &mut session,
            GatherAction::WaterCrop {
                crop: CropKind::Wheat,
            },
            &mut rng,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientStamina {
                required: 2,
                available: 0,
            }
        );
    }

    #[test]
    fn mining_split_tracks_the_table() {
        let mut rng = SmallRng::seed_from_u64(0xA11CE);
        let mut counts: HashMap<ItemKind, u32> = HashMap::new();
        let samples = 1_000;
        for _ in 0..samples {
            let mut session = fresh_session(8);
            let outcome =
                resolve_gather(&mut session, GatherAction::MineStone, &mut rng, Utc::now())
                    .unwrap();
            *counts.entry(outcome.item).or_insert(0) += 1;
        }
        let share = |item: ItemKind| f64::from(counts.get(&item).copied().unwrap_or(0)) / 1_000.0;
        assert!((share(ItemKind::Stone) - 0.70).abs() < 0.05);
        assert!((share(ItemKind::Coal) - 0.20).abs() < 0.05);
        assert!((share(ItemKind::Iron) - 0.10).abs() < 0.05);
    }
}
