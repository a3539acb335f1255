//! Fame point accrual and treasure chest redemption.
//!
//! The chest record and its settlement intent are written durably before
//! any ledger attempt, so redemption intent survives settlement failure
//! and the point deduction is never repeated on retry.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ChestConfig;
use crate::error::{GameError, PolicyViolation};
use crate::reconcile::enqueue_settlement;
use crate::rng::RngBundle;
use crate::state::{GameState, SettlementKind, TreasureChest};

/// Fame balance after an accrual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FameTotal {
    pub total: u32,
    pub can_claim_chest: bool,
}

/// Credit fame points, reporting the new total and chest eligibility.
pub fn add_fame_points(state: &mut GameState, amount: u32, cfg: &ChestConfig) -> FameTotal {
    state.fame_points = state.fame_points.saturating_add(amount);
    FameTotal {
        total: state.fame_points,
        can_claim_chest: can_claim_chest(state, cfg),
    }
}

/// Whether the player holds enough fame points for a chest.
#[must_use]
pub fn can_claim_chest(state: &GameState, cfg: &ChestConfig) -> bool {
    state.fame_points >= cfg.fame_threshold
}

/// Redeem a treasure chest: deducts exactly the threshold (the remainder
/// carries over), rolls the reward uniformly within the configured band,
/// and records both the chest and its settlement intent durably before any
/// external call is attempted.
///
/// # Errors
///
/// Returns `PolicyViolation::ChestNotEarned` below the threshold.
pub fn claim_treasure_chest(
    state: &mut GameState,
    cfg: &ChestConfig,
    rng: &RngBundle,
    now: DateTime<Utc>,
) -> Result<TreasureChest, GameError> {
    if !can_claim_chest(state, cfg) {
        return Err(PolicyViolation::ChestNotEarned.into());
    }

    let reward_cents = rng
        .chest()
        .gen_range(cfg.reward_min_cents..=cfg.reward_max_cents);

    state.fame_points -= cfg.fame_threshold;
    state.pending_currency_cents += reward_cents;
    let claim_id = enqueue_settlement(state, SettlementKind::ChestReward, reward_cents, now);

    let chest = TreasureChest {
        claim_id,
        fame_points_spent: cfg.fame_threshold,
        reward_cents,
        claimed_at: now,
        settlement_ref: None,
    };
    state.chests.push(chest.clone());

    log::info!(
        "chest claimed | player:{} reward:{reward_cents} fame_left:{}",
        state.player_id,
        state.fame_points
    );
    Ok(chest)
}
