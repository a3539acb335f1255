//! Case opening: cap policy, tier and template rolls, decoy playback.
//!
//! The daily cap runs on a rolling 24h clock anchored at the first
//! successful open in the window, deliberately decoupled from the logical
//! day counter. Authoritative rolls come from the entropy-seeded bundle;
//! only the UI-replay decoy sequence is deterministic.

use chrono::{DateTime, Duration, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::CaseConfig;
use crate::contract::{ActiveContract, ContractCatalog, Tier};
use crate::error::{GameError, InvariantViolation, PolicyViolation};
use crate::rng::{RngBundle, derive_stream_seed};
use crate::state::GameState;
use crate::weighted::choose_weighted;

/// Result of one successful case open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub tier: Tier,
    pub contract: ActiveContract,
    pub granted_free_spin: bool,
    pub opened_at: DateTime<Utc>,
    /// Seed for the deterministic decoy playback of this draw.
    pub decoy_seed: u64,
}

/// Open a case for the player's active session.
///
/// Preconditions, in order: the rolling 24h cap must not be exhausted
/// (free spins included); the first case of a window is always allowed;
/// otherwise a free spin is consumed; otherwise the previous contract must
/// already be submitted.
///
/// # Errors
///
/// `PolicyViolation` for cap/ordering failures, `InvariantViolation` when
/// called against an ended session.
///
/// # Panics
///
/// Panics when handed a `CaseConfig` whose invariants were never checked
/// via [`crate::config::EconomyConfig::validate`].
pub fn open_case(
    state: &mut GameState,
    catalog: &ContractCatalog,
    cfg: &CaseConfig,
    rng: &RngBundle,
    now: DateTime<Utc>,
) -> Result<CaseOutcome, GameError> {
    match &state.session {
        None => return Err(PolicyViolation::SessionNotFound.into()),
        Some(session) if !session.is_active() => {
            return Err(InvariantViolation::SessionAlreadyEnded.into());
        }
        Some(_) => {}
    }

    roll_window_if_elapsed(state, cfg, now);

    // Cap check runs first: an unused free spin survives a capped attempt
    // and becomes usable after the window rolls over.
    if state.cases_opened_today >= cfg.daily_cap {
        return Err(PolicyViolation::DailyCaseLimitReached.into());
    }

    let first_of_window = state.cases_opened_today == 0;
    let mut consumed_free_spin = false;
    {
        let session = state.session.as_ref().expect("session checked above");
        if !first_of_window {
            if session.has_free_spin {
                consumed_free_spin = true;
            } else if session.contract.is_some() && !session.contract_submitted {
                return Err(PolicyViolation::ContractNotCompleted.into());
            }
        }
    }

    let (tier, contract, decoy_seed) = {
        let mut case_rng = rng.case();
        let tier = *choose_weighted(&cfg.tier_weights.as_table(), &mut *case_rng)
            .expect("tier weights validated non-zero");
        let template = catalog
            .roll_template(tier, &mut *case_rng)
            .expect("catalog validated non-empty per tier");
        (tier, template.snapshot(), case_rng.next_u64())
    };
    let granted_free_spin = tier == Tier::Epic;

    if state.last_case_reset.is_none() {
        state.last_case_reset = Some(now);
    }
    state.cases_opened_today += 1;
    state.lifetime_cases.bump(tier);

    let session = state.session.as_mut().expect("session checked above");
    if consumed_free_spin {
        session.has_free_spin = false;
    }
    if granted_free_spin {
        session.has_free_spin = true;
    }
    session.contract = Some(contract.clone());
    session.contract_submitted = false;

    log::debug!(
        "case opened | player:{} tier:{} template:{} free_spin:{}",
        state.player_id,
        tier.asset_key(),
        contract.template_id,
        granted_free_spin,
    );

    Ok(CaseOutcome {
        tier,
        contract,
        granted_free_spin,
        opened_at: now,
        decoy_seed,
    })
}

/// Reset the cap counter when the rolling window has fully elapsed. The
/// next successful open re-anchors the window.
fn roll_window_if_elapsed(state: &mut GameState, cfg: &CaseConfig, now: DateTime<Utc>) {
    if let Some(anchor) = state.last_case_reset
        && now - anchor >= Duration::hours(cfg.window_hours)
    {
        state.cases_opened_today = 0;
        state.last_case_reset = None;
    }
}

/// Deterministic decoy sequence for UI playback: a pure function of the
/// final tier and the draw's decoy seed, with the true result spliced at
/// the configured index. Disjoint from every authoritative draw stream.
#[must_use]
pub fn decoy_sequence(final_tier: Tier, decoy_seed: u64, cfg: &CaseConfig) -> Vec<Tier> {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_stream_seed(decoy_seed, b"decoy"));
    let table = cfg.tier_weights.as_table();
    let mut sequence: Vec<Tier> = (0..cfg.decoy_len)
        .map(|_| {
            choose_weighted(&table, &mut rng)
                .copied()
                .unwrap_or(final_tier)
        })
        .collect();
    if let Some(slot) = sequence.get_mut(cfg.decoy_splice_index) {
        *slot = final_tier;
    }
    sequence
}
