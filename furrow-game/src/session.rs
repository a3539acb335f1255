//! Session lifecycle: one logical player-day.
//!
//! Idle -> Active -> Ended -> Idle, where Idle is the absence of an active
//! session on the aggregate. Resource and precondition failures come back
//! as recoverable typed errors; touching an ended session is a defect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::case::{self, CaseOutcome};
use crate::config::EconomyConfig;
use crate::contract::{ActiveContract, ContractCatalog, Tier, validate_contract};
use crate::error::{GameError, InvariantViolation, PolicyViolation};
use crate::fame::{FameTotal, add_fame_points};
use crate::gather::{GatherAction, GatherOutcome, resolve_gather};
use crate::items::ItemKind;
use crate::reconcile::enqueue_settlement;
use crate::rng::RngBundle;
use crate::state::{GameState, PlayerSession, SessionPhase, SettlementKind};

/// Result of a successful contract submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub template_id: String,
    pub reward_cents: i64,
    pub fame_earned: u32,
    pub fame: FameTotal,
    pub claim_id: u64,
    /// Inventory destroyed by the post-submission burn.
    pub items_burned: Vec<(ItemKind, u32)>,
}

/// Closing ledger for one ended day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day_number: u32,
    pub stamina_left: u32,
    /// Item counts destroyed by the day-end partial burn.
    pub items_burned: Vec<(ItemKind, u32)>,
    /// Total items carried into the next session.
    pub items_carried: u64,
    pub contract_carried: bool,
}

/// Begin a new player-day: full stamina, carried-over inventory and any
/// unsubmitted contract, entry fee enqueued for settlement.
///
/// # Errors
///
/// `PolicyViolation::CannotStartDay` while a session is active or before
/// the previous day was ended.
pub fn start_day(
    state: &mut GameState,
    cfg: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<u32, GameError> {
    if state.active_session().is_some() || !state.can_start_new_day {
        return Err(PolicyViolation::CannotStartDay.into());
    }

    if cfg.entry_fee_cents > 0 {
        enqueue_settlement(state, SettlementKind::EntryFee, cfg.entry_fee_cents, now);
    }

    let day_number = state.total_days_played + 1;
    let inventory = std::mem::take(&mut state.carried_inventory);
    let contract = state.carried_contract.take();
    let free_spin = std::mem::replace(&mut state.carried_free_spin, false);
    state.session = Some(PlayerSession::open(
        day_number,
        cfg.stamina_max,
        inventory,
        contract,
        free_spin,
        now,
    ));
    state.can_start_new_day = false;

    log::info!(
        "day started | player:{} day:{day_number}",
        state.player_id
    );
    Ok(day_number)
}

/// Run one gathering action against the active session.
///
/// # Errors
///
/// Stamina shortfalls as `ValidationError`; missing/ended sessions per
/// [`active_session_mut`].
pub fn gather(
    state: &mut GameState,
    action: GatherAction,
    rng: &RngBundle,
    now: DateTime<Utc>,
) -> Result<GatherOutcome, GameError> {
    let session = active_session_mut(state)?;
    let outcome = resolve_gather(session, action, &mut *rng.gather(), now)?;
    Ok(outcome)
}

/// Open a case for the active session. See [`case::open_case`].
///
/// # Errors
///
/// Propagates cap and ordering violations from the case engine.
pub fn open_case(
    state: &mut GameState,
    catalog: &ContractCatalog,
    cfg: &EconomyConfig,
    rng: &RngBundle,
    now: DateTime<Utc>,
) -> Result<CaseOutcome, GameError> {
    case::open_case(state, catalog, &cfg.case, rng, now)
}

/// Assign a plain daily contract of the requested tier, without a case
/// draw. Allowed when no contract is pending.
///
/// # Errors
///
/// `PolicyViolation::ContractNotCompleted` while an unsubmitted contract
/// is still pending.
pub fn accept_daily_contract(
    state: &mut GameState,
    tier: Tier,
    catalog: &ContractCatalog,
    rng: &RngBundle,
) -> Result<ActiveContract, GameError> {
    let session = active_session_mut(state)?;
    if session.contract.is_some() && !session.contract_submitted {
        return Err(PolicyViolation::ContractNotCompleted.into());
    }
    let contract = catalog
        .roll_template(tier, &mut *rng.case())
        .expect("catalog validated non-empty per tier")
        .snapshot();
    session.contract = Some(contract.clone());
    session.contract_submitted = false;
    Ok(contract)
}

/// Fulfill the active contract: consume its requirements, credit fame and
/// pending currency, enqueue the reward settlement, then burn the entire
/// remaining inventory.
///
/// # Errors
///
/// `NoActiveContract` / `ContractAlreadySubmitted` for ordering problems,
/// `MissingRequirements` carrying the complete shortfall list otherwise.
pub fn submit_contract(
    state: &mut GameState,
    cfg: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<SubmitOutcome, GameError> {
    let (contract, items_burned) = {
        let session = active_session_mut(state)?;
        let contract = session
            .contract
            .clone()
            .ok_or(PolicyViolation::NoActiveContract)?;
        if session.contract_submitted {
            return Err(PolicyViolation::ContractAlreadySubmitted.into());
        }
        validate_contract(&session.inventory, &contract.requirements)?;
        session.inventory.remove_batch(&contract.requirements)?;
        // Anti-hoarding rule: whatever survives fulfillment is destroyed.
        let items_burned = session.inventory.burn_on_submit();
        session.contract_submitted = true;
        (contract, items_burned)
    };

    state.total_contracts_completed += 1;
    let fame = add_fame_points(state, contract.fame_points, &cfg.chest);
    state.pending_currency_cents += contract.reward_cents;
    let claim_id = enqueue_settlement(
        state,
        SettlementKind::ContractReward,
        contract.reward_cents,
        now,
    );

    log::info!(
        "contract submitted | player:{} template:{} reward:{} fame:{}",
        state.player_id,
        contract.template_id,
        contract.reward_cents,
        fame.total,
    );

    Ok(SubmitOutcome {
        template_id: contract.template_id,
        reward_cents: contract.reward_cents,
        fame_earned: contract.fame_points,
        fame,
        claim_id,
        items_burned,
    })
}

/// Close the day: partial burn, session marked Ended, survivors and any
/// unsubmitted contract carried forward. Irreversible.
///
/// # Errors
///
/// Missing/ended sessions per [`active_session_mut`].
pub fn end_day(
    state: &mut GameState,
    cfg: &EconomyConfig,
    rng: &RngBundle,
    now: DateTime<Utc>,
) -> Result<DaySummary, GameError> {
    let (summary, carried_inventory, carried_contract, carried_free_spin) = {
        let session = active_session_mut(state)?;
        let items_burned = session
            .inventory
            .burn_partial_on_day_end(&mut *rng.burn(), &cfg.burn);
        session.phase = SessionPhase::Ended;
        session.ended_at = Some(now);

        let carried_contract = if session.contract_submitted {
            None
        } else {
            session.contract.clone()
        };
        let summary = DaySummary {
            day_number: session.day_number,
            stamina_left: session.stamina,
            items_burned,
            items_carried: session.inventory.total_items(),
            contract_carried: carried_contract.is_some(),
        };
        (
            summary,
            session.inventory.clone(),
            carried_contract,
            session.has_free_spin,
        )
    };

    state.carried_inventory = carried_inventory;
    state.carried_contract = carried_contract;
    state.carried_free_spin = carried_free_spin;
    state.total_days_played += 1;
    state.can_start_new_day = true;

    log::info!(
        "day ended | player:{} day:{} carried_items:{}",
        state.player_id,
        summary.day_number,
        summary.items_carried,
    );
    Ok(summary)
}

/// Resolve the mutable active session, distinguishing "no session" (a
/// recoverable sync problem) from "session already ended" (a defect).
///
/// # Errors
///
/// `PolicyViolation::SessionNotFound` or
/// `InvariantViolation::SessionAlreadyEnded`.
pub fn active_session_mut(state: &mut GameState) -> Result<&mut PlayerSession, GameError> {
    match &mut state.session {
        None => Err(PolicyViolation::SessionNotFound.into()),
        Some(session) if !session.is_active() => {
            Err(InvariantViolation::SessionAlreadyEnded.into())
        }
        Some(session) => Ok(session),
    }
}
