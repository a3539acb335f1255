//! Off-chain pending balances reconciled against the external ledger.
//!
//! Settlement follows an outbox pattern: intent rows are committed inside
//! the player transaction, the ledger is driven afterwards with no player
//! lock held, and confirmations are applied idempotently by claim id. A
//! timeout or rejection retries only the ledger call, never the already
//! committed deduction.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::Ledger;
use crate::error::InvariantViolation;
use crate::state::{GameState, SettlementIntent, SettlementKind, SettlementStatus};

/// Record the intent to move `amount_cents` through the ledger, returning
/// the claim id the external call must be keyed by.
pub fn enqueue_settlement(
    state: &mut GameState,
    kind: SettlementKind,
    amount_cents: i64,
    now: DateTime<Utc>,
) -> u64 {
    state.claim_seq += 1;
    let claim_id = derive_claim_id(&state.player_id, state.claim_seq);
    state.outbox.push(SettlementIntent {
        claim_id,
        kind,
        amount_cents,
        status: SettlementStatus::Pending,
        created_at: now,
        settlement_ref: None,
    });
    claim_id
}

/// Apply a ledger confirmation. Replaying a claim id that is already
/// confirmed (or unknown) changes nothing and reports `false`.
///
/// # Errors
///
/// Returns `InvariantViolation::PendingBalanceUnderflow` when confirming a
/// reward would drive the pending balance negative; that means the
/// aggregate was corrupted elsewhere and must not be papered over.
pub fn confirm_settlement(
    state: &mut GameState,
    claim_id: u64,
    settlement_ref: &str,
) -> Result<bool, InvariantViolation> {
    let Some(index) = state
        .outbox
        .iter()
        .position(|intent| intent.claim_id == claim_id)
    else {
        log::warn!(
            "settlement confirm for unknown claim | player:{} claim:{claim_id}",
            state.player_id
        );
        return Ok(false);
    };
    if !state.outbox[index].is_pending() {
        return Ok(false);
    }

    let (kind, amount_cents) = (state.outbox[index].kind, state.outbox[index].amount_cents);
    if matches!(
        kind,
        SettlementKind::ContractReward | SettlementKind::ChestReward
    ) {
        let remaining = state.pending_currency_cents - amount_cents;
        if remaining < 0 {
            return Err(InvariantViolation::PendingBalanceUnderflow);
        }
        state.pending_currency_cents = remaining;
    }

    let intent = &mut state.outbox[index];
    intent.status = SettlementStatus::Confirmed;
    intent.settlement_ref = Some(settlement_ref.to_string());

    if kind == SettlementKind::ChestReward
        && let Some(chest) = state
            .chests
            .iter_mut()
            .find(|chest| chest.claim_id == claim_id)
    {
        chest.settlement_ref = Some(settlement_ref.to_string());
    }

    log::info!(
        "settlement confirmed | player:{} claim:{claim_id} kind:{kind:?} amount:{amount_cents}",
        state.player_id
    );
    Ok(true)
}

/// Totals for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementReport {
    pub confirmed: u32,
    pub failed: u32,
}

/// Outcome of driving a batch of pending intents against the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementDrive {
    /// `(claim_id, settlement_ref)` pairs to apply via
    /// [`confirm_settlement`] inside the next player transaction.
    pub confirmations: Vec<(u64, String)>,
    pub failures: u32,
}

/// Drive pending intents against the ledger, claim id by claim id. This
/// holds no player lock: callers snapshot the outbox, await here, then
/// apply the confirmations transactionally. Failed intents simply stay
/// pending for the next pass.
pub async fn drive_settlements<L: Ledger>(
    ledger: &L,
    player_id: &str,
    pending: &[SettlementIntent],
) -> SettlementDrive {
    let mut drive = SettlementDrive::default();
    for intent in pending.iter().filter(|intent| intent.is_pending()) {
        let attempt = match intent.kind {
            SettlementKind::EntryFee => {
                ledger
                    .pay_entry_fee(player_id, intent.claim_id, intent.amount_cents)
                    .await
            }
            SettlementKind::ContractReward | SettlementKind::ChestReward => {
                ledger
                    .claim_reward(player_id, intent.claim_id, intent.amount_cents)
                    .await
            }
        };
        match attempt {
            Ok(settlement_ref) => drive.confirmations.push((intent.claim_id, settlement_ref)),
            Err(failure) => {
                log::warn!(
                    "settlement attempt failed | player:{player_id} claim:{} err:{failure}",
                    intent.claim_id
                );
                drive.failures += 1;
            }
        }
    }
    drive
}

/// Derive a stable claim id from the player and a monotonic sequence, so
/// retried enqueues of the same logical claim cannot mint new ids.
fn derive_claim_id(player_id: &str, seq: u64) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(player_id.as_bytes())
        .expect("hmac accepts any key length");
    mac.update(&seq.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let id_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(id_bytes)
}
