//! Error taxonomy for the economy engine.
//!
//! Expected gameplay conditions come back as typed, recoverable errors;
//! invariant breaches are a separate defect class that callers must treat
//! as fatal rather than retry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::ItemKind;

/// One unmet contract requirement: what the player has versus needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub item: ItemKind,
    pub have: u32,
    pub need: u32,
}

/// Recoverable resource failures; retry only after state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("insufficient stamina: need {required}, have {available}")]
    InsufficientStamina { required: u32, available: u32 },
    #[error("insufficient {}: have {have}, need {need}", .item.asset_key())]
    InsufficientItems { item: ItemKind, have: u32, need: u32 },
    #[error("contract requirements unmet ({0:?})")]
    MissingRequirements(Vec<Shortfall>),
}

/// The caller is out of sync with authoritative state; refresh and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("daily case limit reached")]
    DailyCaseLimitReached,
    #[error("previous contract has not been completed")]
    ContractNotCompleted,
    #[error("contract already submitted")]
    ContractAlreadySubmitted,
    #[error("no active session for player")]
    SessionNotFound,
    #[error("no contract is active for this session")]
    NoActiveContract,
    #[error("cannot start a new day yet")]
    CannotStartDay,
    #[error("not enough fame points to claim a chest")]
    ChestNotEarned,
}

/// External treasury failures; retried with backoff by infrastructure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementFailure {
    #[error("ledger call timed out")]
    Timeout,
    #[error("ledger rejected claim: {0}")]
    Rejected(String),
}

/// Internal-consistency defects. Never retried, never silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("session has already ended")]
    SessionAlreadyEnded,
    #[error("pending balance would go negative")]
    PendingBalanceUnderflow,
}

/// Top-level error for session and engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Settlement(#[from] SettlementFailure),
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl GameError {
    /// Whether a caller may retry after refreshing or changing state.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Invariant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_render_item_keys() {
        let err = ValidationError::InsufficientItems {
            item: ItemKind::Coal,
            have: 1,
            need: 4,
        };
        assert_eq!(err.to_string(), "insufficient coal: have 1, need 4");
    }

    #[test]
    fn invariants_are_not_recoverable() {
        let defect = GameError::from(InvariantViolation::SessionAlreadyEnded);
        assert!(!defect.is_recoverable());
        let policy = GameError::from(PolicyViolation::DailyCaseLimitReached);
        assert!(policy.is_recoverable());
    }
}
