//! Player aggregate and per-day session state.
//!
//! Everything mutable lives on these types so the engine itself stays
//! stateless; the persistence transaction boundary around one player's
//! `GameState` document is the serialization point for all counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::contract::{ActiveContract, Tier};
use crate::gather::GatherAction;
use crate::inventory::Inventory;
use crate::items::ItemKind;

/// Inline capacity covering a typical day's worth of actions.
pub type ActionLog = SmallVec<[ActionRecord; 8]>;

/// Immutable record of one gathering action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub at: DateTime<Utc>,
    pub action: GatherAction,
    pub item: ItemKind,
    pub stamina_cost: u32,
}

/// Lifecycle phase of a session. `Idle` is the absence of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Active,
    Ended,
}

/// One logical player-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    pub day_number: u32,
    pub stamina: u32,
    pub stamina_max: u32,
    pub inventory: Inventory,
    #[serde(default)]
    pub actions: ActionLog,
    pub contract: Option<ActiveContract>,
    pub contract_submitted: bool,
    pub has_free_spin: bool,
    pub phase: SessionPhase,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl PlayerSession {
    /// Open a fresh session with full stamina and carried-over state.
    #[must_use]
    pub fn open(
        day_number: u32,
        stamina_max: u32,
        inventory: Inventory,
        contract: Option<ActiveContract>,
        has_free_spin: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            day_number,
            stamina: stamina_max,
            stamina_max,
            inventory,
            actions: ActionLog::new(),
            contract,
            contract_submitted: false,
            has_free_spin,
            phase: SessionPhase::Active,
            started_at: now,
            ended_at: None,
        }
    }

    /// Whether this session still accepts mutations.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.phase, SessionPhase::Active)
    }
}

/// What an outbox row settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementKind {
    ContractReward,
    ChestReward,
    EntryFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Confirmed,
}

/// Durable intent to move money through the external ledger. Written
/// inside the player transaction before any ledger call is attempted, so
/// redemption intent survives settlement failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementIntent {
    pub claim_id: u64,
    pub kind: SettlementKind,
    pub amount_cents: i64,
    pub status: SettlementStatus,
    pub created_at: DateTime<Utc>,
    pub settlement_ref: Option<String>,
}

impl SettlementIntent {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, SettlementStatus::Pending)
    }
}

/// Durable record of a redeemed treasure chest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureChest {
    pub claim_id: u64,
    pub fame_points_spent: u32,
    pub reward_cents: i64,
    pub claimed_at: DateTime<Utc>,
    pub settlement_ref: Option<String>,
}

/// Lifetime case counters per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounters {
    pub common: u32,
    pub advanced: u32,
    pub epic: u32,
}

impl TierCounters {
    pub fn bump(&mut self, tier: Tier) {
        let slot = match tier {
            Tier::Common => &mut self.common,
            Tier::Advanced => &mut self.advanced,
            Tier::Epic => &mut self.epic,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub const fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Common => self.common,
            Tier::Advanced => self.advanced,
            Tier::Epic => self.epic,
        }
    }
}

/// The per-player aggregate persisted as one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub player_id: String,
    pub total_days_played: u32,
    pub fame_points: u32,
    pub total_contracts_completed: u32,
    /// Currency owed but not yet settled externally, in cents.
    pub pending_currency_cents: i64,
    pub cases_opened_today: u32,
    /// Anchor of the rolling case-cap window; `None` until the first open.
    pub last_case_reset: Option<DateTime<Utc>>,
    pub can_start_new_day: bool,
    pub lifetime_cases: TierCounters,
    /// Post-burn inventory carried into the next session.
    pub carried_inventory: Inventory,
    /// Unsubmitted contract carried into the next session.
    pub carried_contract: Option<ActiveContract>,
    /// Unused free spin carried until its 24h window rolls over.
    pub carried_free_spin: bool,
    pub session: Option<PlayerSession>,
    #[serde(default)]
    pub chests: Vec<TreasureChest>,
    #[serde(default)]
    pub outbox: Vec<SettlementIntent>,
    /// Monotonic sequence feeding claim-id derivation.
    pub claim_seq: u64,
}

impl GameState {
    /// Fresh aggregate for a new player, ready to start day one.
    #[must_use]
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            total_days_played: 0,
            fame_points: 0,
            total_contracts_completed: 0,
            pending_currency_cents: 0,
            cases_opened_today: 0,
            last_case_reset: None,
            can_start_new_day: true,
            lifetime_cases: TierCounters::default(),
            carried_inventory: Inventory::new(),
            carried_contract: None,
            carried_free_spin: false,
            session: None,
            chests: Vec::new(),
            outbox: Vec::new(),
            claim_seq: 0,
        }
    }

    /// The session currently accepting mutations, if any.
    #[must_use]
    pub fn active_session(&self) -> Option<&PlayerSession> {
        self.session.as_ref().filter(|session| session.is_active())
    }

    /// Mutable access to the active session, if any.
    pub fn active_session_mut(&mut self) -> Option<&mut PlayerSession> {
        self.session.as_mut().filter(|session| session.is_active())
    }

    /// Pending outbox rows, oldest first.
    #[must_use]
    pub fn pending_settlements(&self) -> Vec<&SettlementIntent> {
        self.outbox.iter().filter(|intent| intent.is_pending()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_can_start_a_day() {
        let state = GameState::new("p1");
        assert!(state.can_start_new_day);
        assert!(state.session.is_none());
        assert_eq!(state.fame_points, 0);
    }

    #[test]
    fn ended_session_is_not_active() {
        let mut state = GameState::new("p1");
        let now = Utc::now();
        state.session = Some(PlayerSession::open(1, 50, Inventory::new(), None, false, now));
        assert!(state.active_session().is_some());
        state.session.as_mut().unwrap().phase = SessionPhase::Ended;
        assert!(state.active_session().is_none());
    }

    #[test]
    fn tier_counters_bump_independently() {
        let mut counters = TierCounters::default();
        counters.bump(Tier::Epic);
        counters.bump(Tier::Epic);
        counters.bump(Tier::Common);
        assert_eq!(counters.get(Tier::Epic), 2);
        assert_eq!(counters.get(Tier::Common), 1);
        assert_eq!(counters.get(Tier::Advanced), 0);
    }

    #[test]
    fn aggregate_round_trips_through_json() {
        let mut state = GameState::new("roundtrip");
        state.carried_inventory.add(ItemKind::Wheat, 3);
        state.fame_points = 42;
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
