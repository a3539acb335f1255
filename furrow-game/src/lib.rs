//! Furrow Economy Engine
//!
//! Platform-agnostic core economy logic for the Furrow play-to-earn farming
//! game: stamina-gated gathering, weighted case draws, contract
//! fulfillment, inventory burn rules, fame points, and idempotent
//! settlement against an external treasury. This crate carries no UI,
//! wallet, or database dependencies; hosts supply those through the
//! [`PersistentStore`], [`Ledger`], and [`Clock`] seams below.

pub mod case;
pub mod config;
pub mod constants;
pub mod contract;
pub mod error;
pub mod fame;
pub mod gather;
pub mod inventory;
pub mod items;
pub mod reconcile;
pub mod rng;
pub mod session;
pub mod state;
pub mod weighted;

// Re-export commonly used types
pub use case::{CaseOutcome, decoy_sequence};
pub use config::{
    BurnConfig, CaseConfig, ChestConfig, ConfigError, EconomyConfig, TierWeights,
};
pub use contract::{
    ActiveContract, ContractCatalog, ContractTemplate, Tier, validate_contract,
};
pub use error::{
    GameError, InvariantViolation, PolicyViolation, SettlementFailure, Shortfall,
    ValidationError,
};
pub use fame::{FameTotal, add_fame_points, can_claim_chest, claim_treasure_chest};
pub use gather::{GatherAction, GatherOutcome};
pub use inventory::Inventory;
pub use items::{CropKind, ItemKind};
pub use reconcile::{
    SettlementDrive, SettlementReport, confirm_settlement, drive_settlements,
    enqueue_settlement,
};
pub use rng::RngBundle;
pub use session::{DaySummary, SubmitOutcome};
pub use state::{
    ActionRecord, GameState, PlayerSession, SessionPhase, SettlementIntent, SettlementKind,
    SettlementStatus, TierCounters, TreasureChest,
};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Trait for the durable per-player document store.
/// Platform-specific implementations should provide this.
pub trait PersistentStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a player's aggregate, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn load(&self, player_id: &str) -> Result<Option<GameState>, Self::Error>;

    /// Persist a player's aggregate.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn save(&self, state: &GameState) -> Result<(), Self::Error>;

    /// Atomically read-modify-write one player's aggregate, creating a
    /// fresh one for unknown players. This is the per-player serialization
    /// point: implementations must run `f` inside a transaction (or under
    /// an optimistic version check), so concurrent requests cannot
    /// double-spend stamina or exceed the case cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be committed.
    fn transact<R>(
        &self,
        player_id: &str,
        f: impl FnOnce(&mut GameState) -> R,
    ) -> Result<R, Self::Error>;
}

/// Trait for the external on-chain treasury.
///
/// Both calls are at-least-once: they must be driven idempotently by
/// `claim_id`, and a returned settlement reference is proof of completion.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    /// Collect a day's entry fee.
    ///
    /// # Errors
    ///
    /// Returns `SettlementFailure` on timeout or rejection; callers retry
    /// with the same claim id.
    async fn pay_entry_fee(
        &self,
        player_id: &str,
        claim_id: u64,
        amount_cents: i64,
    ) -> Result<String, SettlementFailure>;

    /// Transfer an earned reward to the player.
    ///
    /// # Errors
    ///
    /// Returns `SettlementFailure` on timeout or rejection; callers retry
    /// with the same claim id.
    async fn claim_reward(
        &self,
        player_id: &str,
        claim_id: u64,
        amount_cents: i64,
    ) -> Result<String, SettlementFailure>;
}

/// Monotonic wall-clock source for the 24h case window and day cycle.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// System time implementation of [`Clock`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Engine operation error: either the store failed or the game rules did.
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("persistent store failure")]
    Store(#[source] E),
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Main engine binding the economy rules to a store, ledger, and clock.
///
/// The engine itself is stateless between calls: every operation is one
/// read-modify-write of the player's document inside
/// [`PersistentStore::transact`], and settlement runs afterwards with no
/// player lock held.
pub struct GameEngine<S, L, C>
where
    S: PersistentStore,
    L: Ledger,
    C: Clock,
{
    store: S,
    ledger: L,
    clock: C,
    config: EconomyConfig,
    catalog: ContractCatalog,
    rng: RngBundle,
}

impl<S, L, C> GameEngine<S, L, C>
where
    S: PersistentStore,
    L: Ledger,
    C: Clock,
{
    /// Create an engine with the default economy and an entropy-seeded
    /// draw bundle.
    #[must_use]
    pub fn new(store: S, ledger: L, clock: C) -> Self {
        Self {
            store,
            ledger,
            clock,
            config: EconomyConfig::default_config(),
            catalog: ContractCatalog::default_catalog(),
            rng: RngBundle::from_entropy(),
        }
    }

    /// Create an engine with a custom economy, validating it first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates its bounds.
    pub fn with_config(
        store: S,
        ledger: L,
        clock: C,
        config: EconomyConfig,
        catalog: ContractCatalog,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            ledger,
            clock,
            config,
            catalog,
            rng: RngBundle::from_entropy(),
        })
    }

    /// Replace the draw bundle. Test/replay use only.
    #[must_use]
    pub fn with_rng_bundle(mut self, rng: RngBundle) -> Self {
        self.rng = rng;
        self
    }

    /// Read a player's aggregate without mutating it.
    ///
    /// # Errors
    ///
    /// Store failures only.
    pub fn game_state(&self, player_id: &str) -> Result<Option<GameState>, EngineError<S::Error>> {
        self.store.load(player_id).map_err(EngineError::Store)
    }

    /// Start a new player-day. Returns the day number.
    ///
    /// # Errors
    ///
    /// `CannotStartDay` while a session is active or unfinished.
    pub fn start_day(&self, player_id: &str) -> Result<u32, EngineError<S::Error>> {
        let now = self.clock.now();
        self.run(player_id, |state| session::start_day(state, &self.config, now))
    }

    /// Run one gathering action.
    ///
    /// # Errors
    ///
    /// Stamina and session errors per [`session::gather`].
    pub fn gather(
        &self,
        player_id: &str,
        action: GatherAction,
    ) -> Result<GatherOutcome, EngineError<S::Error>> {
        let now = self.clock.now();
        self.run(player_id, |state| {
            session::gather(state, action, &self.rng, now)
        })
    }

    /// Open a case for the player.
    ///
    /// # Errors
    ///
    /// Cap and ordering violations per [`case::open_case`].
    pub fn open_case(&self, player_id: &str) -> Result<CaseOutcome, EngineError<S::Error>> {
        let now = self.clock.now();
        self.run(player_id, |state| {
            session::open_case(state, &self.catalog, &self.config, &self.rng, now)
        })
    }

    /// Assign a plain daily contract of the requested tier.
    ///
    /// # Errors
    ///
    /// `ContractNotCompleted` while one is already pending.
    pub fn accept_daily_contract(
        &self,
        player_id: &str,
        tier: Tier,
    ) -> Result<ActiveContract, EngineError<S::Error>> {
        self.run(player_id, |state| {
            session::accept_daily_contract(state, tier, &self.catalog, &self.rng)
        })
    }

    /// Submit the active contract.
    ///
    /// # Errors
    ///
    /// Shortfalls and ordering violations per [`session::submit_contract`].
    pub fn submit_contract(
        &self,
        player_id: &str,
    ) -> Result<SubmitOutcome, EngineError<S::Error>> {
        let now = self.clock.now();
        self.run(player_id, |state| {
            session::submit_contract(state, &self.config, now)
        })
    }

    /// Redeem a treasure chest.
    ///
    /// # Errors
    ///
    /// `ChestNotEarned` below the fame threshold.
    pub fn claim_chest(&self, player_id: &str) -> Result<TreasureChest, EngineError<S::Error>> {
        let now = self.clock.now();
        self.run(player_id, |state| {
            fame::claim_treasure_chest(state, &self.config.chest, &self.rng, now)
        })
    }

    /// End the player's day.
    ///
    /// # Errors
    ///
    /// Session errors per [`session::end_day`].
    pub fn end_day(&self, player_id: &str) -> Result<DaySummary, EngineError<S::Error>> {
        let now = self.clock.now();
        self.run(player_id, |state| session::end_day(state, &self.config, &self.rng, now))
    }

    /// Drive every pending settlement for the player: snapshot the outbox,
    /// call the ledger with no player lock held, then apply confirmations
    /// transactionally. Failures leave their intents pending for the next
    /// pass; replays are no-ops.
    ///
    /// # Errors
    ///
    /// Store failures, or an invariant defect while applying confirmations.
    pub async fn settle(&self, player_id: &str) -> Result<SettlementReport, EngineError<S::Error>> {
        let Some(snapshot) = self.game_state(player_id)? else {
            return Ok(SettlementReport::default());
        };
        let pending: Vec<SettlementIntent> = snapshot
            .pending_settlements()
            .into_iter()
            .cloned()
            .collect();
        if pending.is_empty() {
            return Ok(SettlementReport::default());
        }

        let drive = drive_settlements(&self.ledger, player_id, &pending).await;

        let confirmed = self.run(player_id, |state| {
            let mut applied = 0u32;
            for (claim_id, settlement_ref) in &drive.confirmations {
                match confirm_settlement(state, *claim_id, settlement_ref) {
                    Ok(true) => applied += 1,
                    Ok(false) => {}
                    Err(defect) => return Err(GameError::from(defect)),
                }
            }
            Ok(applied)
        })?;

        Ok(SettlementReport {
            confirmed,
            failed: drive.failures,
        })
    }

    fn run<R>(
        &self,
        player_id: &str,
        f: impl FnOnce(&mut GameState) -> Result<R, GameError>,
    ) -> Result<R, EngineError<S::Error>> {
        self.store
            .transact(player_id, f)
            .map_err(EngineError::Store)?
            .map_err(EngineError::Game)
    }
}
