//! Hustle Game Engine
//!
//! Platform-agnostic core game logic for the Rideshare Randy arcade
//! game. This crate provides all game mechanics without UI or
//! platform-specific dependencies.

pub mod challenges;
pub mod constants;
pub mod data;
pub mod driver;
pub mod economy;
pub mod environment;
pub mod payment;
pub mod providers;
pub mod shift;
pub mod state;
pub mod store;
pub mod targets;

// Re-export commonly used types at crate level
pub use challenges::{
    Challenge, ChallengeCondition, ChallengeKind, ChallengeTemplate, ChallengeUpdate, ShiftFacts,
    apply_shift, completion_log_key, regenerate,
};
pub use data::{Decision, DecisionOption, GameData, Obstacle, Passenger, ShiftEvent};
pub use driver::{Addon, Driver, EffectiveDriver, QuotePools, effective_driver};
pub use economy::{Settlement, ShiftOutcome, cents_to_dollars, dollars_to_cents, settle};
pub use environment::Environment;
pub use payment::{PaymentError, PaymentForm, PaymentKind, PaymentMethod, add_payment_method};
pub use providers::{
    AssetCache, AssetProvider, AspectRatio, ContentProvider, OfflineProvider, SpeechProvider,
    build_share_text, shift_report_or_fallback,
};
pub use shift::{
    Briefing, RngBundle, SessionCarry, SessionError, ShiftCfg, ShiftConfigError, ShiftPhase,
    ShiftSession, TapOutcome,
};
pub use state::{GameState, ResourceGauges, ResourcesConsumed, ShiftGateError};
pub use store::{
    ResourceKind, RestStopItem, StoreError, buy_cash_pack, buy_rest_stop_item, rest_stop_catalog,
    unlock_addon, unlock_driver,
};
pub use targets::{Target, TargetField, TargetKind, difficulty_for_score};

use std::rc::Rc;

use rand::Rng;
use thiserror::Error;

use crate::constants::{LOG_SHIFT_CANCELLED, LOG_SHIFT_SETTLED};

/// Trait for abstracting content loading operations.
/// Platform-specific implementations should provide this.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the content tables from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded.
    fn load_game_data(&self) -> Result<GameData, Self::Error>;

    /// Load configuration data for a specific system.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state.
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state.
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;

    /// Persist the wall-clock stamp of the last daily bonus grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the stamp cannot be saved.
    fn save_bonus_stamp(&self, stamp_ms: i64) -> Result<(), Self::Error>;

    /// Load the last daily bonus stamp, if one was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if the stamp cannot be loaded.
    fn load_bonus_stamp(&self) -> Result<Option<i64>, Self::Error>;
}

/// Loader serving the built-in content tables and default configs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContent;

impl DataLoader for DefaultContent {
    type Error = serde_json::Error;

    fn load_game_data(&self) -> Result<GameData, Self::Error> {
        Ok(GameData::default_content())
    }

    fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        // Built-in configs are pure serde defaults.
        serde_json::from_str("{}")
    }
}

/// Failures from [`GameEngine::start_shift`].
#[derive(Debug, Error)]
pub enum StartShiftError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("failed to load game data")]
    Data(#[source] E),
    #[error("driver {0:?} is not in the roster")]
    UnknownDriver(String),
    #[error(transparent)]
    Gate(#[from] ShiftGateError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Failures from [`GameEngine::settle_shift`].
#[derive(Debug, Error)]
pub enum SettleShiftError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("failed to load game data")]
    Data(#[source] E),
    #[error("driver {0:?} is not in the roster")]
    UnknownDriver(String),
    #[error("shift is still running")]
    ShiftStillRunning,
}

/// Everything a settled shift hands back to the frontend.
#[derive(Debug, Clone)]
pub struct ShiftReceipt {
    pub outcome: ShiftOutcome,
    pub settlement: Settlement,
    pub challenges: ChallengeUpdate,
    pub carry: SessionCarry,
}

/// Main game engine for managing game instances.
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage.
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Check the resource gate, roll an environment, and open a shift
    /// session for the current driver.
    ///
    /// # Errors
    ///
    /// Content loading failures, an unknown current driver, an
    /// exhausted resource gauge, or an unbriefable content pack.
    pub fn start_shift(
        &self,
        state: &GameState,
        cfg: &ShiftCfg,
        seed: u64,
        carry: SessionCarry,
    ) -> Result<ShiftSession, StartShiftError<L::Error>> {
        let data = self
            .data_loader
            .load_game_data()
            .map_err(StartShiftError::Data)?;
        let base = data
            .driver(&state.current_driver_id)
            .ok_or_else(|| StartShiftError::UnknownDriver(state.current_driver_id.clone()))?;
        let driver = effective_driver(base, &data.addons, &state.owned_addon_ids);
        state.check_shift_gate(driver.ev)?;

        let rngs = Rc::new(RngBundle::from_user_seed(seed));
        let environment = Environment::pick(&mut *rngs.briefing());
        Ok(ShiftSession::new(
            cfg.clone(),
            Rc::new(data),
            driver,
            environment,
            rngs,
            carry,
        )?)
    }

    /// Run the full settlement pipeline on a terminated session: fare
    /// and tips, challenge progress, wallet, gauges, and the log.
    ///
    /// # Errors
    ///
    /// Content loading failures, an unknown current driver, or a
    /// session that has not terminated.
    pub fn settle_shift(
        &self,
        state: &mut GameState,
        session: ShiftSession,
    ) -> Result<ShiftReceipt, SettleShiftError<L::Error>> {
        if session.outcome().is_none() {
            return Err(SettleShiftError::ShiftStillRunning);
        }
        let data = self
            .data_loader
            .load_game_data()
            .map_err(SettleShiftError::Data)?;
        let base = data
            .driver(&state.current_driver_id)
            .ok_or_else(|| SettleShiftError::UnknownDriver(state.current_driver_id.clone()))?;
        let driver = effective_driver(base, &data.addons, &state.owned_addon_ids);

        let environment = session.environment();
        let rngs = session.rng_bundle();
        let (outcome, carry) = session.into_parts();
        let outcome = outcome.ok_or(SettleShiftError::ShiftStillRunning)?;

        let settlement = settle(
            &outcome,
            &driver,
            &data.addons,
            &state.owned_addon_ids,
            &data.events,
            &mut *rngs.economy(),
        );

        let facts = ShiftFacts {
            driver_id: &driver.id,
            environment,
            score: outcome.score,
            net_cents: settlement.net_cents,
            penalty_cents: outcome.cash_penalty_cents,
            event_cents: settlement.event.as_ref().map(|e| e.amount_cents),
        };
        let challenges = apply_shift(&mut state.challenges, &facts);

        state.book_shift(
            outcome.score,
            settlement.net_cents,
            challenges.rewards_cents,
            &outcome.consumed,
        );
        state.push_log(if outcome.cancelled() {
            LOG_SHIFT_CANCELLED
        } else {
            LOG_SHIFT_SETTLED
        });
        for id in &challenges.completed_ids {
            state.push_log(completion_log_key(id));
        }

        Ok(ShiftReceipt {
            outcome,
            settlement,
            challenges,
            carry,
        })
    }

    /// Grant the once-a-day login bonus when it is due, persisting the
    /// grant stamp so a wiped in-game save cannot re-trigger it.
    ///
    /// # Errors
    ///
    /// Returns an error if the stamp cannot be loaded or saved.
    pub fn claim_daily_bonus(
        &self,
        state: &mut GameState,
        now_ms: i64,
    ) -> Result<bool, S::Error> {
        let stored = self.storage.load_bonus_stamp()?.unwrap_or(0);
        let granted = state.claim_daily_bonus(now_ms, stored);
        if granted {
            self.storage.save_bonus_stamp(now_ms)?;
        }
        Ok(granted)
    }

    /// Deal a fresh challenge batch when the active one is empty or a
    /// day old.
    ///
    /// # Errors
    ///
    /// Returns an error if the content tables cannot be loaded.
    pub fn refresh_challenges(
        &self,
        state: &mut GameState,
        now_ms: i64,
        rng: &mut impl Rng,
    ) -> Result<bool, L::Error> {
        let data = self.data_loader.load_game_data()?;
        Ok(state.regenerate_challenges_if_due(&data.challenge_templates, now_ms, rng))
    }

    /// Save a game state.
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game_state)
    }

    /// Load a game state.
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    pub fn load_game(&self, save_name: &str) -> Result<Option<GameState>, S::Error> {
        self.storage.load_game(save_name)
    }

    /// Delete a saved game.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_save(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}

/// In-memory storage, for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    saves: std::cell::RefCell<std::collections::HashMap<String, GameState>>,
    bonus_stamp: std::cell::Cell<Option<i64>>,
}

impl GameStorage for MemoryStorage {
    type Error = std::convert::Infallible;

    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error> {
        self.saves
            .borrow_mut()
            .insert(save_name.to_string(), game_state.clone());
        Ok(())
    }

    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error> {
        Ok(self.saves.borrow().get(save_name).cloned())
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        self.saves.borrow_mut().remove(save_name);
        Ok(())
    }

    fn save_bonus_stamp(&self, stamp_ms: i64) -> Result<(), Self::Error> {
        self.bonus_stamp.set(Some(stamp_ms));
        Ok(())
    }

    fn load_bonus_stamp(&self) -> Result<Option<i64>, Self::Error> {
        Ok(self.bonus_stamp.get())
    }
}
