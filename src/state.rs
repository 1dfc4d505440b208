//! Persistent meta-game state between shifts.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::challenges::{self, Challenge, ChallengeTemplate};
use crate::constants::{
    DAILY_BONUS_CENTS, DAY_MS, DEBUG_ENV_VAR, LOG_CHALLENGES_RESET, LOG_DAILY_BONUS, RESOURCE_MAX,
    RESOURCE_EXHAUSTION_THRESHOLD, STARTING_CASH_CENTS,
};
use crate::payment::PaymentMethod;

/// The four driver gauges, each clamped to 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGauges {
    pub gas: i32,
    pub energy: i32,
    pub food: i32,
    pub sleep: i32,
}

impl Default for ResourceGauges {
    fn default() -> Self {
        Self {
            gas: RESOURCE_MAX,
            energy: RESOURCE_MAX,
            food: RESOURCE_MAX,
            sleep: RESOURCE_MAX,
        }
    }
}

impl ResourceGauges {
    pub fn clamp(&mut self) {
        self.gas = self.gas.clamp(0, RESOURCE_MAX);
        self.energy = self.energy.clamp(0, RESOURCE_MAX);
        self.food = self.food.clamp(0, RESOURCE_MAX);
        self.sleep = self.sleep.clamp(0, RESOURCE_MAX);
    }

    /// Subtract consumption, saturating at zero.
    pub fn consume(&mut self, used: &ResourcesConsumed) {
        self.gas -= used.gas;
        self.energy -= used.energy;
        self.food -= used.food;
        self.sleep -= used.sleep;
        self.clamp();
    }
}

/// Resources a single shift burned through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesConsumed {
    #[serde(default)]
    pub gas: i32,
    #[serde(default)]
    pub energy: i32,
    #[serde(default)]
    pub food: i32,
    #[serde(default)]
    pub sleep: i32,
}

/// Why a shift could not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftGateError {
    #[error("not enough {resource} to start a shift; visit the rest stop")]
    Exhausted { resource: String },
}

/// Full persistent game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Wallet in cents to avoid floating-point drift.
    #[serde(default = "default_cash_cents")]
    pub cash_cents: i64,
    #[serde(default)]
    pub gauges: ResourceGauges,
    #[serde(default = "default_driver_id")]
    pub current_driver_id: String,
    #[serde(default = "default_owned_drivers")]
    pub owned_driver_ids: Vec<String>,
    #[serde(default)]
    pub owned_addon_ids: Vec<String>,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub high_score: i32,
    #[serde(default)]
    pub shift_count: u32,
    #[serde(default)]
    pub challenges: Vec<Challenge>,
    /// Epoch milliseconds of the last challenge regeneration.
    #[serde(default)]
    pub last_challenge_reset_ms: i64,
    /// Epoch milliseconds of the last daily bonus grant.
    #[serde(default)]
    pub last_daily_bonus_ms: i64,
    /// Stable log keys, append-only.
    #[serde(default)]
    pub logs: Vec<String>,
}

fn default_cash_cents() -> i64 {
    STARTING_CASH_CENTS
}

fn default_driver_id() -> String {
    String::from("randy")
}

fn default_owned_drivers() -> Vec<String> {
    vec![String::from("randy")]
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            cash_cents: default_cash_cents(),
            gauges: ResourceGauges::default(),
            current_driver_id: default_driver_id(),
            owned_driver_ids: default_owned_drivers(),
            owned_addon_ids: Vec::new(),
            payment_methods: Vec::new(),
            score: 0,
            high_score: 0,
            shift_count: 0,
            challenges: Vec::new(),
            last_challenge_reset_ms: 0,
            last_daily_bonus_ms: 0,
            logs: Vec::new(),
        }
    }
}

impl GameState {
    /// Append a stable log key.
    pub fn push_log(&mut self, key: impl Into<String>) {
        let key = key.into();
        if debug_log_enabled() {
            eprintln!("[hustle] {key}");
        }
        self.logs.push(key);
    }

    /// Whether a driver is owned.
    #[must_use]
    pub fn owns_driver(&self, id: &str) -> bool {
        self.owned_driver_ids.iter().any(|owned| owned == id)
    }

    /// Whether an addon is owned.
    #[must_use]
    pub fn owns_addon(&self, id: &str) -> bool {
        self.owned_addon_ids.iter().any(|owned| owned == id)
    }

    /// Gate for starting a shift: running on fumes or falling asleep
    /// blocks with an advisory naming the drained resource.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftGateError::Exhausted`] when gas (or charge, for an
    /// EV) or sleep is at or below the exhaustion threshold.
    pub fn check_shift_gate(&self, ev: bool) -> Result<(), ShiftGateError> {
        if self.gauges.gas <= RESOURCE_EXHAUSTION_THRESHOLD {
            let resource = if ev { "charge" } else { "gas" };
            return Err(ShiftGateError::Exhausted {
                resource: resource.to_string(),
            });
        }
        if self.gauges.sleep <= RESOURCE_EXHAUSTION_THRESHOLD {
            return Err(ShiftGateError::Exhausted {
                resource: "sleep".to_string(),
            });
        }
        Ok(())
    }

    /// Grant the daily bonus at most once per 24-hour window. The grant
    /// is double-gated: `stored_stamp_ms` is the platform-persisted
    /// stamp (survives save wipes), the in-state stamp covers restored
    /// saves. Returns whether the bonus was granted.
    pub fn claim_daily_bonus(&mut self, now_ms: i64, stored_stamp_ms: i64) -> bool {
        if now_ms - stored_stamp_ms <= DAY_MS {
            return false;
        }
        if self.last_daily_bonus_ms > 0 && now_ms - self.last_daily_bonus_ms < DAY_MS {
            return false;
        }
        self.cash_cents += DAILY_BONUS_CENTS;
        self.last_daily_bonus_ms = now_ms;
        self.push_log(LOG_DAILY_BONUS);
        true
    }

    /// Regenerate the daily challenge batch when the set is empty or
    /// older than 24 hours. Returns whether a regeneration happened.
    pub fn regenerate_challenges_if_due(
        &mut self,
        templates: &[ChallengeTemplate],
        now_ms: i64,
        rng: &mut impl Rng,
    ) -> bool {
        let stale = now_ms - self.last_challenge_reset_ms > DAY_MS;
        if !self.challenges.is_empty() && !stale {
            return false;
        }
        self.challenges = challenges::regenerate(templates, now_ms, rng);
        self.last_challenge_reset_ms = now_ms;
        self.push_log(LOG_CHALLENGES_RESET);
        true
    }

    /// Book the money and bookkeeping side of a settled shift: wallet
    /// credit, gauge burn, score, high score, and shift count.
    pub fn book_shift(
        &mut self,
        score: i32,
        net_cents: i64,
        challenge_rewards_cents: i64,
        consumed: &ResourcesConsumed,
    ) {
        self.cash_cents += net_cents + challenge_rewards_cents;
        self.gauges.consume(consumed);
        self.score = score;
        self.high_score = self.high_score.max(score);
        self.shift_count += 1;
    }
}

/// Ad-hoc debug printing is opt-in via environment variable.
#[must_use]
pub fn debug_log_enabled() -> bool {
    std::env::var(DEBUG_ENV_VAR).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
