//! Centralized balance and tuning constants for Hustle game logic.
//!
//! These values define the deterministic math for the shift loop and the
//! settlement economy. Keeping them together ensures that gameplay can only
//! be adjusted via code changes reviewed in version control, rather than
//! through external assets.

// Logging keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "HUSTLE_DEBUG_LOGS";
pub(crate) const LOG_SHIFT_SETTLED: &str = "log.shift.settled";
pub(crate) const LOG_SHIFT_CANCELLED: &str = "log.shift.cancelled";
pub(crate) const LOG_DAILY_BONUS: &str = "log.daily-bonus";
pub(crate) const LOG_CHALLENGES_RESET: &str = "log.challenges.reset";
pub(crate) const LOG_CHALLENGE_COMPLETE_PREFIX: &str = "log.challenge.complete.";
pub(crate) const LOG_DRIVER_UNLOCKED_PREFIX: &str = "log.driver.unlocked.";
pub(crate) const LOG_ADDON_UNLOCKED_PREFIX: &str = "log.addon.unlocked.";
pub(crate) const LOG_RESTOCK_PREFIX: &str = "log.restock.";
pub(crate) const LOG_CASH_PACK: &str = "log.cash-pack";
pub(crate) const LOG_PAYMENT_ADDED: &str = "log.payment.added";

// Shift clock --------------------------------------------------------------
pub(crate) const SHIFT_SECONDS: u32 = 15;
pub(crate) const COUNTDOWN_TICK_MS: u64 = 1_000;
pub(crate) const DECISION_TRIGGER_MIN_S: u32 = 5;
pub(crate) const DECISION_TRIGGER_MAX_S: u32 = 9;
pub(crate) const DECISION_RESUME_MS: u64 = 1_000;

// Briefing rolls -----------------------------------------------------------
pub(crate) const OBSTACLE_CHANCE: f32 = 0.15;
pub(crate) const QUOTE_TICK_MS: u64 = 2_000;
pub(crate) const QUOTE_CHANCE: f32 = 0.30;

// Target field -------------------------------------------------------------
pub(crate) const PASSENGER_TARGET_CHANCE: f32 = 0.15;
pub(crate) const DECOY_CHANCE: f32 = 0.30;
pub(crate) const MOVE_TICK_MS: u64 = 40;
pub(crate) const SPAWN_BASE_MS: u64 = 700;
pub(crate) const SPAWN_STEP_MS: u64 = 60;
pub(crate) const SPAWN_MIN_MS: u64 = 250;
pub(crate) const SPAWN_SKIP_CHANCE: f32 = 0.10;
pub(crate) const CLEANUP_BASE_MS: u64 = 1_500;
pub(crate) const CLEANUP_STEP_MS: u64 = 120;
pub(crate) const CLEANUP_MIN_MS: u64 = 400;
pub(crate) const MAX_LIVE_TARGETS: usize = 4;
pub(crate) const DIFFICULTY_SCORE_STEP: i32 = 40;
pub(crate) const TARGET_SPEED_BASE: f32 = 0.5;
pub(crate) const TARGET_SPEED_PER_DIFFICULTY: f32 = 0.2;
pub(crate) const SPAWN_X_MIN: f32 = 15.0;
pub(crate) const SPAWN_X_SPAN: f32 = 70.0;
pub(crate) const SPAWN_Y_MIN: f32 = 15.0;
pub(crate) const SPAWN_Y_SPAN: f32 = 60.0;
pub(crate) const FIELD_MIN: f32 = 5.0;
pub(crate) const FIELD_MAX: f32 = 95.0;

// Tap scoring --------------------------------------------------------------
pub(crate) const CORRECT_TAP_SCORE: i32 = 10;
pub(crate) const DECOY_TAP_SCORE: i32 = -50;
pub(crate) const PASSENGER_TAP_SCORE: i32 = 25;
pub(crate) const DECOY_PENALTY_CENTS: i64 = 50;
pub(crate) const PASSENGER_BONUS_CENTS: i64 = 10;
pub(crate) const GAS_COST_STANDARD: i32 = 2;
pub(crate) const GAS_COST_EV: i32 = 1;
pub(crate) const ENERGY_COST_STANDARD: i32 = 2;
pub(crate) const ENERGY_COST_SAVER: i32 = 1;

// Per-shift fixed consumption ----------------------------------------------
pub(crate) const SHIFT_FOOD_COST: i32 = 5;
pub(crate) const SHIFT_SLEEP_COST: i32 = 5;
pub(crate) const CANCEL_GAS_COST: i32 = 1;
pub(crate) const CANCEL_ENERGY_COST: i32 = 1;

// Settlement economy -------------------------------------------------------
pub(crate) const FARE_DOLLARS_PER_POINT: f64 = 0.02;
pub(crate) const TIP_BASE_MIN: f64 = 0.10;
pub(crate) const TIP_BASE_SPAN: f64 = 0.20;
pub(crate) const TIP_CAP_CENTS: i64 = 1_000;
pub(crate) const NET_FLOOR_CENTS: i64 = -2_000;
pub(crate) const SHIFT_EVENT_CHANCE: f64 = 0.15;

// Meta-game ----------------------------------------------------------------
pub(crate) const STARTING_CASH_CENTS: i64 = 5_000;
pub(crate) const RESOURCE_MAX: i32 = 100;
pub(crate) const RESOURCE_EXHAUSTION_THRESHOLD: i32 = 10;
pub(crate) const DAILY_BONUS_CENTS: i64 = 2_500;
pub(crate) const DAY_MS: i64 = 24 * 60 * 60 * 1_000;
pub(crate) const CHALLENGE_BATCH_SIZE: usize = 3;
pub(crate) const CASH_PACK_CENTS: i64 = 5_000;

// Content fallbacks --------------------------------------------------------
pub(crate) const FALLBACK_SHIFT_REPORT: &str =
    "The app connection is spotty, but the cash is real.";
pub(crate) const CANCELLED_SHIFT_REPORT: &str =
    "Shift cancelled. Got paid a small fee though. #hustle";
