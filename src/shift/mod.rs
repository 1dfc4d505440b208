//! The arcade shift loop: phases, timing, and its deterministic RNG.

mod session;

pub use session::{Briefing, SessionError, ShiftSession, TapOutcome};

use std::cell::{RefCell, RefMut};

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::constants::{DECISION_TRIGGER_MAX_S, DECISION_TRIGGER_MIN_S, OBSTACLE_CHANCE, SHIFT_SECONDS};

/// Where a shift session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftPhase {
    /// Ride offer on screen; clock not running.
    Briefing,
    /// Clock and field ticking.
    Playing,
    /// Mid-ride prompt; clock frozen.
    Decision,
    /// Shift over; outcome available.
    Terminated,
}

/// Session state that deliberately outlives a single shift: the last
/// passenger served and the last decision asked, so neither repeats
/// back to back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCarry {
    #[serde(default)]
    pub last_passenger_id: Option<String>,
    #[serde(default)]
    pub last_decision_id: Option<String>,
}

/// Shift tunables, serde-defaulted and validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftCfg {
    #[serde(default = "default_shift_seconds")]
    pub shift_seconds: u32,
    #[serde(default = "default_decision_min_s")]
    pub decision_min_s: u32,
    #[serde(default = "default_decision_max_s")]
    pub decision_max_s: u32,
    #[serde(default = "default_obstacle_chance")]
    pub obstacle_chance: f32,
}

fn default_shift_seconds() -> u32 {
    SHIFT_SECONDS
}

fn default_decision_min_s() -> u32 {
    DECISION_TRIGGER_MIN_S
}

fn default_decision_max_s() -> u32 {
    DECISION_TRIGGER_MAX_S
}

fn default_obstacle_chance() -> f32 {
    OBSTACLE_CHANCE
}

impl Default for ShiftCfg {
    fn default() -> Self {
        Self {
            shift_seconds: default_shift_seconds(),
            decision_min_s: default_decision_min_s(),
            decision_max_s: default_decision_max_s(),
            obstacle_chance: default_obstacle_chance(),
        }
    }
}

/// Validation failures for [`ShiftCfg`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftConfigError {
    #[error("shift must run for at least one second")]
    ZeroLength,
    #[error("decision window is inverted")]
    InvertedDecisionWindow,
    #[error("decision window must sit inside the shift clock")]
    DecisionOutsideShift,
    #[error("obstacle chance must be within [0, 1]")]
    ObstacleChanceOutOfRange,
}

impl ShiftCfg {
    /// Check the tunables without altering them.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ShiftConfigError> {
        if self.shift_seconds == 0 {
            return Err(ShiftConfigError::ZeroLength);
        }
        if self.decision_min_s > self.decision_max_s {
            return Err(ShiftConfigError::InvertedDecisionWindow);
        }
        if self.decision_max_s >= self.shift_seconds || self.decision_min_s == 0 {
            return Err(ShiftConfigError::DecisionOutsideShift);
        }
        if !(0.0..=1.0).contains(&self.obstacle_chance) {
            return Err(ShiftConfigError::ObstacleChanceOutOfRange);
        }
        Ok(())
    }

    /// Clamp the tunables into a valid configuration.
    #[must_use]
    pub fn sanitize(mut self) -> Self {
        if self.shift_seconds == 0 {
            self.shift_seconds = default_shift_seconds();
        }
        if self.decision_min_s > self.decision_max_s {
            std::mem::swap(&mut self.decision_min_s, &mut self.decision_max_s);
        }
        self.decision_min_s = self.decision_min_s.clamp(1, self.shift_seconds - 1);
        self.decision_max_s = self.decision_max_s.clamp(self.decision_min_s, self.shift_seconds - 1);
        self.obstacle_chance = self.obstacle_chance.clamp(0.0, 1.0);
        self
    }
}

/// Ticks the shift loop runs on. Each kind is scheduled and cancelled
/// independently; a phase change drops every pending tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// One-second shift clock; also the decision trigger point.
    Countdown,
    /// 40 ms target drift step.
    Movement,
    /// Difficulty-paced spawn roll.
    Spawn,
    /// Difficulty-paced oldest-target eviction.
    Cleanup,
    /// Ambient passenger chatter roll.
    Quote,
    /// One-shot return from DECISION to PLAYING.
    DecisionResume,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledTask {
    kind: TaskKind,
    due_ms: u64,
}

/// A tiny virtual-time scheduler. Tasks are one-shot; periodic ticks
/// re-arm themselves after dispatch so their period can follow the
/// current difficulty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scheduler {
    now_ms: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Drop pending tasks of one kind.
    pub fn cancel(&mut self, kind: TaskKind) {
        self.tasks.retain(|task| task.kind != kind);
    }

    /// Arm a task `delay_ms` from now.
    pub fn schedule_in(&mut self, kind: TaskKind, delay_ms: u64) {
        self.tasks.push(ScheduledTask {
            kind,
            due_ms: self.now_ms + delay_ms,
        });
    }

    #[must_use]
    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|task| task.kind == kind)
    }

    /// Pop the earliest task due at or before `until_ms`, moving the
    /// clock to its due time. Ties resolve in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TaskKind> {
        let mut best: Option<usize> = None;
        for (index, task) in self.tasks.iter().enumerate() {
            if task.due_ms > until_ms {
                continue;
            }
            if best.is_none_or(|b| task.due_ms < self.tasks[b].due_ms) {
                best = Some(index);
            }
        }
        let index = best?;
        let task = self.tasks.remove(index);
        self.now_ms = task.due_ms;
        Some(task.kind)
    }

    /// Move the clock forward without dispatching.
    pub fn advance_to(&mut self, at_ms: u64) {
        if at_ms > self.now_ms {
            self.now_ms = at_ms;
        }
    }
}

/// Deterministic bundle of RNG streams segregated by shift domain,
/// so one extra draw in one subsystem never shifts another.
#[derive(Debug, Clone)]
pub struct RngBundle {
    briefing: RefCell<CountingRng<SmallRng>>,
    spawn: RefCell<CountingRng<SmallRng>>,
    decision: RefCell<CountingRng<SmallRng>>,
    quote: RefCell<CountingRng<SmallRng>>,
    economy: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            briefing: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"briefing"))),
            spawn: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"spawn"))),
            decision: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"decision"))),
            quote: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"quote"))),
            economy: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"economy"))),
        }
    }

    /// Briefing rolls: obstacle vs. passenger, pick, decision time.
    #[must_use]
    pub fn briefing(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.briefing.borrow_mut()
    }

    /// Target spawn rolls.
    #[must_use]
    pub fn spawn(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.spawn.borrow_mut()
    }

    /// Mid-ride decision pick.
    #[must_use]
    pub fn decision(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.decision.borrow_mut()
    }

    /// Ambient chatter and driver quote picks.
    #[must_use]
    pub fn quote(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.quote.borrow_mut()
    }

    /// Settlement tips and event rolls.
    #[must_use]
    pub fn economy(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.economy.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn default_cfg_validates() {
        assert!(ShiftCfg::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_windows() {
        let inverted = ShiftCfg {
            decision_min_s: 9,
            decision_max_s: 5,
            ..ShiftCfg::default()
        };
        assert_eq!(
            inverted.validate(),
            Err(ShiftConfigError::InvertedDecisionWindow)
        );

        let outside = ShiftCfg {
            decision_max_s: 15,
            ..ShiftCfg::default()
        };
        assert_eq!(
            outside.validate(),
            Err(ShiftConfigError::DecisionOutsideShift)
        );

        let chance = ShiftCfg {
            obstacle_chance: 1.5,
            ..ShiftCfg::default()
        };
        assert_eq!(
            chance.validate(),
            Err(ShiftConfigError::ObstacleChanceOutOfRange)
        );
    }

    #[test]
    fn sanitize_produces_a_valid_cfg() {
        let cfg = ShiftCfg {
            shift_seconds: 0,
            decision_min_s: 9,
            decision_max_s: 5,
            obstacle_chance: -0.5,
        }
        .sanitize();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.obstacle_chance, 0.0);
    }

    #[test]
    fn scheduler_pops_in_chronological_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_in(TaskKind::Countdown, 1_000);
        scheduler.schedule_in(TaskKind::Movement, 40);
        scheduler.schedule_in(TaskKind::Spawn, 640);

        assert_eq!(scheduler.pop_due(2_000), Some(TaskKind::Movement));
        assert_eq!(scheduler.now_ms(), 40);
        assert_eq!(scheduler.pop_due(2_000), Some(TaskKind::Spawn));
        assert_eq!(scheduler.pop_due(2_000), Some(TaskKind::Countdown));
        assert_eq!(scheduler.pop_due(2_000), None);
    }

    #[test]
    fn pop_due_respects_the_horizon() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_in(TaskKind::Countdown, 1_000);
        assert_eq!(scheduler.pop_due(999), None);
        assert_eq!(scheduler.pop_due(1_000), Some(TaskKind::Countdown));
    }

    #[test]
    fn cancel_drops_only_that_kind() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_in(TaskKind::Spawn, 100);
        scheduler.schedule_in(TaskKind::Cleanup, 200);
        scheduler.cancel(TaskKind::Spawn);
        assert!(!scheduler.is_scheduled(TaskKind::Spawn));
        assert!(scheduler.is_scheduled(TaskKind::Cleanup));
    }

    #[test]
    fn streams_are_independent_and_reproducible() {
        let a = RngBundle::from_user_seed(0xFEED);
        let b = RngBundle::from_user_seed(0xFEED);
        let first: f32 = a.spawn().random();
        let second: f32 = b.spawn().random();
        assert_eq!(first.to_bits(), second.to_bits());

        // Draining one stream leaves another untouched.
        for _ in 0..16 {
            let _: u32 = a.briefing().random();
        }
        let third: f32 = a.spawn().random();
        let fourth: f32 = b.spawn().random();
        assert_eq!(third.to_bits(), fourth.to_bits());
        assert_eq!(a.briefing().draws(), 16);
    }
}
