//! One shift from briefing to settlement-ready outcome.
//!
//! The session owns the countdown, the target field, the mid-ride
//! decision, and passenger chatter. Time is virtual: the caller pumps
//! [`ShiftSession::advance`] with wall-clock deltas and the session
//! dispatches whatever ticks fell due, in order.

use std::rc::Rc;

use rand::Rng;
use thiserror::Error;

use crate::constants::{
    CANCEL_ENERGY_COST, CANCEL_GAS_COST, CORRECT_TAP_SCORE, COUNTDOWN_TICK_MS, DECISION_RESUME_MS,
    DECOY_PENALTY_CENTS, DECOY_TAP_SCORE, ENERGY_COST_SAVER, ENERGY_COST_STANDARD, GAS_COST_EV,
    GAS_COST_STANDARD, MOVE_TICK_MS, PASSENGER_BONUS_CENTS, PASSENGER_TAP_SCORE, QUOTE_CHANCE,
    QUOTE_TICK_MS, SHIFT_FOOD_COST, SHIFT_SLEEP_COST, SPAWN_SKIP_CHANCE,
};
use crate::data::{Decision, DecisionOption, GameData};
use crate::driver::{EffectiveDriver, QuotePools};
use crate::economy::ShiftOutcome;
use crate::environment::Environment;
use crate::shift::{RngBundle, Scheduler, SessionCarry, ShiftCfg, ShiftPhase, TaskKind};
use crate::state::ResourcesConsumed;
use crate::targets::{cleanup_interval_ms, difficulty_for_score, spawn_interval_ms, Target, TargetField};

/// What the ride offer on the briefing screen is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Briefing {
    /// A passenger waiting for pickup.
    Ride { passenger_id: String },
    /// A problem blocking the ride; cancellable for a small fee.
    Obstacle { obstacle_id: String },
}

/// Immediate feedback from tapping one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapOutcome {
    pub score_delta: i32,
    /// Positive is a bonus, negative a fine.
    pub cash_delta_cents: i64,
    /// Driver reaction line, when the voice pack has one.
    pub quote: Option<String>,
}

/// Things a session refuses to do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("operation not valid in the {0:?} phase")]
    WrongPhase(ShiftPhase),
    #[error("no target with id {0} on the field")]
    UnknownTarget(u32),
    #[error("current briefing is not an obstacle")]
    NotAnObstacle,
    #[error("no decision is waiting for an answer")]
    NoActiveDecision,
    #[error("decision option {0} does not exist")]
    UnknownOption(usize),
    #[error("decision already answered")]
    DecisionAnswered,
    #[error("content pack has no passengers or obstacles")]
    NoContent,
}

/// A single shift in flight.
#[derive(Debug, Clone)]
pub struct ShiftSession {
    data: Rc<GameData>,
    rngs: Rc<RngBundle>,
    driver: EffectiveDriver,
    environment: Environment,
    roster_ids: Vec<String>,
    passenger_ids: Vec<String>,

    phase: ShiftPhase,
    paused: bool,
    scheduler: Scheduler,
    briefing: Briefing,

    time_left_s: u32,
    decision_time_s: u32,
    decision_triggered: bool,
    decision_answered: bool,
    active_decision: Option<Decision>,

    score: i32,
    difficulty: u32,
    penalty_cents: i64,
    bonus_cents: i64,
    gas_used: i32,
    energy_used: i32,

    field: TargetField,
    carry: SessionCarry,
    quote_deck: Vec<usize>,
    chatter: Option<String>,
    outcome: Option<ShiftOutcome>,
}

impl ShiftSession {
    /// Roll a briefing and stand up a fresh session on its clock.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoContent`] when the content pack offers nothing
    /// to brief on.
    pub fn new(
        cfg: ShiftCfg,
        data: Rc<GameData>,
        driver: EffectiveDriver,
        environment: Environment,
        rngs: Rc<RngBundle>,
        carry: SessionCarry,
    ) -> Result<Self, SessionError> {
        let briefing = {
            let mut rng = rngs.briefing();
            let obstacle = rng.random::<f32>() < cfg.obstacle_chance && !data.obstacles.is_empty();
            if obstacle {
                let index = rng.random_range(0..data.obstacles.len());
                Briefing::Obstacle {
                    obstacle_id: data.obstacles[index].id.clone(),
                }
            } else if data.passengers.is_empty() {
                if data.obstacles.is_empty() {
                    return Err(SessionError::NoContent);
                }
                let index = rng.random_range(0..data.obstacles.len());
                Briefing::Obstacle {
                    obstacle_id: data.obstacles[index].id.clone(),
                }
            } else {
                // Never offer the same passenger twice in a row.
                let fresh: Vec<&String> = data
                    .passengers
                    .iter()
                    .map(|p| &p.id)
                    .filter(|id| Some(id.as_str()) != carry.last_passenger_id.as_deref())
                    .collect();
                let id = if fresh.is_empty() {
                    data.passengers[rng.random_range(0..data.passengers.len())].id.clone()
                } else {
                    fresh[rng.random_range(0..fresh.len())].clone()
                };
                Briefing::Ride { passenger_id: id }
            }
        };

        let decision_time_s = rngs
            .briefing()
            .random_range(cfg.decision_min_s..=cfg.decision_max_s);

        let roster_ids = data.drivers.iter().map(|d| d.id.clone()).collect();
        let passenger_ids = data.passengers.iter().map(|p| p.id.clone()).collect();

        Ok(Self {
            time_left_s: cfg.shift_seconds,
            data,
            rngs,
            driver,
            environment,
            roster_ids,
            passenger_ids,
            phase: ShiftPhase::Briefing,
            paused: false,
            scheduler: Scheduler::default(),
            briefing,
            decision_time_s,
            decision_triggered: false,
            decision_answered: false,
            active_decision: None,
            score: 0,
            difficulty: difficulty_for_score(0),
            penalty_cents: 0,
            bonus_cents: 0,
            gas_used: 0,
            energy_used: 0,
            field: TargetField::new(),
            carry,
            quote_deck: Vec::new(),
            chatter: None,
            outcome: None,
        })
    }

    #[must_use]
    pub const fn phase(&self) -> ShiftPhase {
        self.phase
    }

    #[must_use]
    pub const fn time_left_s(&self) -> u32 {
        self.time_left_s
    }

    #[must_use]
    pub const fn score(&self) -> i32 {
        self.score
    }

    #[must_use]
    pub const fn difficulty(&self) -> u32 {
        self.difficulty
    }

    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub const fn briefing(&self) -> &Briefing {
        &self.briefing
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        self.field.targets()
    }

    #[must_use]
    pub const fn active_decision(&self) -> Option<&Decision> {
        self.active_decision.as_ref()
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<&ShiftOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub const fn carry(&self) -> &SessionCarry {
        &self.carry
    }

    /// Shared handle to the session's RNG streams; settlement draws
    /// from the economy stream after the session ends.
    #[must_use]
    pub fn rng_bundle(&self) -> Rc<RngBundle> {
        Rc::clone(&self.rngs)
    }

    /// Pull the pending chatter line, clearing the bubble.
    pub fn take_chatter(&mut self) -> Option<String> {
        self.chatter.take()
    }

    /// Leave the briefing screen and start the clock.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongPhase`] outside the briefing.
    pub fn accept_ride(&mut self) -> Result<(), SessionError> {
        if self.phase != ShiftPhase::Briefing {
            return Err(SessionError::WrongPhase(self.phase));
        }
        if let Briefing::Ride { passenger_id } = &self.briefing {
            self.carry.last_passenger_id = Some(passenger_id.clone());
        }
        self.enter_playing();
        Ok(())
    }

    /// Walk away from an obstacle briefing. The platform pays a small
    /// cancellation fee, but pulling over still burns a little gas and
    /// energy.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongPhase`] outside the briefing,
    /// [`SessionError::NotAnObstacle`] when a passenger is waiting.
    pub fn cancel_ride(&mut self) -> Result<&ShiftOutcome, SessionError> {
        if self.phase != ShiftPhase::Briefing {
            return Err(SessionError::WrongPhase(self.phase));
        }
        let Briefing::Obstacle { obstacle_id } = &self.briefing else {
            return Err(SessionError::NotAnObstacle);
        };
        let fee_cents = self
            .data
            .obstacles
            .iter()
            .find(|o| &o.id == obstacle_id)
            .map_or(0, |o| o.fee_cents);

        self.scheduler.clear();
        self.phase = ShiftPhase::Terminated;
        Ok(self.outcome.insert(ShiftOutcome {
            score: 0,
            cash_penalty_cents: 0,
            consumed: ResourcesConsumed {
                gas: CANCEL_GAS_COST,
                energy: CANCEL_ENERGY_COST,
                food: 0,
                sleep: 0,
            },
            cancellation_fee_cents: Some(fee_cents),
            passenger_id: None,
        }))
    }

    /// Pump virtual time forward, dispatching every tick that falls
    /// due. Does nothing while paused or outside the live phases.
    pub fn advance(&mut self, delta_ms: u64) {
        if self.paused || !matches!(self.phase, ShiftPhase::Playing | ShiftPhase::Decision) {
            return;
        }
        let until = self.scheduler.now_ms() + delta_ms;
        while let Some(kind) = self.scheduler.pop_due(until) {
            self.dispatch(kind);
            if self.phase == ShiftPhase::Terminated {
                return;
            }
        }
        self.scheduler.advance_to(until);
    }

    /// Freeze the session; [`advance`](Self::advance) becomes a no-op.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Tap one target on the field.
    ///
    /// The target comes off the field before any effect lands, so a
    /// double tap on the same id misses.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongPhase`] unless playing,
    /// [`SessionError::UnknownTarget`] when the id is gone.
    pub fn tap(&mut self, id: u32) -> Result<TapOutcome, SessionError> {
        if self.phase != ShiftPhase::Playing {
            return Err(SessionError::WrongPhase(self.phase));
        }
        let target = self
            .field
            .take(id)
            .ok_or(SessionError::UnknownTarget(id))?;

        let result = match &target.kind {
            crate::targets::TargetKind::Passenger { .. } => {
                self.score += PASSENGER_TAP_SCORE;
                self.bonus_cents += PASSENGER_BONUS_CENTS;
                TapOutcome {
                    score_delta: PASSENGER_TAP_SCORE,
                    cash_delta_cents: PASSENGER_BONUS_CENTS,
                    quote: None,
                }
            }
            crate::targets::TargetKind::Driver { driver_id, decoy: true } => {
                self.score += DECOY_TAP_SCORE;
                self.penalty_cents += DECOY_PENALTY_CENTS;
                TapOutcome {
                    score_delta: DECOY_TAP_SCORE,
                    cash_delta_cents: -DECOY_PENALTY_CENTS,
                    // The decoy speaks its own miss line.
                    quote: self.voice_line(driver_id, true),
                }
            }
            crate::targets::TargetKind::Driver { .. } => {
                self.score += CORRECT_TAP_SCORE;
                self.gas_used += if self.driver.ev { GAS_COST_EV } else { GAS_COST_STANDARD };
                self.energy_used += if self.driver.energy_saver {
                    ENERGY_COST_SAVER
                } else {
                    ENERGY_COST_STANDARD
                };
                TapOutcome {
                    score_delta: CORRECT_TAP_SCORE,
                    cash_delta_cents: 0,
                    quote: self.voice_line(&self.driver.id, false),
                }
            }
        };

        // Score only ever ratchets difficulty up.
        self.difficulty = self.difficulty.max(difficulty_for_score(self.score));
        self.ensure_populated();
        Ok(result)
    }

    /// Answer the mid-ride decision. The clock stays frozen for one
    /// more second while the result text is on screen.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongPhase`] outside a decision,
    /// [`SessionError::UnknownOption`] for a bad index,
    /// [`SessionError::DecisionAnswered`] on a second answer.
    pub fn choose_decision(&mut self, option_index: usize) -> Result<&DecisionOption, SessionError> {
        if self.phase != ShiftPhase::Decision {
            return Err(SessionError::WrongPhase(self.phase));
        }
        if self.decision_answered {
            return Err(SessionError::DecisionAnswered);
        }
        let decision = self
            .active_decision
            .as_ref()
            .ok_or(SessionError::NoActiveDecision)?;
        let option = decision
            .options
            .get(option_index)
            .ok_or(SessionError::UnknownOption(option_index))?;

        self.bonus_cents += option.reward_cents;
        self.decision_answered = true;
        self.scheduler.schedule_in(TaskKind::DecisionResume, DECISION_RESUME_MS);
        Ok(option)
    }

    /// End the shift right now with whatever was earned so far.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongPhase`] unless the shift is live.
    pub fn quit(&mut self) -> Result<&ShiftOutcome, SessionError> {
        if !matches!(self.phase, ShiftPhase::Playing | ShiftPhase::Decision) {
            return Err(SessionError::WrongPhase(self.phase));
        }
        Ok(self.terminate())
    }

    /// Tear the session down into its outcome and carry-over, if over.
    #[must_use]
    pub fn into_parts(self) -> (Option<ShiftOutcome>, SessionCarry) {
        (self.outcome, self.carry)
    }

    fn enter_playing(&mut self) {
        self.phase = ShiftPhase::Playing;
        self.scheduler.clear();
        self.scheduler.schedule_in(TaskKind::Countdown, COUNTDOWN_TICK_MS);
        self.scheduler.schedule_in(TaskKind::Movement, MOVE_TICK_MS);
        self.scheduler
            .schedule_in(TaskKind::Spawn, spawn_interval_ms(self.difficulty));
        self.scheduler
            .schedule_in(TaskKind::Cleanup, cleanup_interval_ms(self.difficulty));
        self.scheduler.schedule_in(TaskKind::Quote, QUOTE_TICK_MS);
        self.ensure_populated();
    }

    fn dispatch(&mut self, kind: TaskKind) {
        match kind {
            TaskKind::Countdown => self.countdown_tick(),
            TaskKind::Movement => {
                self.field.step_movement();
                self.scheduler.schedule_in(TaskKind::Movement, MOVE_TICK_MS);
            }
            TaskKind::Spawn => {
                let skip = self.rngs.spawn().random::<f32>() < SPAWN_SKIP_CHANCE;
                if !skip {
                    self.spawn_one();
                }
                self.scheduler
                    .schedule_in(TaskKind::Spawn, spawn_interval_ms(self.difficulty));
            }
            TaskKind::Cleanup => {
                self.field.cleanup();
                self.scheduler
                    .schedule_in(TaskKind::Cleanup, cleanup_interval_ms(self.difficulty));
            }
            TaskKind::Quote => {
                self.quote_tick();
                self.scheduler.schedule_in(TaskKind::Quote, QUOTE_TICK_MS);
            }
            TaskKind::DecisionResume => {
                self.active_decision = None;
                self.enter_playing();
            }
        }
    }

    fn countdown_tick(&mut self) {
        if self.time_left_s == self.decision_time_s
            && !self.decision_triggered
            && !self.data.decisions.is_empty()
        {
            self.trigger_decision();
            return;
        }
        if self.time_left_s <= 1 {
            self.terminate();
            return;
        }
        self.time_left_s -= 1;
        self.scheduler.schedule_in(TaskKind::Countdown, COUNTDOWN_TICK_MS);
    }

    fn trigger_decision(&mut self) {
        let decision = {
            let mut rng = self.rngs.decision();
            let fresh: Vec<&Decision> = self
                .data
                .decisions
                .iter()
                .filter(|d| Some(d.id.as_str()) != self.carry.last_decision_id.as_deref())
                .collect();
            if fresh.is_empty() {
                self.data.decisions[rng.random_range(0..self.data.decisions.len())].clone()
            } else {
                fresh[rng.random_range(0..fresh.len())].clone()
            }
        };
        self.carry.last_decision_id = Some(decision.id.clone());
        self.decision_triggered = true;
        self.decision_answered = false;
        self.active_decision = Some(decision);
        self.phase = ShiftPhase::Decision;
        self.scheduler.clear();
    }

    fn quote_tick(&mut self) {
        if self.chatter.is_some() || self.data.quotes.is_empty() {
            return;
        }
        let mut rng = self.rngs.quote();
        if rng.random::<f32>() >= QUOTE_CHANCE {
            return;
        }
        // Cycle the whole pool before any line repeats.
        if self.quote_deck.is_empty() {
            self.quote_deck = (0..self.data.quotes.len()).collect();
        }
        let pick = rng.random_range(0..self.quote_deck.len());
        let index = self.quote_deck.swap_remove(pick);
        self.chatter = Some(self.data.quotes[index].clone());
    }

    fn voice_line(&self, driver_id: &str, miss: bool) -> Option<String> {
        let driver = self.data.driver(driver_id)?;
        let pool = if miss { &driver.quotes.miss } else { &driver.quotes.tap };
        let mut rng = self.rngs.quote();
        QuotePools::pick(pool, &mut *rng).map(str::to_string)
    }

    fn spawn_one(&mut self) {
        let mut rng = self.rngs.spawn();
        self.field.spawn(
            &mut *rng,
            self.difficulty,
            &self.driver.id,
            &self.roster_ids,
            &self.passenger_ids,
        );
    }

    fn ensure_populated(&mut self) {
        if self.phase == ShiftPhase::Playing && self.field.is_empty() {
            self.spawn_one();
        }
    }

    fn terminate(&mut self) -> &ShiftOutcome {
        let passenger_id = match &self.briefing {
            Briefing::Ride { passenger_id } => Some(passenger_id.clone()),
            Briefing::Obstacle { .. } => None,
        };
        self.scheduler.clear();
        self.phase = ShiftPhase::Terminated;
        self.outcome.insert(ShiftOutcome {
            score: self.score,
            cash_penalty_cents: self.penalty_cents - self.bonus_cents,
            consumed: ResourcesConsumed {
                gas: self.gas_used,
                energy: self.energy_used,
                food: SHIFT_FOOD_COST,
                sleep: SHIFT_SLEEP_COST,
            },
            cancellation_fee_cents: None,
            passenger_id,
        })
    }
}
