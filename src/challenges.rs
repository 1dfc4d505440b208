//! Daily challenges: progress tracking, completion, and regeneration.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{CHALLENGE_BATCH_SIZE, LOG_CHALLENGE_COMPLETE_PREFIX};
use crate::environment::Environment;

/// What a challenge measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeKind {
    /// Net earnings, measured in cents.
    EarnCash,
    /// Shift score points.
    ScorePoints,
    /// Every settled shift, cancelled or not.
    CompleteShifts,
    /// Shifts without a fine and without a negative event.
    NoFines,
}

/// Optional gate on which shifts a challenge counts.
/// A failed condition skips the challenge for that shift entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChallengeCondition {
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub environment: Option<Environment>,
}

impl ChallengeCondition {
    #[must_use]
    pub fn matches(&self, driver_id: &str, environment: Environment) -> bool {
        if let Some(required) = &self.driver_id
            && required != driver_id
        {
            return false;
        }
        if let Some(required) = self.environment
            && required != environment
        {
            return false;
        }
        true
    }
}

/// Blueprint a concrete challenge is stamped from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeTemplate {
    pub description: String,
    pub target: i64,
    pub reward_cents: i64,
    pub kind: ChallengeKind,
    #[serde(default)]
    pub condition: Option<ChallengeCondition>,
}

/// An active daily challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub description: String,
    pub target: i64,
    pub progress: i64,
    pub reward_cents: i64,
    pub completed: bool,
    pub kind: ChallengeKind,
    #[serde(default)]
    pub condition: Option<ChallengeCondition>,
}

impl Challenge {
    fn from_template(template: &ChallengeTemplate, now_ms: i64, index: usize) -> Self {
        Self {
            id: format!("chal-{now_ms}-{index}"),
            description: template.description.clone(),
            target: template.target,
            progress: 0,
            reward_cents: template.reward_cents,
            completed: false,
            kind: template.kind,
            condition: template.condition.clone(),
        }
    }
}

/// The facts of one settled shift that challenges score against.
#[derive(Debug, Clone, Copy)]
pub struct ShiftFacts<'a> {
    pub driver_id: &'a str,
    pub environment: Environment,
    pub score: i32,
    pub net_cents: i64,
    /// Fine carried out of the shift (penalty minus decision bonuses).
    pub penalty_cents: i64,
    /// Amount of the random post-shift event, when one fired.
    pub event_cents: Option<i64>,
}

/// Result of applying one shift to the active challenge set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeUpdate {
    pub rewards_cents: i64,
    pub completed_ids: Vec<String>,
}

/// Advance every eligible challenge by one shift. Completed challenges
/// are frozen; newly completed ones accrue their reward exactly once
/// and clamp progress to the target.
pub fn apply_shift(challenges: &mut [Challenge], facts: &ShiftFacts<'_>) -> ChallengeUpdate {
    let mut update = ChallengeUpdate::default();
    for challenge in challenges.iter_mut() {
        if challenge.completed {
            continue;
        }
        if let Some(condition) = &challenge.condition
            && !condition.matches(facts.driver_id, facts.environment)
        {
            continue;
        }
        let mut progress = challenge.progress;
        match challenge.kind {
            ChallengeKind::EarnCash => progress += facts.net_cents,
            ChallengeKind::ScorePoints => progress += i64::from(facts.score),
            ChallengeKind::CompleteShifts => progress += 1,
            ChallengeKind::NoFines => {
                let clean_event = facts.event_cents.is_none_or(|amount| amount >= 0);
                if facts.penalty_cents == 0 && clean_event {
                    progress += 1;
                }
            }
        }
        let completed = progress >= challenge.target;
        challenge.progress = progress.min(challenge.target);
        if completed {
            challenge.completed = true;
            update.rewards_cents += challenge.reward_cents;
            update.completed_ids.push(challenge.id.clone());
        }
    }
    update
}

/// Stamp a fresh batch of three challenges, templates drawn with
/// replacement.
pub fn regenerate(
    templates: &[ChallengeTemplate],
    now_ms: i64,
    rng: &mut impl Rng,
) -> Vec<Challenge> {
    let mut batch = Vec::with_capacity(CHALLENGE_BATCH_SIZE);
    if templates.is_empty() {
        return batch;
    }
    for index in 0..CHALLENGE_BATCH_SIZE {
        let template = &templates[rng.random_range(0..templates.len())];
        batch.push(Challenge::from_template(template, now_ms, index));
    }
    batch
}

/// Stable log key for a completed challenge.
#[must_use]
pub fn completion_log_key(challenge_id: &str) -> String {
    format!("{LOG_CHALLENGE_COMPLETE_PREFIX}{challenge_id}")
}

/// Built-in challenge templates.
#[must_use]
pub fn default_templates() -> Vec<ChallengeTemplate> {
    vec![
        ChallengeTemplate {
            description: "Earn $100 total".into(),
            target: 10_000,
            reward_cents: 2_000,
            kind: ChallengeKind::EarnCash,
            condition: None,
        },
        ChallengeTemplate {
            description: "Score 500 points".into(),
            target: 500,
            reward_cents: 5_000,
            kind: ChallengeKind::ScorePoints,
            condition: None,
        },
        ChallengeTemplate {
            description: "Complete 5 shifts".into(),
            target: 5,
            reward_cents: 1_500,
            kind: ChallengeKind::CompleteShifts,
            condition: None,
        },
        ChallengeTemplate {
            description: "Clean shift (No fines)".into(),
            target: 3,
            reward_cents: 3_000,
            kind: ChallengeKind::NoFines,
            condition: None,
        },
    ]
}
