//! The tap-target field: spawning, drift, and eviction.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    CLEANUP_BASE_MS, CLEANUP_MIN_MS, CLEANUP_STEP_MS, DECOY_CHANCE, DIFFICULTY_SCORE_STEP,
    FIELD_MAX, FIELD_MIN, MAX_LIVE_TARGETS, PASSENGER_TARGET_CHANCE, SPAWN_BASE_MS, SPAWN_MIN_MS,
    SPAWN_STEP_MS, SPAWN_X_MIN, SPAWN_X_SPAN, SPAWN_Y_MIN, SPAWN_Y_SPAN, TARGET_SPEED_BASE,
    TARGET_SPEED_PER_DIFFICULTY,
};

/// What a tappable blob on the field actually is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// Bonus rider; tapping it is always right.
    Passenger { passenger_id: String },
    /// A car. Decoys wear another driver's face and cost you.
    Driver { driver_id: String, decoy: bool },
}

/// One live target. Coordinates are percentages of the play field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub kind: TargetKind,
}

/// Difficulty tier for a score. Always at least 1.
#[must_use]
pub fn difficulty_for_score(score: i32) -> u32 {
    let positive = score.max(0);
    (positive / DIFFICULTY_SCORE_STEP + 1).unsigned_abs()
}

/// Spawn cadence tightens with difficulty, to a floor.
#[must_use]
pub fn spawn_interval_ms(difficulty: u32) -> u64 {
    SPAWN_BASE_MS
        .saturating_sub(SPAWN_STEP_MS * u64::from(difficulty))
        .max(SPAWN_MIN_MS)
}

/// Eviction cadence tightens with difficulty, to a floor.
#[must_use]
pub fn cleanup_interval_ms(difficulty: u32) -> u64 {
    CLEANUP_BASE_MS
        .saturating_sub(CLEANUP_STEP_MS * u64::from(difficulty))
        .max(CLEANUP_MIN_MS)
}

/// The set of live targets. Bounded; the cleanup tick evicts the
/// oldest when the field runs over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetField {
    targets: SmallVec<[Target; 8]>,
    next_id: u32,
}

impl TargetField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Remove a target by id, returning it. The caller applies effects
    /// strictly after removal so a tap can never double-fire.
    pub fn take(&mut self, id: u32) -> Option<Target> {
        let index = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(index))
    }

    /// Roll and place one new target.
    ///
    /// 15% passenger, otherwise a car with a 30% decoy chance. A decoy
    /// never wears the active driver's face while another driver
    /// exists. Targets drift only at difficulty 2 and above.
    pub fn spawn(
        &mut self,
        rng: &mut impl Rng,
        difficulty: u32,
        active_driver_id: &str,
        roster_ids: &[String],
        passenger_ids: &[String],
    ) -> &Target {
        let x = SPAWN_X_MIN + rng.random::<f32>() * SPAWN_X_SPAN;
        let y = SPAWN_Y_MIN + rng.random::<f32>() * SPAWN_Y_SPAN;
        let (mut vx, mut vy) = (0.0, 0.0);
        if difficulty >= 2 {
            #[allow(clippy::cast_precision_loss)]
            let speed = TARGET_SPEED_BASE + difficulty as f32 * TARGET_SPEED_PER_DIFFICULTY;
            vx = (rng.random::<f32>() - 0.5) * speed;
            vy = (rng.random::<f32>() - 0.5) * speed;
        }

        let kind = if rng.random::<f32>() < PASSENGER_TARGET_CHANCE && !passenger_ids.is_empty() {
            let passenger_id = passenger_ids[rng.random_range(0..passenger_ids.len())].clone();
            TargetKind::Passenger { passenger_id }
        } else {
            let decoy = rng.random::<f32>() < DECOY_CHANCE;
            let driver_id = if decoy {
                let others: Vec<&String> = roster_ids
                    .iter()
                    .filter(|id| id.as_str() != active_driver_id)
                    .collect();
                if others.is_empty() {
                    active_driver_id.to_string()
                } else {
                    others[rng.random_range(0..others.len())].clone()
                }
            } else {
                active_driver_id.to_string()
            };
            TargetKind::Driver { driver_id, decoy }
        };

        let id = self.next_id;
        self.next_id += 1;
        self.targets.push(Target {
            id,
            x,
            y,
            vx,
            vy,
            kind,
        });
        // Just pushed, so last() is present.
        &self.targets[self.targets.len() - 1]
    }

    /// One 40 ms movement step: drift and reflect off the field box.
    pub fn step_movement(&mut self) {
        for target in &mut self.targets {
            if target.vx == 0.0 && target.vy == 0.0 {
                continue;
            }
            target.x += target.vx;
            target.y += target.vy;
            if target.x <= FIELD_MIN || target.x >= FIELD_MAX {
                target.vx = -target.vx;
                target.x = target.x.clamp(FIELD_MIN, FIELD_MAX);
            }
            if target.y <= FIELD_MIN || target.y >= FIELD_MAX {
                target.vy = -target.vy;
                target.y = target.y.clamp(FIELD_MIN, FIELD_MAX);
            }
        }
    }

    /// Cleanup tick: evict the oldest target when the field runs over.
    pub fn cleanup(&mut self) {
        if self.targets.len() > MAX_LIVE_TARGETS {
            self.targets.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn difficulty_steps_every_forty_points() {
        assert_eq!(difficulty_for_score(-200), 1);
        assert_eq!(difficulty_for_score(0), 1);
        assert_eq!(difficulty_for_score(39), 1);
        assert_eq!(difficulty_for_score(40), 2);
        assert_eq!(difficulty_for_score(120), 4);
    }

    #[test]
    fn cadences_tighten_to_their_floors()  {
        assert_eq!(spawn_interval_ms(1), 640);
        assert_eq!(spawn_interval_ms(20), 250);
        assert_eq!(cleanup_interval_ms(1), 1_380);
        assert_eq!(cleanup_interval_ms(20), 400);
    }

    #[test]
    fn spawn_positions_land_in_the_spawn_box() {
        let mut field = TargetField::new();
        let mut rng = SmallRng::seed_from_u64(5);
        let roster = ids(&["randy", "tran"]);
        let passengers = ids(&["p_quiet"]);
        for _ in 0..64 {
            let target = field.spawn(&mut rng, 1, "randy", &roster, &passengers);
            assert!(target.x >= 15.0 && target.x <= 85.0);
            assert!(target.y >= 15.0 && target.y <= 75.0);
            assert_eq!(target.vx, 0.0);
            assert_eq!(target.vy, 0.0);
        }
    }

    #[test]
    fn decoys_never_wear_the_active_driver() {
        let mut field = TargetField::new();
        let mut rng = SmallRng::seed_from_u64(11);
        let roster = ids(&["randy", "skyler", "tran"]);
        let passengers = ids(&["p_quiet"]);
        let mut decoys_seen = 0;
        for _ in 0..256 {
            field.spawn(&mut rng, 1, "randy", &roster, &passengers);
        }
        for target in field.targets() {
            if let TargetKind::Driver { driver_id, decoy: true } = &target.kind {
                decoys_seen += 1;
                assert_ne!(driver_id, "randy");
            }
        }
        assert!(decoys_seen > 0);
    }

    #[test]
    fn velocity_appears_from_difficulty_two() {
        let mut field = TargetField::new();
        let mut rng = SmallRng::seed_from_u64(17);
        let roster = ids(&["randy", "tran"]);
        let passengers = ids(&["p_quiet"]);
        let mut moving = 0;
        for _ in 0..32 {
            let target = field.spawn(&mut rng, 3, "randy", &roster, &passengers);
            if target.vx != 0.0 || target.vy != 0.0 {
                moving += 1;
            }
            let speed_cap = 0.5 + 3.0 * 0.2;
            assert!(target.vx.abs() <= speed_cap / 2.0 + f32::EPSILON);
        }
        assert!(moving > 0);
    }

    #[test]
    fn movement_reflects_off_the_field_box() {
        let mut field = TargetField::new();
        field.targets.push(Target {
            id: 0,
            x: 94.8,
            y: 50.0,
            vx: 1.0,
            vy: 0.0,
            kind: TargetKind::Driver {
                driver_id: "randy".into(),
                decoy: false,
            },
        });
        field.step_movement();
        let target = &field.targets()[0];
        assert!(target.x <= FIELD_MAX);
        assert!(target.vx < 0.0);
    }

    #[test]
    fn cleanup_evicts_only_the_oldest_beyond_the_cap() {
        let mut field = TargetField::new();
        let mut rng = SmallRng::seed_from_u64(23);
        let roster = ids(&["randy", "tran"]);
        let passengers = ids(&["p_quiet"]);
        for _ in 0..6 {
            field.spawn(&mut rng, 1, "randy", &roster, &passengers);
        }
        assert_eq!(field.len(), 6);
        field.cleanup();
        assert_eq!(field.len(), 5);
        assert_eq!(field.targets()[0].id, 1);
        field.cleanup();
        assert_eq!(field.len(), 4);
        field.cleanup();
        assert_eq!(field.len(), 4);
    }

    #[test]
    fn take_removes_exactly_one_target() {
        let mut field = TargetField::new();
        let mut rng = SmallRng::seed_from_u64(29);
        let roster = ids(&["randy", "tran"]);
        let passengers = ids(&["p_quiet"]);
        field.spawn(&mut rng, 1, "randy", &roster, &passengers);
        field.spawn(&mut rng, 1, "randy", &roster, &passengers);
        let taken = field.take(0).unwrap();
        assert_eq!(taken.id, 0);
        assert!(field.take(0).is_none());
        assert_eq!(field.len(), 1);
    }
}
