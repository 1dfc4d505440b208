//! Shift settlement: fare, tips, random events, and the net payout.
//!
//! All money is integer cents. Percentage math runs in `f64` and is
//! rounded half-away-from-zero exactly once, at the cents boundary of
//! each line item, so receipts always sum to the stored totals.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    FARE_DOLLARS_PER_POINT, NET_FLOOR_CENTS, SHIFT_EVENT_CHANCE, TIP_BASE_MIN, TIP_BASE_SPAN,
    TIP_CAP_CENTS,
};
use crate::data::ShiftEvent;
use crate::driver::{Addon, EffectiveDriver};
use crate::state::ResourcesConsumed;

/// Round dollars to cents, half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Terminal payload of one shift session, whatever path ended it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftOutcome {
    pub score: i32,
    /// Fines accrued minus decision bonuses; may be negative.
    pub cash_penalty_cents: i64,
    pub consumed: ResourcesConsumed,
    /// Present only when the ride was cancelled at briefing.
    pub cancellation_fee_cents: Option<i64>,
    pub passenger_id: Option<String>,
}

impl ShiftOutcome {
    #[must_use]
    pub const fn cancelled(&self) -> bool {
        self.cancellation_fee_cents.is_some()
    }
}

/// Itemized result of settling a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub fare_cents: i64,
    pub tips_cents: i64,
    pub event: Option<ShiftEvent>,
    pub fee_cents: i64,
    pub penalty_cents: i64,
    /// Final wallet delta, floored at the net floor.
    pub net_cents: i64,
}

/// Settle a finished shift.
///
/// Fare scales with score, the driver's own fare bonus applies to the
/// base fare, and addon fare bonuses multiply the combined figure. Tips
/// only land on a positive score and are capped. A random event is
/// rolled only for rides that were not cancelled.
pub fn settle(
    outcome: &ShiftOutcome,
    driver: &EffectiveDriver,
    addons: &[Addon],
    owned_addon_ids: &[String],
    events: &[ShiftEvent],
    rng: &mut impl Rng,
) -> Settlement {
    let mut addon_tip_bonus = 0.0;
    let mut addon_fare_bonus = 0.0;
    for addon in addons {
        if owned_addon_ids.iter().any(|id| id == &addon.id) {
            addon_tip_bonus += addon.tip_bonus;
            addon_fare_bonus += addon.fare_bonus;
        }
    }

    let base_fare = (f64::from(outcome.score) * FARE_DOLLARS_PER_POINT).max(0.0);
    let driver_fare_bonus = base_fare * driver.fare_bonus;
    let total_fare = (base_fare + driver_fare_bonus) * (1.0 + addon_fare_bonus);
    let fare_cents = dollars_to_cents(total_fare);

    let tips_cents = if outcome.score > 0 {
        let base_tip_percent = TIP_BASE_MIN + rng.random::<f64>() * TIP_BASE_SPAN;
        let total_tip_percent = base_tip_percent + addon_tip_bonus + driver.tip_bonus;
        dollars_to_cents(total_fare * total_tip_percent).min(TIP_CAP_CENTS)
    } else {
        0
    };

    let event = if outcome.cancelled() {
        None
    } else if events.is_empty() {
        None
    } else if rng.random::<f64>() < SHIFT_EVENT_CHANCE {
        Some(events[rng.random_range(0..events.len())].clone())
    } else {
        None
    };

    let event_cents = event.as_ref().map_or(0, |e| e.amount_cents);
    let fee_cents = outcome.cancellation_fee_cents.unwrap_or(0);
    let net_cents = (fare_cents + tips_cents + event_cents + fee_cents
        - outcome.cash_penalty_cents)
        .max(NET_FLOOR_CENTS);

    Settlement {
        fare_cents,
        tips_cents,
        event,
        fee_cents,
        penalty_cents: outcome.cash_penalty_cents,
        net_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameData;
    use crate::driver::{default_addons, default_roster, effective_driver};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn played(score: i32, penalty_cents: i64) -> ShiftOutcome {
        ShiftOutcome {
            score,
            cash_penalty_cents: penalty_cents,
            consumed: ResourcesConsumed {
                gas: 10,
                energy: 10,
                food: 5,
                sleep: 5,
            },
            cancellation_fee_cents: None,
            passenger_id: Some("p_quiet".into()),
        }
    }

    fn randy() -> EffectiveDriver {
        let roster = default_roster();
        effective_driver(&roster[0], &default_addons(), &[])
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(dollars_to_cents(0.005), 1);
        assert_eq!(dollars_to_cents(-0.005), -1);
        assert_eq!(dollars_to_cents(1.984_999_9), 198);
    }

    #[test]
    fn fare_scales_with_score_and_never_goes_negative() {
        let addons = default_addons();
        let events = GameData::default_content().events;
        let mut rng = SmallRng::seed_from_u64(1);
        let settlement = settle(&played(200, 0), &randy(), &addons, &[], &events, &mut rng);
        assert_eq!(settlement.fare_cents, 400);

        let mut rng = SmallRng::seed_from_u64(1);
        let settlement = settle(&played(-300, 0), &randy(), &addons, &[], &events, &mut rng);
        assert_eq!(settlement.fare_cents, 0);
        assert_eq!(settlement.tips_cents, 0);
    }

    #[test]
    fn samalie_earns_ten_percent_more_fare() {
        let roster = default_roster();
        let addons = default_addons();
        let samalie = effective_driver(
            roster.iter().find(|d| d.id == "samalie").unwrap(),
            &addons,
            &[],
        );
        let mut rng = SmallRng::seed_from_u64(2);
        let settlement = settle(&played(200, 0), &samalie, &addons, &[], &[], &mut rng);
        assert_eq!(settlement.fare_cents, 440);
    }

    #[test]
    fn sharonda_stacks_her_tip_multiplier_onto_every_draw() {
        let roster = default_roster();
        let addons = default_addons();
        let owned = vec![String::from("water")];
        let sharonda = effective_driver(
            roster.iter().find(|d| d.id == "sharonda").unwrap(),
            &addons,
            &owned,
        );
        for seed in 0..64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let settlement = settle(&played(500, 0), &sharonda, &addons, &owned, &[], &mut rng);
            // 10.00 * (1 + 0.05)
            assert_eq!(settlement.fare_cents, 1_050);
            // Tip percent floor: 0.10 base + 0.20 addon + 0.20 driver.
            assert!(settlement.tips_cents >= 525);
            assert!(settlement.tips_cents <= TIP_CAP_CENTS);
        }
    }

    #[test]
    fn addon_fare_bonuses_stack_multiplicatively_on_fare() {
        let addons = default_addons();
        let owned = vec![String::from("water"), String::from("car_luxury")];
        let mut rng = SmallRng::seed_from_u64(3);
        let driver = effective_driver(&default_roster()[0], &addons, &owned);
        let settlement = settle(&played(200, 0), &driver, &addons, &owned, &[], &mut rng);
        // 4.00 * (1 + 0.05 + 0.20)
        assert_eq!(settlement.fare_cents, 500);
    }

    #[test]
    fn tips_are_capped_at_ten_dollars() {
        let addons = default_addons();
        let owned: Vec<String> = addons.iter().map(|a| a.id.clone()).collect();
        let driver = effective_driver(&default_roster()[0], &addons, &owned);
        for seed in 0..32 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let settlement = settle(&played(5_000, 0), &driver, &addons, &owned, &[], &mut rng);
            assert!(settlement.tips_cents <= TIP_CAP_CENTS);
            assert!(settlement.tips_cents > 0);
        }
    }

    #[test]
    fn zero_score_earns_no_tips() {
        let addons = default_addons();
        let mut rng = SmallRng::seed_from_u64(4);
        let settlement = settle(&played(0, 0), &randy(), &addons, &[], &[], &mut rng);
        assert_eq!(settlement.tips_cents, 0);
    }

    #[test]
    fn net_is_floored_at_negative_twenty_dollars() {
        let addons = default_addons();
        let events = GameData::default_content().events;
        for seed in 0..32 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let settlement = settle(
                &played(10, 500_000),
                &randy(),
                &addons,
                &[],
                &events,
                &mut rng,
            );
            assert_eq!(settlement.net_cents, NET_FLOOR_CENTS);
        }
    }

    #[test]
    fn cancelled_shift_never_rolls_an_event() {
        let addons = default_addons();
        let events = GameData::default_content().events;
        let outcome = ShiftOutcome {
            score: 0,
            cash_penalty_cents: 0,
            consumed: ResourcesConsumed {
                gas: 1,
                energy: 1,
                ..ResourcesConsumed::default()
            },
            cancellation_fee_cents: Some(150),
            passenger_id: None,
        };
        for seed in 0..64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let settlement = settle(&outcome, &randy(), &addons, &[], &events, &mut rng);
            assert!(settlement.event.is_none());
            assert_eq!(settlement.net_cents, 150);
        }
    }

    #[test]
    fn event_fires_for_some_seed_and_lands_in_net() {
        let addons = default_addons();
        let events = GameData::default_content().events;
        let fired = (0..256).find_map(|seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let settlement = settle(&played(100, 0), &randy(), &addons, &[], &events, &mut rng);
            settlement.event.clone().map(|event| (settlement, event))
        });
        let (settlement, event) = fired.expect("some seed rolls an event");
        assert_eq!(
            settlement.net_cents,
            settlement.fare_cents + settlement.tips_cents + event.amount_cents
        );
    }
}
