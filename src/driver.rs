//! Driver roster, purchasable addons, and the effective-driver overlay.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Quote pools a driver speaks from. The core picks strings; it attaches
/// no game meaning to the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuotePools {
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default)]
    pub tap: Vec<String>,
    #[serde(default)]
    pub miss: Vec<String>,
}

impl QuotePools {
    fn new(select: &[&str], tap: &[&str], miss: &[&str]) -> Self {
        let own = |slice: &[&str]| slice.iter().map(|s| (*s).to_string()).collect();
        Self {
            select: own(select),
            tap: own(tap),
            miss: own(miss),
        }
    }

    /// Uniform pick from one pool. `None` when the pool is empty.
    pub fn pick<'a>(pool: &'a [String], rng: &mut impl Rng) -> Option<&'a str> {
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.random_range(0..pool.len())].as_str())
    }
}

/// A playable driver. Price is a real-money unlock, not game cash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub car: String,
    pub desc: String,
    /// Unlock price in cents; zero means free.
    pub price_cents: i64,
    pub voice_id: String,
    #[serde(default)]
    pub ev: bool,
    /// Extra tip percentage this driver earns on settlement.
    #[serde(default)]
    pub tip_bonus: f64,
    /// Extra fare percentage this driver earns on settlement.
    #[serde(default)]
    pub fare_bonus: f64,
    /// Correct taps cost 1 energy instead of 2.
    #[serde(default)]
    pub energy_saver: bool,
    #[serde(default)]
    pub quotes: QuotePools,
}

/// A purchasable addon. Vehicle addons overlay the driver's car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub price_cents: i64,
    /// Additive tip percentage applied at settlement.
    #[serde(default)]
    pub tip_bonus: f64,
    /// Additive fare percentage applied at settlement.
    #[serde(default)]
    pub fare_bonus: f64,
    /// Replaces the driver's car when owned.
    #[serde(default)]
    pub vehicle: bool,
    /// Vehicle addons only: car runs on charge instead of gas.
    #[serde(default)]
    pub electric: bool,
}

/// The driver as actually fielded: base driver plus the best owned
/// vehicle overlay. Derived fresh per read, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveDriver {
    pub id: String,
    pub name: String,
    pub car: String,
    pub voice_id: String,
    pub ev: bool,
    pub tip_bonus: f64,
    pub fare_bonus: f64,
    pub energy_saver: bool,
}

/// Overlay the highest-priced owned vehicle addon onto the base driver.
/// Owning the electric upgrade makes any driver an EV.
#[must_use]
pub fn effective_driver(base: &Driver, addons: &[Addon], owned_addon_ids: &[String]) -> EffectiveDriver {
    let mut best_vehicle: Option<&Addon> = None;
    let mut electric_owned = false;
    for addon in addons {
        if !owned_addon_ids.iter().any(|id| id == &addon.id) {
            continue;
        }
        if addon.vehicle {
            if addon.electric {
                electric_owned = true;
            }
            if best_vehicle.is_none_or(|best| addon.price_cents > best.price_cents) {
                best_vehicle = Some(addon);
            }
        }
    }

    let car = best_vehicle.map_or_else(|| base.car.clone(), |addon| addon.name.clone());
    EffectiveDriver {
        id: base.id.clone(),
        name: base.name.clone(),
        car,
        voice_id: base.voice_id.clone(),
        ev: base.ev || electric_owned,
        tip_bonus: base.tip_bonus,
        fare_bonus: base.fare_bonus,
        energy_saver: base.energy_saver,
    }
}

/// Built-in roster of six drivers.
#[must_use]
pub fn default_roster() -> Vec<Driver> {
    vec![
        Driver {
            id: "randy".into(),
            name: "Rideshare Randy".into(),
            car: "2017 Corolla".into(),
            desc: "Grumpy driver from Boston".into(),
            price_cents: 0,
            voice_id: "Fenrir".into(),
            ev: false,
            tip_bonus: 0.0,
            fare_bonus: 0.0,
            energy_saver: false,
            quotes: QuotePools::new(
                &["Let's go.", "Whatever.", "Coffee time."],
                &["Gotcha.", "Don't eat that.", "5 stars.", "Hurry."],
                &["Hey!", "Nope.", "Watch it!"],
            ),
        },
        Driver {
            id: "skyler".into(),
            name: "Skyler".into(),
            car: "Tesla Model 3".into(),
            desc: "Tech geek".into(),
            price_cents: 99,
            voice_id: "Zephyr".into(),
            ev: true,
            tip_bonus: 0.0,
            fare_bonus: 0.0,
            energy_saver: false,
            quotes: QuotePools::new(
                &["Auto-pilot on.", "Charging..."],
                &["Silent.", "Clean energy.", "Future."],
                &["Access denied.", "404 Error."],
            ),
        },
        Driver {
            id: "samalie".into(),
            name: "Samalie".into(),
            car: "Honda Civic".into(),
            desc: "Friendly driver".into(),
            price_cents: 99,
            voice_id: "Kore".into(),
            ev: false,
            tip_bonus: 0.0,
            fare_bonus: 0.10,
            energy_saver: false,
            quotes: QuotePools::new(
                &["Hola!", "Ready?"],
                &["Gracias!", "Nice.", "Safe trip."],
                &["Ay no!", "Whoops!"],
            ),
        },
        Driver {
            id: "jason".into(),
            name: "Jason".into(),
            car: "Ford Explorer".into(),
            desc: "Funny Driver".into(),
            price_cents: 99,
            voice_id: "Puck".into(),
            ev: false,
            tip_bonus: 0.0,
            fare_bonus: 0.0,
            energy_saver: true,
            quotes: QuotePools::new(
                &["Let's roll!", "Buckle up!"],
                &["Honk honk!", "Easy!", "Sport!"],
                &["Not me!", "Wrong car!"],
            ),
        },
        Driver {
            id: "tran".into(),
            name: "Tran".into(),
            car: "Toyota 4Runner".into(),
            desc: "Chatty driver".into(),
            price_cents: 199,
            voice_id: "Puck".into(),
            ev: false,
            tip_bonus: 0.0,
            fare_bonus: 0.0,
            energy_saver: false,
            quotes: QuotePools::new(
                &["My friend!", "Let's go!"],
                &["Yes!", "Money!", "Story time!"],
                &["No no!", "Wrong one!"],
            ),
        },
        Driver {
            id: "sharonda".into(),
            name: "Sharonda".into(),
            car: "Tesla Model X".into(),
            desc: "Sassy driver".into(),
            price_cents: 199,
            voice_id: "Kore".into(),
            ev: true,
            tip_bonus: 0.20,
            fare_bonus: 0.0,
            energy_saver: false,
            quotes: QuotePools::new(
                &["Mmhmm.", "Let's move."],
                &["I see you.", "Classy.", "Work it."],
                &["Excuse me?", "Back up."],
            ),
        },
    ]
}

/// Built-in addon catalog.
#[must_use]
pub fn default_addons() -> Vec<Addon> {
    vec![
        Addon {
            id: "dashcam".into(),
            name: "Premium Dashcam".into(),
            desc: "Records everything. Reduces fines.".into(),
            price_cents: 999,
            tip_bonus: 0.05,
            fare_bonus: 0.0,
            vehicle: false,
            electric: false,
        },
        Addon {
            id: "scent".into(),
            name: "New Car Scent".into(),
            desc: "Smells like success.".into(),
            price_cents: 499,
            tip_bonus: 0.10,
            fare_bonus: 0.0,
            vehicle: false,
            electric: false,
        },
        Addon {
            id: "aux".into(),
            name: "Phone Charger".into(),
            desc: "Universal compatibility. 5-star essential.".into(),
            price_cents: 1499,
            tip_bonus: 0.15,
            fare_bonus: 0.0,
            vehicle: false,
            electric: false,
        },
        Addon {
            id: "water".into(),
            name: "Sparkling Water".into(),
            desc: "For fancy riders.".into(),
            price_cents: 1999,
            tip_bonus: 0.20,
            fare_bonus: 0.05,
            vehicle: false,
            electric: false,
        },
        Addon {
            id: "car_electric".into(),
            name: "Electric EV Upgrade".into(),
            desc: "Silent motor and zero emissions.".into(),
            price_cents: 999,
            tip_bonus: 0.25,
            fare_bonus: 0.20,
            vehicle: true,
            electric: true,
        },
        Addon {
            id: "car_yukon".into(),
            name: "GMC Yukon XL".into(),
            desc: "Massive SUV for big groups.".into(),
            price_cents: 1499,
            tip_bonus: 0.35,
            fare_bonus: 0.20,
            vehicle: true,
            electric: false,
        },
        Addon {
            id: "car_luxury".into(),
            name: "Luxury Black Sedan".into(),
            desc: "Premium service for high-end clients.".into(),
            price_cents: 1999,
            tip_bonus: 0.40,
            fare_bonus: 0.20,
            vehicle: true,
            electric: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn no_vehicle_addons_leaves_driver_untouched() {
        let roster = default_roster();
        let addons = default_addons();
        let randy = &roster[0];
        let eff = effective_driver(randy, &addons, &owned(&["dashcam", "water"]));
        assert_eq!(eff.car, "2017 Corolla");
        assert!(!eff.ev);
    }

    #[test]
    fn highest_priced_vehicle_wins() {
        let roster = default_roster();
        let addons = default_addons();
        let randy = &roster[0];
        let eff = effective_driver(randy, &addons, &owned(&["car_electric", "car_luxury"]));
        assert_eq!(eff.car, "Luxury Black Sedan");
        // Electric upgrade still converts the car even when outranked.
        assert!(eff.ev);
    }

    #[test]
    fn electric_upgrade_makes_gas_driver_ev() {
        let roster = default_roster();
        let addons = default_addons();
        let randy = &roster[0];
        let eff = effective_driver(randy, &addons, &owned(&["car_electric"]));
        assert_eq!(eff.car, "Electric EV Upgrade");
        assert!(eff.ev);
    }

    #[test]
    fn ev_base_driver_never_downgrades() {
        let roster = default_roster();
        let addons = default_addons();
        let skyler = roster.iter().find(|d| d.id == "skyler").unwrap();
        let eff = effective_driver(skyler, &addons, &owned(&["car_yukon"]));
        assert_eq!(eff.car, "GMC Yukon XL");
        assert!(eff.ev);
    }

    #[test]
    fn derivation_is_idempotent() {
        let roster = default_roster();
        let addons = default_addons();
        let ids = owned(&["car_yukon", "scent"]);
        let first = effective_driver(&roster[0], &addons, &ids);
        let second = effective_driver(&roster[0], &addons, &ids);
        assert_eq!(first, second);
    }

    #[test]
    fn roster_carries_expected_perks() {
        let roster = default_roster();
        let samalie = roster.iter().find(|d| d.id == "samalie").unwrap();
        assert!((samalie.fare_bonus - 0.10).abs() < f64::EPSILON);
        let sharonda = roster.iter().find(|d| d.id == "sharonda").unwrap();
        assert!((sharonda.tip_bonus - 0.20).abs() < f64::EPSILON);
        assert!(sharonda.ev);
        let jason = roster.iter().find(|d| d.id == "jason").unwrap();
        assert!(jason.energy_saver);
    }
}
