//! Content tables: passengers, obstacles, decisions, events, quotes.

use serde::{Deserialize, Serialize};

use crate::challenges::{self, ChallengeTemplate};
use crate::driver::{self, Addon, Driver};

/// A rider the shift briefing can offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: String,
    /// Display name, e.g. "Quiet Professional".
    pub kind: String,
    pub desc: String,
    pub destination: String,
}

/// A problem rider. Cancelling the ride collects the fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub fee_cents: i64,
}

/// One answer to a mid-ride decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub label: String,
    /// Cash adjustment in cents; may be negative.
    pub reward_cents: i64,
    pub result_text: String,
    #[serde(default)]
    pub correct: bool,
}

/// A mid-ride prompt that freezes the shift clock until answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub options: Vec<DecisionOption>,
}

/// A random post-shift event rolled at settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftEvent {
    pub name: String,
    pub amount_cents: i64,
    pub desc: String,
}

/// Container for every content table the game draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameData {
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub addons: Vec<Addon>,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub events: Vec<ShiftEvent>,
    #[serde(default)]
    pub challenge_templates: Vec<ChallengeTemplate>,
    /// Ambient passenger chatter shown during play.
    #[serde(default)]
    pub quotes: Vec<String>,
}

impl GameData {
    /// Create empty data (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in content shipped with the crate.
    #[must_use]
    pub fn default_content() -> Self {
        Self {
            drivers: driver::default_roster(),
            addons: driver::default_addons(),
            passengers: default_passengers(),
            obstacles: default_obstacles(),
            decisions: default_decisions(),
            events: default_events(),
            challenge_templates: challenges::default_templates(),
            quotes: default_quotes(),
        }
    }

    /// Load content from a JSON string, overriding the built-ins.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a driver by id.
    #[must_use]
    pub fn driver(&self, id: &str) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == id)
    }

    /// Look up an addon by id.
    #[must_use]
    pub fn addon(&self, id: &str) -> Option<&Addon> {
        self.addons.iter().find(|a| a.id == id)
    }

    /// Look up a passenger by id.
    #[must_use]
    pub fn passenger(&self, id: &str) -> Option<&Passenger> {
        self.passengers.iter().find(|p| p.id == id)
    }
}

fn default_passengers() -> Vec<Passenger> {
    let make = |id: &str, kind: &str, desc: &str, destination: &str| Passenger {
        id: id.into(),
        kind: kind.into(),
        desc: desc.into(),
        destination: destination.into(),
    };
    vec![
        make("p_quiet", "Quiet Professional", "Just wants to get there.", "Downtown"),
        make("p_chatty", "Chatty Local", "Loves to talk.", "Market"),
        make("p_biz", "Business Man", "In a rush.", "Airport"),
        make("p_tattoo", "Rocker Girl", "Cool vibes.", "Concert Hall"),
        make("p_chill", "Chill Dude", "Relaxed.", "Suburbs"),
        make("p_old", "Sports Fan", "Going to the game.", "Stadium"),
    ]
}

fn default_obstacles() -> Vec<Obstacle> {
    let make = |id: &str, name: &str, desc: &str| Obstacle {
        id: id.into(),
        name: name.into(),
        desc: desc.into(),
        fee_cents: 150,
    };
    vec![
        make("o_sick", "Car Sick", "Passenger looks green."),
        make("o_text", "Texting", "Passenger wont look up."),
        make("o_late", "Running Late", "Hurry up!"),
    ]
}

fn default_decisions() -> Vec<Decision> {
    vec![
        Decision {
            id: "d_shortcut".into(),
            title: "Short Cut?".into(),
            prompt: "Take the alleyway to save time?".into(),
            options: vec![
                DecisionOption {
                    label: "Yes".into(),
                    reward_cents: 500,
                    result_text: "Fast!".into(),
                    correct: true,
                },
                DecisionOption {
                    label: "No".into(),
                    reward_cents: 0,
                    result_text: "Safe route.".into(),
                    correct: false,
                },
            ],
        },
        Decision {
            id: "d_music".into(),
            title: "Radio Station".into(),
            prompt: "Passenger wants Jazz. Change it?".into(),
            options: vec![
                DecisionOption {
                    label: "Jazz".into(),
                    reward_cents: 200,
                    result_text: "Smooth.".into(),
                    correct: true,
                },
                DecisionOption {
                    label: "Rock".into(),
                    reward_cents: -200,
                    result_text: "Too loud!".into(),
                    correct: false,
                },
            ],
        },
    ]
}

fn default_events() -> Vec<ShiftEvent> {
    let make = |name: &str, amount_cents: i64, desc: &str| ShiftEvent {
        name: name.into(),
        amount_cents,
        desc: desc.into(),
    };
    vec![
        make("Passenger Sick", -2_000, "Passenger got sick! Cleaning fee."),
        make("Spilled Coffee", -1_500, "Coffee spill everywhere. Interior detailing."),
        make("Late Passenger", 200, "Passenger late. Ride cancelled."),
        make("Group too big", 200, "5 people, 4 seats. Cancel fee collected."),
    ]
}

fn default_quotes() -> Vec<String> {
    [
        "I grew up in Boston",
        "I recommend ponce city market.",
        "the beach is about 5 hours away.",
        "It does get hot in Atlanta",
        "The blue ridge mountains are beautiful",
        "I'm going to a conference",
        "work meeting",
        "going to a Concert",
        "Can I borrow your charger?",
        "Where are you coming from?",
        "Is it ok if I eat in here?",
        "Turn the music up?",
        "It's cold in here.",
        "Nice car!",
        "What's your rating?",
        "I'm running late!",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_content_is_fully_populated() {
        let data = GameData::default_content();
        assert_eq!(data.drivers.len(), 6);
        assert_eq!(data.addons.len(), 7);
        assert_eq!(data.passengers.len(), 6);
        assert_eq!(data.obstacles.len(), 3);
        assert_eq!(data.decisions.len(), 2);
        assert_eq!(data.events.len(), 4);
        assert_eq!(data.challenge_templates.len(), 4);
        assert_eq!(data.quotes.len(), 16);
    }

    #[test]
    fn obstacles_all_collect_the_same_fee() {
        let data = GameData::default_content();
        assert!(data.obstacles.iter().all(|o| o.fee_cents == 150));
    }

    #[test]
    fn from_json_overrides_builtins() {
        let json = r#"{
            "passengers": [
                { "id": "p_test", "kind": "Test Rider", "desc": "A rider", "destination": "Nowhere" }
            ]
        }"#;
        let data = GameData::from_json(json).unwrap();
        assert_eq!(data.passengers.len(), 1);
        assert_eq!(data.passenger("p_test").unwrap().kind, "Test Rider");
        assert!(data.drivers.is_empty());
    }

    #[test]
    fn roundtrips_through_serde() {
        let data = GameData::default_content();
        let json = serde_json::to_string(&data).unwrap();
        let back = GameData::from_json(&json).unwrap();
        assert_eq!(back, data);
    }
}
