//! Pickup environments rotated between shifts.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Backdrop a shift takes place in. Purely cosmetic for scoring, but
/// challenge conditions may pin themselves to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    Grocery,
    City,
    Park,
    Boardwalk,
    Apartment,
    Airport,
    Downtown,
    Hotel,
    Restaurant,
    Suburbs,
    GasStation,
    Skyline,
    Highway,
    Stadium,
}

impl Environment {
    pub const ALL: [Self; 14] = [
        Self::Grocery,
        Self::City,
        Self::Park,
        Self::Boardwalk,
        Self::Apartment,
        Self::Airport,
        Self::Downtown,
        Self::Hotel,
        Self::Restaurant,
        Self::Suburbs,
        Self::GasStation,
        Self::Skyline,
        Self::Highway,
        Self::Stadium,
    ];

    /// Display name shown on receipts and share text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grocery => "Grocery Store Parking Lot",
            Self::City => "Busy City Street",
            Self::Park => "City Park",
            Self::Boardwalk => "Ocean Boardwalk",
            Self::Apartment => "Luxury Apartment Complex",
            Self::Airport => "Airport Departures Terminal",
            Self::Downtown => "Downtown Business District",
            Self::Hotel => "Fancy Hotel Valet",
            Self::Restaurant => "Restaurant Row at Night",
            Self::Suburbs => "Quiet Suburban Street",
            Self::GasStation => "Neon Gas Station at Night",
            Self::Skyline => "Atlanta Skyline at Dusk",
            Self::Highway => "Overpass Above a Busy Highway",
            Self::Stadium => "Sports Stadium Entrance",
        }
    }

    /// Uniform pick for the next shift.
    pub fn pick(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
