//! Transportation modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown routing mode: {0}")]
pub struct InvalidMode(String);

/// A transportation mode that can be requested for a trip.
///
/// `Transit` is answered by the transit engine; every other mode is a
/// point-to-point route from a generic routing engine.
///
/// # Examples
///
/// ```
/// use trip_server::domain::Mode;
///
/// let mode: Mode = "walking".parse().unwrap();
/// assert_eq!(mode, Mode::Walking);
/// assert!(!mode.is_transit());
/// assert!("teleport".parse::<Mode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Transit,
    Walking,
    Cycling,
    Driving,
    BusSuburb,
    BusUrban,
    BusCongestion,
    Rail,
    Tram,
    TramTrain,
    Metro,
    Monorail,
    CableCar,
}

impl Mode {
    /// Every mode, in declaration order.
    pub const ALL: [Mode; 13] = [
        Mode::Transit,
        Mode::Walking,
        Mode::Cycling,
        Mode::Driving,
        Mode::BusSuburb,
        Mode::BusUrban,
        Mode::BusCongestion,
        Mode::Rail,
        Mode::Tram,
        Mode::TramTrain,
        Mode::Metro,
        Mode::Monorail,
        Mode::CableCar,
    ];

    /// The mode's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Transit => "transit",
            Mode::Walking => "walking",
            Mode::Cycling => "cycling",
            Mode::Driving => "driving",
            Mode::BusSuburb => "bus_suburb",
            Mode::BusUrban => "bus_urban",
            Mode::BusCongestion => "bus_congestion",
            Mode::Rail => "rail",
            Mode::Tram => "tram",
            Mode::TramTrain => "tram_train",
            Mode::Metro => "metro",
            Mode::Monorail => "monorail",
            Mode::CableCar => "cable_car",
        }
    }

    /// Returns true for the transit engine's mode.
    pub fn is_transit(&self) -> bool {
        matches!(self, Mode::Transit)
    }
}

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| InvalidMode(s.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn serde_uses_wire_name() {
        for mode in Mode::ALL {
            let json = serde_json::to_value(mode).unwrap();
            assert_eq!(json, serde_json::Value::String(mode.as_str().to_string()));
        }
    }

    #[test]
    fn rejects_unknown() {
        let err = "hovercraft".parse::<Mode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown routing mode: hovercraft");
    }
}
