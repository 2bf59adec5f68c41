//! Trip times.
//!
//! The transit engine works in seconds since midnight of the service day.
//! Values past 24:00 are legal: a trip leaving at 25:10 is ten minutes past
//! one in the morning of the following calendar day.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, de};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Seconds since midnight.
///
/// Serialized as a number. Deserializes from a number or from an "HH:MM"
/// string.
///
/// # Examples
///
/// ```
/// use trip_server::domain::SecondsSinceMidnight;
///
/// let t = SecondsSinceMidnight::parse_hhmm("08:30").unwrap();
/// assert_eq!(t.seconds(), 30_600);
/// assert_eq!(t.to_string(), "08:30:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SecondsSinceMidnight(u32);

impl SecondsSinceMidnight {
    pub const fn new(seconds: u32) -> Self {
        Self(seconds)
    }

    pub const fn seconds(&self) -> u32 {
        self.0
    }

    /// Parse a time of day in "HH:MM" format.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }
        let time = NaiveTime::parse_from_str(s, "%H:%M")
            .map_err(|_| TimeError::new("hour or minute out of range"))?;
        Ok(Self(time.num_seconds_from_midnight()))
    }
}

impl<'de> Deserialize<'de> for SecondsSinceMidnight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Seconds(u32),
            Clock(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Seconds(seconds) => Ok(Self(seconds)),
            Raw::Clock(clock) => Self::parse_hhmm(&clock).map_err(de::Error::custom),
        }
    }
}

impl fmt::Display for SecondsSinceMidnight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

impl From<u32> for SecondsSinceMidnight {
    fn from(seconds: u32) -> Self {
        Self(seconds)
    }
}

/// Whether the time of trip constrains departure or arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeType {
    #[default]
    Departure,
    Arrival,
}

impl TimeType {
    /// Numeric form echoed by the structured transit protocol. Anything but 1 is a departure.
    pub fn from_wire(value: u8) -> Self {
        if value == 1 {
            TimeType::Arrival
        } else {
            TimeType::Departure
        }
    }
}

impl fmt::Display for TimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeType::Departure => f.write_str("departure"),
            TimeType::Arrival => f.write_str("arrival"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        assert_eq!(SecondsSinceMidnight::parse_hhmm("00:00").unwrap().seconds(), 0);
        assert_eq!(
            SecondsSinceMidnight::parse_hhmm("23:59").unwrap().seconds(),
            86_340
        );
    }

    #[test]
    fn parse_invalid() {
        assert!(SecondsSinceMidnight::parse_hhmm("8:30").is_err());
        assert!(SecondsSinceMidnight::parse_hhmm("25:00").is_err());
        assert!(SecondsSinceMidnight::parse_hhmm("12:60").is_err());
        assert!(SecondsSinceMidnight::parse_hhmm("ab:cd").is_err());
    }

    #[test]
    fn display_past_midnight() {
        let t = SecondsSinceMidnight::new(25 * 3600 + 10 * 60 + 5);
        assert_eq!(t.to_string(), "25:10:05");
    }

    #[test]
    fn deserializes_seconds_or_clock() {
        let seconds: SecondsSinceMidnight = serde_json::from_str("30600").unwrap();
        assert_eq!(seconds.seconds(), 30_600);
        let clock: SecondsSinceMidnight = serde_json::from_str("\"08:30\"").unwrap();
        assert_eq!(clock, seconds);
        assert!(serde_json::from_str::<SecondsSinceMidnight>("\"8h30\"").is_err());
        assert_eq!(serde_json::to_string(&clock).unwrap(), "30600");
    }

    #[test]
    fn time_type_wire_values() {
        assert_eq!(TimeType::from_wire(1), TimeType::Arrival);
        assert_eq!(TimeType::from_wire(0), TimeType::Departure);
        assert_eq!(TimeType::from_wire(7), TimeType::Departure);
    }
}
