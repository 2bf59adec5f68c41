//! Trip queries and the engine requests derived from them.

use serde::{Deserialize, Serialize};

use super::{Coordinates, Mode, SecondsSinceMidnight, TimeType};

/// Default minimum waiting time at a stop, in seconds.
pub const DEFAULT_MIN_WAITING_TIME: u32 = 180;
/// Default maximum access and egress walking time, in seconds.
pub const DEFAULT_MAX_ACCESS_EGRESS_TIME: u32 = 900;
/// Default maximum transfer walking time, in seconds.
pub const DEFAULT_MAX_TRANSFER_TIME: u32 = 900;
/// Default maximum total travel time, in seconds.
pub const DEFAULT_MAX_TRAVEL_TIME: u32 = 10_800;

/// Access/egress bound used for the walk-only limit when none is given.
const WALK_ONLY_ACCESS_EGRESS_FALLBACK: u32 = 1200;

/// Host and port of a specific transit engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl HostPort {
    pub fn port(port: u16) -> Self {
        Self {
            host: None,
            port: Some(port),
        }
    }
}

/// One trip request across several modes.
///
/// Values are expected to be validated already: coordinates in range,
/// constraints non-negative, at least one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripQuery {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub modes: Vec<Mode>,
    pub time_of_trip: SecondsSinceMidnight,
    #[serde(default)]
    pub time_of_trip_type: TimeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_waiting_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_access_egress_travel_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_transfer_travel_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_travel_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_first_waiting_time: Option<u32>,
    #[serde(default)]
    pub with_alternatives: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoints: Vec<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_port: Option<u16>,
}

impl TripQuery {
    /// A departure query with no constraints.
    pub fn new(
        origin: Coordinates,
        destination: Coordinates,
        modes: Vec<Mode>,
        time_of_trip: SecondsSinceMidnight,
    ) -> Self {
        Self {
            origin,
            destination,
            modes,
            time_of_trip,
            time_of_trip_type: TimeType::Departure,
            min_waiting_time: None,
            max_access_egress_travel_time: None,
            max_transfer_travel_time: None,
            max_total_travel_time: None,
            max_first_waiting_time: None,
            with_alternatives: false,
            scenario_id: None,
            waypoints: Vec::new(),
            routing_port: None,
        }
    }

    pub fn with_time_type(mut self, time_type: TimeType) -> Self {
        self.time_of_trip_type = time_type;
        self
    }

    pub fn with_alternatives(mut self, alternatives: bool) -> Self {
        self.with_alternatives = alternatives;
        self
    }

    pub fn with_max_total_travel_time(mut self, seconds: u32) -> Self {
        self.max_total_travel_time = Some(seconds);
        self
    }

    pub fn with_max_access_egress_travel_time(mut self, seconds: u32) -> Self {
        self.max_access_egress_travel_time = Some(seconds);
        self
    }

    pub fn with_scenario(mut self, scenario_id: impl Into<String>) -> Self {
        self.scenario_id = Some(scenario_id.into());
        self
    }

    pub fn with_routing_port(mut self, port: u16) -> Self {
        self.routing_port = Some(port);
        self
    }

    /// Longest walk, in seconds, still offered as a transit alternative.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::domain::{Coordinates, Mode, SecondsSinceMidnight, TripQuery};
    ///
    /// let q = TripQuery::new(
    ///     Coordinates::new(0.0, 0.0),
    ///     Coordinates::new(0.01, 0.01),
    ///     vec![Mode::Transit, Mode::Walking],
    ///     SecondsSinceMidnight::new(28_800),
    /// )
    /// .with_max_total_travel_time(10_800)
    /// .with_max_access_egress_travel_time(900);
    /// assert_eq!(q.walk_only_max_duration(), 1_800);
    /// ```
    pub fn walk_only_max_duration(&self) -> u32 {
        let total = or_default(self.max_total_travel_time, DEFAULT_MAX_TRAVEL_TIME);
        let access_egress = or_default(
            self.max_access_egress_travel_time,
            WALK_ONLY_ACCESS_EGRESS_FALLBACK,
        );
        total.min(access_egress.saturating_mul(2))
    }

    /// The transit engine request for this trip, with defaults applied.
    pub fn to_transit_query(&self) -> TransitRouteQuery {
        let access_egress = or_default(
            self.max_access_egress_travel_time,
            DEFAULT_MAX_ACCESS_EGRESS_TIME,
        );
        TransitRouteQuery {
            origin: Some(self.origin),
            destination: Some(self.destination),
            od_trip_uuid: None,
            time_of_trip: self.time_of_trip,
            time_of_trip_type: self.time_of_trip_type,
            min_waiting_time: or_default(self.min_waiting_time, DEFAULT_MIN_WAITING_TIME),
            max_access_travel_time: access_egress,
            max_egress_travel_time: access_egress,
            max_transfer_travel_time: or_default(
                self.max_transfer_travel_time,
                DEFAULT_MAX_TRANSFER_TIME,
            ),
            max_travel_time: or_default(self.max_total_travel_time, DEFAULT_MAX_TRAVEL_TIME),
            max_first_waiting_time: self.max_first_waiting_time,
            alternatives: Some(self.with_alternatives),
            scenario_id: self.scenario_id.clone().unwrap_or_default(),
        }
    }

    /// Engine instance to use, if the query pins one.
    pub fn host_port(&self) -> Option<HostPort> {
        self.routing_port.map(HostPort::port)
    }
}

/// A fully specified transit route request.
///
/// Either both endpoints or an od-trip identifier locate the trip. When
/// both are present the endpoints win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitRouteQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub od_trip_uuid: Option<String>,
    pub time_of_trip: SecondsSinceMidnight,
    #[serde(default)]
    pub time_of_trip_type: TimeType,
    pub min_waiting_time: u32,
    pub max_access_travel_time: u32,
    pub max_egress_travel_time: u32,
    pub max_transfer_travel_time: u32,
    pub max_travel_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_first_waiting_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<bool>,
    #[serde(default)]
    pub scenario_id: String,
}

impl TransitRouteQuery {
    /// Both endpoints, when known.
    pub fn endpoints(&self) -> Option<(Coordinates, Coordinates)> {
        self.origin.zip(self.destination)
    }
}

/// Nodes already reached on foot, with the time it took to reach them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccessibleNodes {
    pub ids: Vec<String>,
    pub durations: Vec<f64>,
}

/// Request for every node reachable from (or to) a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityMapQuery {
    pub location: Coordinates,
    pub time_of_trip: SecondsSinceMidnight,
    #[serde(default)]
    pub time_of_trip_type: TimeType,
    #[serde(default = "default_min_waiting_time")]
    pub min_waiting_time: u32,
    #[serde(default = "default_access_egress_time")]
    pub max_access_travel_time: u32,
    #[serde(default = "default_access_egress_time")]
    pub max_egress_travel_time: u32,
    #[serde(default = "default_transfer_time")]
    pub max_transfer_travel_time: u32,
    #[serde(default = "default_travel_time")]
    pub max_travel_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_first_waiting_time: Option<u32>,
    #[serde(default)]
    pub scenario_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible_nodes: Option<AccessibleNodes>,
}

impl AccessibilityMapQuery {
    /// A departure query from `location` with default constraints.
    pub fn new(location: Coordinates, time_of_trip: SecondsSinceMidnight) -> Self {
        Self {
            location,
            time_of_trip,
            time_of_trip_type: TimeType::Departure,
            min_waiting_time: DEFAULT_MIN_WAITING_TIME,
            max_access_travel_time: DEFAULT_MAX_ACCESS_EGRESS_TIME,
            max_egress_travel_time: DEFAULT_MAX_ACCESS_EGRESS_TIME,
            max_transfer_travel_time: DEFAULT_MAX_TRANSFER_TIME,
            max_travel_time: DEFAULT_MAX_TRAVEL_TIME,
            max_first_waiting_time: None,
            scenario_id: String::new(),
            accessible_nodes: None,
        }
    }
}

fn default_min_waiting_time() -> u32 {
    DEFAULT_MIN_WAITING_TIME
}

fn default_access_egress_time() -> u32 {
    DEFAULT_MAX_ACCESS_EGRESS_TIME
}

fn default_transfer_time() -> u32 {
    DEFAULT_MAX_TRANSFER_TIME
}

fn default_travel_time() -> u32 {
    DEFAULT_MAX_TRAVEL_TIME
}

/// A constraint of zero counts as unset.
fn or_default(value: Option<u32>, default: u32) -> u32 {
    value.filter(|v| *v > 0).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> TripQuery {
        TripQuery::new(
            Coordinates::new(-73.6, 45.5),
            Coordinates::new(-73.5, 45.6),
            vec![Mode::Transit],
            SecondsSinceMidnight::new(8 * 3600),
        )
    }

    #[test]
    fn walk_only_limit_defaults() {
        assert_eq!(query().walk_only_max_duration(), 2400);
    }

    #[test]
    fn walk_only_limit_takes_the_smaller_bound() {
        let q = query()
            .with_max_total_travel_time(10_800)
            .with_max_access_egress_travel_time(900);
        assert_eq!(q.walk_only_max_duration(), 1800);

        let q = query()
            .with_max_total_travel_time(600)
            .with_max_access_egress_travel_time(900);
        assert_eq!(q.walk_only_max_duration(), 600);
    }

    #[test]
    fn transit_defaults() {
        let t = query().to_transit_query();
        assert_eq!(t.min_waiting_time, 180);
        assert_eq!(t.max_access_travel_time, 900);
        assert_eq!(t.max_egress_travel_time, 900);
        assert_eq!(t.max_transfer_travel_time, 900);
        assert_eq!(t.max_travel_time, 10_800);
        assert_eq!(t.alternatives, Some(false));
        assert_eq!(t.scenario_id, "");
        assert_eq!(t.max_first_waiting_time, None);
    }

    #[test]
    fn zero_limits_fall_back_to_defaults() {
        let mut q = query()
            .with_max_total_travel_time(0)
            .with_max_access_egress_travel_time(0);
        q.min_waiting_time = Some(0);
        q.max_transfer_travel_time = Some(0);
        assert_eq!(q.walk_only_max_duration(), 2400);

        let t = q.to_transit_query();
        assert_eq!(t.max_travel_time, 10_800);
        assert_eq!(t.max_access_travel_time, 900);
        assert_eq!(t.max_egress_travel_time, 900);
        assert_eq!(t.max_transfer_travel_time, 900);
        assert_eq!(t.min_waiting_time, 180);
    }

    #[test]
    fn transit_query_carries_constraints() {
        let mut q = query()
            .with_max_access_egress_travel_time(600)
            .with_alternatives(true)
            .with_scenario("scenario-1")
            .with_time_type(TimeType::Arrival);
        q.max_first_waiting_time = Some(1200);

        let t = q.to_transit_query();
        assert_eq!(t.max_access_travel_time, 600);
        assert_eq!(t.max_egress_travel_time, 600);
        assert_eq!(t.alternatives, Some(true));
        assert_eq!(t.scenario_id, "scenario-1");
        assert_eq!(t.time_of_trip_type, TimeType::Arrival);
        assert_eq!(t.max_first_waiting_time, Some(1200));
        assert_eq!(t.endpoints(), Some((q.origin, q.destination)));
    }

    #[test]
    fn deserializes_minimal_request() {
        let json = r#"{
            "origin": [-73.6, 45.5],
            "destination": [-73.5, 45.6],
            "modes": ["transit", "walking"],
            "timeOfTrip": 28800
        }"#;
        let q: TripQuery = serde_json::from_str(json).unwrap();
        assert_eq!(q.modes, vec![Mode::Transit, Mode::Walking]);
        assert_eq!(q.time_of_trip_type, TimeType::Departure);
        assert!(!q.with_alternatives);
        assert!(q.host_port().is_none());
    }

    #[test]
    fn time_of_trip_accepts_clock_time() {
        let json = r#"{
            "origin": [-73.6, 45.5],
            "destination": [-73.5, 45.6],
            "modes": ["transit"],
            "timeOfTrip": "08:00"
        }"#;
        let q: TripQuery = serde_json::from_str(json).unwrap();
        assert_eq!(q.time_of_trip.seconds(), 28_800);
    }

    #[test]
    fn routing_port_becomes_host_port() {
        let q = query().with_routing_port(14_000);
        assert_eq!(q.host_port(), Some(HostPort::port(14_000)));
    }
}
