//! Transit itineraries.
//!
//! A [`TransitPath`] is one itinerary from the transit engine: the summary
//! figures the engine computes plus an ordered list of [`Step`]s. Every path
//! repeats the query it answers so that it can be rendered on its own.

use serde::{Deserialize, Serialize};

use super::{Coordinates, SecondsSinceMidnight, TimeType};

/// Role of a walking step within an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkingType {
    Access,
    Egress,
    Transfer,
}

impl WalkingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalkingType::Access => "access",
            WalkingType::Egress => "egress",
            WalkingType::Transfer => "transfer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkingStep {
    #[serde(rename = "type")]
    pub kind: WalkingType,
    pub travel_time: u32,
    pub distance: f64,
    pub departure_time: SecondsSinceMidnight,
    pub arrival_time: SecondsSinceMidnight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_board_at: Option<SecondsSinceMidnight>,
}

/// The line, trip and stop shared by boarding and unboarding steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopVisit {
    #[serde(default)]
    pub agency_acronym: String,
    #[serde(default)]
    pub agency_name: String,
    pub agency_uuid: String,
    #[serde(default)]
    pub line_shortname: String,
    #[serde(default)]
    pub line_longname: String,
    pub line_uuid: String,
    #[serde(default)]
    pub path_uuid: Option<String>,
    #[serde(default)]
    pub mode_name: String,
    pub mode: String,
    pub trip_uuid: String,
    pub leg_sequence_in_trip: u32,
    pub stop_sequence_in_trip: u32,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub node_code: String,
    pub node_uuid: String,
    pub node_coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardingStep {
    #[serde(flatten)]
    pub stop: StopVisit,
    pub departure_time: SecondsSinceMidnight,
    pub waiting_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnboardingStep {
    #[serde(flatten)]
    pub stop: StopVisit,
    pub arrival_time: SecondsSinceMidnight,
    pub in_vehicle_time: u32,
    pub in_vehicle_distance: f64,
}

/// One step of an itinerary, tagged by `action` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Walking(WalkingStep),
    Boarding(BoardingStep),
    Unboarding(UnboardingStep),
}

impl Step {
    pub fn as_walking(&self) -> Option<&WalkingStep> {
        match self {
            Step::Walking(w) => Some(w),
            _ => None,
        }
    }

    /// Node where the step happens; walking steps have none.
    pub fn node_coordinates(&self) -> Option<Coordinates> {
        match self {
            Step::Walking(_) => None,
            Step::Boarding(b) => Some(b.stop.node_coordinates),
            Step::Unboarding(u) => Some(u.stop.node_coordinates),
        }
    }
}

/// An itinerary as the engine computes it, without the query echo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitRoute {
    pub departure_time: SecondsSinceMidnight,
    pub arrival_time: SecondsSinceMidnight,
    pub total_travel_time: u32,
    pub total_distance: f64,
    #[serde(default)]
    pub total_in_vehicle_time: u32,
    #[serde(default)]
    pub total_in_vehicle_distance: f64,
    #[serde(default)]
    pub total_non_transit_travel_time: u32,
    #[serde(default)]
    pub total_non_transit_distance: f64,
    #[serde(default)]
    pub number_of_boardings: u32,
    #[serde(default)]
    pub number_of_transfers: u32,
    #[serde(default)]
    pub transfer_walking_time: u32,
    #[serde(default)]
    pub transfer_walking_distance: f64,
    #[serde(default)]
    pub access_travel_time: u32,
    #[serde(default)]
    pub access_distance: f64,
    #[serde(default)]
    pub egress_travel_time: u32,
    #[serde(default)]
    pub egress_distance: f64,
    #[serde(default)]
    pub transfer_waiting_time: u32,
    #[serde(default)]
    pub first_waiting_time: u32,
    #[serde(default)]
    pub total_waiting_time: u32,
    pub steps: Vec<Step>,
}

/// An itinerary together with the query it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitPath {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub time_of_trip: SecondsSinceMidnight,
    pub time_of_trip_type: TimeType,
    #[serde(flatten)]
    pub route: TransitRoute,
}

impl TransitPath {
    pub fn total_travel_time(&self) -> u32 {
        self.route.total_travel_time
    }

    pub fn steps(&self) -> &[Step] {
        &self.route.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_decode_by_action() {
        let json = serde_json::json!([
            {
                "action": "walking",
                "type": "access",
                "travelTime": 300,
                "distance": 350,
                "departureTime": 28800,
                "arrivalTime": 29100,
                "readyToBoardAt": 29280
            },
            {
                "action": "boarding",
                "agencyAcronym": "STM",
                "agencyName": "Société de transport",
                "agencyUuid": "agency",
                "lineShortname": "55",
                "lineLongname": "Saint-Laurent",
                "lineUuid": "line",
                "pathUuid": "path",
                "modeName": "Bus",
                "mode": "bus",
                "tripUuid": "trip",
                "legSequenceInTrip": 1,
                "stopSequenceInTrip": 4,
                "nodeName": "Stop A",
                "nodeCode": "A",
                "nodeUuid": "node-a",
                "nodeCoordinates": [-73.6, 45.5],
                "departureTime": 29400,
                "waitingTime": 300
            },
            {
                "action": "unboarding",
                "agencyUuid": "agency",
                "lineUuid": "line",
                "pathUuid": "path",
                "mode": "bus",
                "tripUuid": "trip",
                "legSequenceInTrip": 1,
                "stopSequenceInTrip": 9,
                "nodeUuid": "node-b",
                "nodeCoordinates": [-73.55, 45.55],
                "arrivalTime": 30000,
                "inVehicleTime": 600,
                "inVehicleDistance": 4200.5
            }
        ]);

        let steps: Vec<Step> = serde_json::from_value(json).unwrap();
        assert_eq!(steps.len(), 3);
        let walk = steps[0].as_walking().unwrap();
        assert_eq!(walk.kind, WalkingType::Access);
        assert_eq!(walk.ready_to_board_at, Some(SecondsSinceMidnight::new(29_280)));
        match &steps[1] {
            Step::Boarding(b) => {
                assert_eq!(b.stop.path_uuid.as_deref(), Some("path"));
                assert_eq!(b.waiting_time, 300);
            }
            other => panic!("expected boarding, got {other:?}"),
        }
        assert_eq!(
            steps[2].node_coordinates(),
            Some(Coordinates::new(-73.55, 45.55))
        );
    }

    #[test]
    fn step_serializes_with_action_tag() {
        let step = Step::Walking(WalkingStep {
            kind: WalkingType::Egress,
            travel_time: 120,
            distance: 100.0,
            departure_time: SecondsSinceMidnight::new(100),
            arrival_time: SecondsSinceMidnight::new(220),
            ready_to_board_at: None,
        });
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["action"], "walking");
        assert_eq!(json["type"], "egress");
        assert!(json.get("readyToBoardAt").is_none());
    }
}
