//! Legacy query-string ("v1") transit protocol.
//!
//! Requests are a `&`-joined query string wrapped in `{"query": ...}`.
//! Responses are not tagged consistently: a success may hold alternatives,
//! a single path, or accessibility nodes, and node responses may carry no
//! status at all.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::{
    AccessibilityMapQuery, BoardingStep, Coordinates, HostPort, SecondsSinceMidnight, Step,
    StopVisit, TimeType, TransitPath, TransitRoute, TransitRouteQuery, UnboardingStep,
    WalkingStep, WalkingType,
};
use crate::error::{ErrorCode, LocalizedMessage, RoutingError};

use super::types::AccessibleNode;
use super::v2::no_routing_error;

const MISSING_DATA_PREFIX: &str = "MISSING_DATA_";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalkV1 {
    #[serde(rename = "type")]
    kind: WalkingType,
    travel_time_seconds: u32,
    distance_meters: f64,
    departure_time_seconds: SecondsSinceMidnight,
    arrival_time_seconds: SecondsSinceMidnight,
    #[serde(default)]
    ready_to_board_at_seconds: Option<SecondsSinceMidnight>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardV1 {
    #[serde(flatten)]
    stop: StopVisit,
    departure_time_seconds: SecondsSinceMidnight,
    #[serde(default)]
    waiting_time_seconds: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnboardV1 {
    #[serde(flatten)]
    stop: StopVisit,
    arrival_time_seconds: SecondsSinceMidnight,
    #[serde(default)]
    in_vehicle_time_seconds: u32,
    #[serde(default)]
    in_vehicle_distance_meters: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum StepV1 {
    Walking(WalkV1),
    Board(BoardV1),
    Unboard(UnboardV1),
}

impl From<StepV1> for Step {
    fn from(step: StepV1) -> Self {
        match step {
            StepV1::Walking(w) => Step::Walking(WalkingStep {
                kind: w.kind,
                travel_time: w.travel_time_seconds,
                distance: w.distance_meters,
                departure_time: w.departure_time_seconds,
                arrival_time: w.arrival_time_seconds,
                ready_to_board_at: w.ready_to_board_at_seconds,
            }),
            StepV1::Board(b) => Step::Boarding(BoardingStep {
                stop: b.stop,
                departure_time: b.departure_time_seconds,
                waiting_time: b.waiting_time_seconds,
            }),
            StepV1::Unboard(u) => Step::Unboarding(UnboardingStep {
                stop: u.stop,
                arrival_time: u.arrival_time_seconds,
                in_vehicle_time: u.in_vehicle_time_seconds,
                in_vehicle_distance: u.in_vehicle_distance_meters,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathV1 {
    origin: Coordinates,
    destination: Coordinates,
    departure_time_seconds: SecondsSinceMidnight,
    arrival_time_seconds: SecondsSinceMidnight,
    total_travel_time_seconds: u32,
    #[serde(default)]
    total_distance_meters: f64,
    #[serde(default)]
    total_in_vehicle_time_seconds: u32,
    #[serde(default)]
    total_in_vehicle_distance_meters: f64,
    #[serde(default)]
    total_non_transit_travel_time_seconds: u32,
    #[serde(default)]
    total_non_transit_distance_meters: f64,
    #[serde(default)]
    number_of_boardings: u32,
    #[serde(default)]
    number_of_transfers: u32,
    #[serde(default)]
    transfer_walking_time_seconds: u32,
    #[serde(default)]
    transfer_walking_distance_meters: f64,
    #[serde(default)]
    access_travel_time_seconds: u32,
    #[serde(default)]
    access_distance_meters: f64,
    #[serde(default)]
    egress_travel_time_seconds: u32,
    #[serde(default)]
    egress_distance_meters: f64,
    #[serde(default)]
    transfer_waiting_time_seconds: u32,
    #[serde(default)]
    first_waiting_time_seconds: u32,
    #[serde(default)]
    total_waiting_time_seconds: u32,
    #[serde(default)]
    steps: Vec<StepV1>,
}

impl PathV1 {
    fn into_path(self, time_of_trip: SecondsSinceMidnight, time_type: TimeType) -> TransitPath {
        TransitPath {
            origin: self.origin,
            destination: self.destination,
            time_of_trip,
            time_of_trip_type: time_type,
            route: TransitRoute {
                departure_time: self.departure_time_seconds,
                arrival_time: self.arrival_time_seconds,
                total_travel_time: self.total_travel_time_seconds,
                total_distance: self.total_distance_meters,
                total_in_vehicle_time: self.total_in_vehicle_time_seconds,
                total_in_vehicle_distance: self.total_in_vehicle_distance_meters,
                total_non_transit_travel_time: self.total_non_transit_travel_time_seconds,
                total_non_transit_distance: self.total_non_transit_distance_meters,
                number_of_boardings: self.number_of_boardings,
                number_of_transfers: self.number_of_transfers,
                transfer_walking_time: self.transfer_walking_time_seconds,
                transfer_walking_distance: self.transfer_walking_distance_meters,
                access_travel_time: self.access_travel_time_seconds,
                access_distance: self.access_distance_meters,
                egress_travel_time: self.egress_travel_time_seconds,
                egress_distance: self.egress_distance_meters,
                transfer_waiting_time: self.transfer_waiting_time_seconds,
                first_waiting_time: self.first_waiting_time_seconds,
                total_waiting_time: self.total_waiting_time_seconds,
                steps: self.steps.into_iter().map(Step::from).collect(),
            },
        }
    }
}

/// Constraint fields shared by both query kinds.
fn constraints(
    min_waiting: u32,
    max_access: u32,
    max_egress: u32,
    max_transfer: u32,
    max_travel: u32,
    scenario_id: &str,
) -> Vec<String> {
    vec![
        format!("min_waiting_time_seconds={min_waiting}"),
        format!("max_access_travel_time_seconds={max_access}"),
        format!("max_egress_travel_time_seconds={max_egress}"),
        format!("max_transfer_travel_time_seconds={max_transfer}"),
        format!("max_travel_time_seconds={max_travel}"),
        format!("scenario_uuid={scenario_id}"),
    ]
}

/// Encode a route query.
///
/// Endpoints take precedence over an od-trip identifier. Exactly one of
/// the departure and arrival time fields is emitted.
pub fn route_query(query: &TransitRouteQuery) -> String {
    let mut parts = constraints(
        query.min_waiting_time,
        query.max_access_travel_time,
        query.max_egress_travel_time,
        query.max_transfer_travel_time,
        query.max_travel_time,
        &query.scenario_id,
    );
    if let Some((origin, destination)) = query.endpoints() {
        parts.push(format!("origin={}", origin.lat_lon()));
        parts.push(format!("destination={}", destination.lat_lon()));
    } else if let Some(od_trip) = &query.od_trip_uuid {
        parts.push(format!("od_trip_uuid={od_trip}"));
    }
    if let Some(alternatives) = query.alternatives {
        parts.push(format!("alternatives={}", if alternatives { 1 } else { 0 }));
    }
    parts.push(match query.time_of_trip_type {
        TimeType::Departure => format!("departure_time_seconds={}", query.time_of_trip.seconds()),
        TimeType::Arrival => format!("arrival_time_seconds={}", query.time_of_trip.seconds()),
    });
    if let Some(wait) = query.max_first_waiting_time.filter(|w| *w > 0) {
        parts.push(format!("max_first_waiting_time_seconds={wait}"));
    }
    parts.join("&")
}

/// Encode an accessibility map query.
pub fn accessibility_query(query: &AccessibilityMapQuery) -> String {
    let mut parts = constraints(
        query.min_waiting_time,
        query.max_access_travel_time,
        query.max_egress_travel_time,
        query.max_transfer_travel_time,
        query.max_travel_time,
        &query.scenario_id,
    );
    parts.push("all_nodes=1".to_string());

    let nodes = query
        .accessible_nodes
        .as_ref()
        .filter(|n| n.ids.len() == n.durations.len());
    let node_lists = nodes.map(|n| {
        let durations = n
            .durations
            .iter()
            .map(|d| d.floor().to_string())
            .collect::<Vec<_>>()
            .join(",");
        (n.ids.join(","), durations)
    });

    let time = query.time_of_trip.seconds();
    match query.time_of_trip_type {
        TimeType::Departure => {
            parts.push(format!("origin={}", query.location.lat_lon()));
            parts.push(format!("departure_time_seconds={time}"));
            if let Some((ids, durations)) = node_lists {
                parts.push(format!("access_node_uuids={ids}"));
                parts.push(format!("access_node_travel_times={durations}"));
            }
        }
        TimeType::Arrival => {
            parts.push(format!("destination={}", query.location.lat_lon()));
            parts.push(format!("arrival_time_seconds={time}"));
            if let Some((ids, durations)) = node_lists {
                parts.push(format!("egress_node_uuids={ids}"));
                parts.push(format!("egress_node_travel_times={durations}"));
            }
        }
    }
    if let Some(wait) = query.max_first_waiting_time.filter(|w| *w > 0) {
        parts.push(format!("max_first_waiting_time_seconds={wait}"));
    }
    parts.join("&")
}

/// Request payload wrapping an encoded query.
pub fn payload(query: String, host_port: Option<&HostPort>) -> Value {
    let mut payload = serde_json::json!({ "query": query });
    if let Some(host_port) = host_port {
        payload["hostPort"] = serde_json::to_value(host_port).unwrap_or(Value::Null);
    }
    payload
}

/// Map an erroneous status to its error; `Ok` for success or no status.
fn check_status(response: &Value) -> Result<(), RoutingError> {
    const WHAT: &str = "transit route";
    let status = response.get("status").and_then(Value::as_str);
    let error_code = || {
        response
            .get("errorCode")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    match status {
        None | Some("success") => Ok(()),
        Some("no_routing_found") => Err(no_routing_error(
            WHAT,
            response.get("reason").and_then(Value::as_str),
        )),
        Some("data_error") => Err(RoutingError::new(
            ErrorCode::DataError,
            "cannot calculate transit route with trRouting: data_error",
            LocalizedMessage::key("DataError"),
        )),
        Some("query_error") => {
            let code = error_code();
            Err(RoutingError::new(
                ErrorCode::QueryError,
                format!("cannot calculate transit route with trRouting: {code}"),
                LocalizedMessage::key(if code.is_empty() { "QueryError" } else { code.as_str() }),
            ))
        }
        Some("error") => {
            let error = response.get("error").cloned().unwrap_or(Value::Null);
            let detail = match &error {
                Value::String(s) => s.clone(),
                Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            match error.get("code").and_then(Value::as_str) {
                Some("ECONNREFUSED") => Err(RoutingError::new(
                    ErrorCode::ServerNotRunning,
                    format!("cannot calculate transit route with trRouting: {detail}"),
                    LocalizedMessage::key("TrRoutingServerNotRunning"),
                )),
                Some(code) if code.starts_with(MISSING_DATA_PREFIX) => Err(RoutingError::new(
                    ErrorCode::MissingData,
                    format!("cannot calculate transit route with trRouting: {code}"),
                    LocalizedMessage::key(code),
                )),
                _ => Err(RoutingError::other(
                    "cannot calculate transit route with trRouting: error",
                    Some(&detail),
                )),
            }
        }
        Some(other) => {
            warn!(status = other, "unknown status returned from trRouting");
            let detail = response
                .get("error")
                .map(|e| match e {
                    Value::String(s) => s.clone(),
                    e => e.to_string(),
                })
                .unwrap_or_else(|| "-".to_string());
            Err(RoutingError::other(
                format!("cannot calculate transit route with trRouting: {other}"),
                Some(&detail),
            ))
        }
    }
}

fn malformed(e: serde_json::Error) -> RoutingError {
    RoutingError::other(
        "cannot calculate transit route with trRouting: malformed response",
        Some(&e.to_string()),
    )
}

/// Translate a route response into paths.
///
/// The legacy protocol does not echo the query, so time of trip and its
/// type come from the request; endpoints come from each path.
pub fn decode_route(
    response: Value,
    query: &TransitRouteQuery,
) -> Result<Vec<TransitPath>, RoutingError> {
    check_status(&response)?;

    let paths: Vec<PathV1> = match response.get("alternatives") {
        Some(alternatives) => {
            serde_json::from_value(alternatives.clone()).map_err(malformed)?
        }
        None => vec![serde_json::from_value(response).map_err(malformed)?],
    };

    Ok(paths
        .into_iter()
        .map(|p| p.into_path(query.time_of_trip, query.time_of_trip_type))
        .collect())
}

/// Translate an accessibility map response into reachable nodes.
pub fn decode_accessibility_map(response: Value) -> Result<Vec<AccessibleNode>, RoutingError> {
    check_status(&response)?;
    match response.get("nodes") {
        Some(nodes) => serde_json::from_value(nodes.clone()).map_err(malformed),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessibleNodes, Mode, TripQuery};
    use serde_json::json;

    fn transit_query() -> TransitRouteQuery {
        TripQuery::new(
            Coordinates::new(-73.6, 45.5),
            Coordinates::new(-73.5, 45.6),
            vec![Mode::Transit],
            SecondsSinceMidnight::new(28_800),
        )
        .with_scenario("sc")
        .to_transit_query()
    }

    #[test]
    fn route_query_field_order() {
        assert_eq!(
            route_query(&transit_query()),
            "min_waiting_time_seconds=180&max_access_travel_time_seconds=900\
             &max_egress_travel_time_seconds=900&max_transfer_travel_time_seconds=900\
             &max_travel_time_seconds=10800&scenario_uuid=sc\
             &origin=45.5,-73.6&destination=45.6,-73.5&alternatives=0\
             &departure_time_seconds=28800"
        );
    }

    #[test]
    fn exactly_one_time_field() {
        let mut query = transit_query();
        let encoded = route_query(&query);
        assert!(encoded.contains("departure_time_seconds=28800"));
        assert!(!encoded.contains("arrival_time_seconds"));

        query.time_of_trip_type = TimeType::Arrival;
        let encoded = route_query(&query);
        assert!(encoded.contains("arrival_time_seconds=28800"));
        assert!(!encoded.contains("departure_time_seconds"));
    }

    #[test]
    fn points_win_over_od_trip() {
        let mut query = transit_query();
        query.od_trip_uuid = Some("trip-1".into());
        assert!(!route_query(&query).contains("od_trip_uuid"));

        query.origin = None;
        let encoded = route_query(&query);
        assert!(encoded.contains("od_trip_uuid=trip-1"));
        assert!(!encoded.contains("origin="));
    }

    #[test]
    fn optional_route_fields() {
        let mut query = transit_query();
        query.alternatives = None;
        query.max_first_waiting_time = Some(0);
        let encoded = route_query(&query);
        assert!(!encoded.contains("alternatives"));
        assert!(!encoded.contains("max_first_waiting_time_seconds"));

        query.alternatives = Some(true);
        query.max_first_waiting_time = Some(600);
        let encoded = route_query(&query);
        assert!(encoded.contains("&alternatives=1&"));
        assert!(encoded.ends_with("&max_first_waiting_time_seconds=600"));
    }

    #[test]
    fn accessibility_query_by_time_type() {
        let mut query =
            AccessibilityMapQuery::new(Coordinates::new(-73.6, 45.5), SecondsSinceMidnight::new(100));
        query.accessible_nodes = Some(AccessibleNodes {
            ids: vec!["a".into(), "b".into()],
            durations: vec![60.7, 120.2],
        });

        let encoded = accessibility_query(&query);
        assert!(encoded.contains("&all_nodes=1&origin=45.5,-73.6&departure_time_seconds=100"));
        assert!(encoded.contains("access_node_uuids=a,b"));
        assert!(encoded.contains("access_node_travel_times=60,120"));

        query.time_of_trip_type = TimeType::Arrival;
        let encoded = accessibility_query(&query);
        assert!(encoded.contains("destination=45.5,-73.6&arrival_time_seconds=100"));
        assert!(encoded.contains("egress_node_uuids=a,b"));
        assert!(!encoded.contains("departure_time_seconds"));
    }

    #[test]
    fn mismatched_node_lists_are_dropped() {
        let mut query =
            AccessibilityMapQuery::new(Coordinates::new(0.0, 0.0), SecondsSinceMidnight::new(0));
        query.accessible_nodes = Some(AccessibleNodes {
            ids: vec!["a".into()],
            durations: vec![],
        });
        assert!(!accessibility_query(&query).contains("node_uuids"));
    }

    fn v1_path(total: u32) -> Value {
        json!({
            "status": "success",
            "origin": [-73.6, 45.5],
            "destination": [-73.5, 45.6],
            "departureTimeSeconds": 28_900,
            "arrivalTimeSeconds": 28_900 + total,
            "totalTravelTimeSeconds": total,
            "totalDistanceMeters": 4_000,
            "numberOfTransfers": 0,
            "steps": [
                {
                    "action": "walking",
                    "type": "access",
                    "travelTimeSeconds": 120,
                    "distanceMeters": 100,
                    "departureTimeSeconds": 28_800,
                    "arrivalTimeSeconds": 28_920,
                    "readyToBoardAtSeconds": 29_100
                },
                {
                    "action": "board",
                    "agencyUuid": "ag",
                    "lineUuid": "ln",
                    "pathUuid": "pth",
                    "mode": "bus",
                    "tripUuid": "tr",
                    "legSequenceInTrip": 1,
                    "stopSequenceInTrip": 2,
                    "nodeUuid": "n1",
                    "nodeCoordinates": [-73.59, 45.51],
                    "departureTimeSeconds": 29_100,
                    "waitingTimeSeconds": 180
                },
                {
                    "action": "unboard",
                    "agencyUuid": "ag",
                    "lineUuid": "ln",
                    "pathUuid": "pth",
                    "mode": "bus",
                    "tripUuid": "tr",
                    "legSequenceInTrip": 1,
                    "stopSequenceInTrip": 8,
                    "nodeUuid": "n2",
                    "nodeCoordinates": [-73.51, 45.59],
                    "arrivalTimeSeconds": 29_700,
                    "inVehicleTimeSeconds": 600,
                    "inVehicleDistanceMeters": 3_800
                }
            ]
        })
    }

    #[test]
    fn decodes_single_path() {
        let paths = decode_route(v1_path(1_500), &transit_query()).unwrap();
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert_eq!(path.total_travel_time(), 1_500);
        assert_eq!(path.time_of_trip, SecondsSinceMidnight::new(28_800));
        assert_eq!(path.origin, Coordinates::new(-73.6, 45.5));
        assert_eq!(path.steps().len(), 3);
        assert!(matches!(path.steps()[1], Step::Boarding(_)));
        match &path.steps()[2] {
            Step::Unboarding(u) => assert_eq!(u.in_vehicle_distance, 3_800.0),
            other => panic!("expected unboarding, got {other:?}"),
        }
    }

    #[test]
    fn decodes_alternatives() {
        let response = json!({
            "status": "success",
            "alternatives": [v1_path(1_500), v1_path(1_900)]
        });
        let paths = decode_route(response, &transit_query()).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].total_travel_time(), 1_900);
    }

    #[test]
    fn status_translation() {
        let query = transit_query();
        let code = |response: Value| decode_route(response, &query).unwrap_err().code();

        assert_eq!(
            code(json!({"status": "no_routing_found", "reason": "NO_ACCESS_AT_ORIGIN"})),
            ErrorCode::NoAccessAtOrigin
        );
        assert_eq!(code(json!({"status": "no_routing_found"})), ErrorCode::NoRoutingFound);
        assert_eq!(code(json!({"status": "data_error", "errorCode": "X"})), ErrorCode::DataError);
        assert_eq!(code(json!({"status": "query_error", "errorCode": "Y"})), ErrorCode::QueryError);
        assert_eq!(
            code(json!({"status": "error", "error": {"code": "ECONNREFUSED"}})),
            ErrorCode::ServerNotRunning
        );
        assert_eq!(
            code(json!({"status": "error", "error": {"code": "MISSING_DATA_NODES"}})),
            ErrorCode::MissingData
        );
        assert_eq!(code(json!({"status": "weird"})), ErrorCode::OtherError);
    }

    #[test]
    fn unknown_status_carries_error_param() {
        let err = decode_route(json!({"status": "failed", "error": "disk full"}), &transit_query())
            .unwrap_err();
        match err.localized() {
            LocalizedMessage::WithParams { params, .. } => assert_eq!(params["error"], "disk full"),
            other => panic!("expected params, got {other:?}"),
        }
    }

    #[test]
    fn nodes_without_status() {
        let nodes = decode_accessibility_map(json!({
            "nodes": [
                {"id": "n1", "arrivalTimeSeconds": 29_000, "numberOfTransfers": 0, "totalTravelTimeSeconds": 200}
            ]
        }))
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].arrival_time_seconds, Some(29_000));

        assert!(decode_accessibility_map(json!({"status": "success"})).unwrap().is_empty());
    }
}
