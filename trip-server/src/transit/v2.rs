//! Structured ("v2") transit protocol.
//!
//! Requests carry their parameters as JSON; responses are a tagged union on
//! `status`. Each route is returned without the query it answers, so the
//! query echo is copied onto every path.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{
    AccessibilityMapQuery, Coordinates, HostPort, SecondsSinceMidnight, TimeType, TransitPath,
    TransitRoute, TransitRouteQuery,
};
use crate::error::{ErrorCode, LocalizedMessage, RoutingError};

use super::types::{AccessibleNode, SummaryResponse};

const MISSING_DATA_PREFIX: &str = "MISSING_DATA_";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteParameters<'a> {
    origin_destination: [geojson::Feature; 2],
    scenario_id: &'a str,
    time_of_trip: SecondsSinceMidnight,
    time_of_trip_type: TimeType,
    min_waiting_time: u32,
    max_access_travel_time: u32,
    max_egress_travel_time: u32,
    max_transfer_travel_time: u32,
    max_travel_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_first_waiting_time: Option<u32>,
    alternatives: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessibilityParameters<'a> {
    location: geojson::Feature,
    scenario_id: &'a str,
    time_of_trip: SecondsSinceMidnight,
    time_of_trip_type: TimeType,
    min_waiting_time: u32,
    max_access_travel_time: u32,
    max_egress_travel_time: u32,
    max_transfer_travel_time: u32,
    max_travel_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_first_waiting_time: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteQueryEcho {
    origin: Coordinates,
    destination: Coordinates,
    time_of_trip: SecondsSinceMidnight,
    time_type: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteResult {
    routes: Vec<TransitRoute>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RouteResponse {
    Success {
        query: RouteQueryEcho,
        result: RouteResult,
    },
    NoRoutingFound {
        #[serde(default)]
        reason: Option<String>,
    },
    DataError {
        #[serde(rename = "errorCode")]
        error_code: String,
    },
    QueryError {
        #[serde(rename = "errorCode")]
        error_code: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessQueryEcho {
    time_type: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeResult {
    node_uuid: String,
    node_time: u32,
    total_travel_time: u32,
    #[serde(default)]
    number_of_transfers: u32,
}

#[derive(Debug, Deserialize)]
struct AccessResult {
    nodes: Vec<NodeResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AccessibilityMapResponse {
    Success {
        query: AccessQueryEcho,
        result: AccessResult,
    },
    NoRoutingFound {
        #[serde(default)]
        reason: Option<String>,
    },
    DataError {
        #[serde(rename = "errorCode")]
        error_code: String,
    },
    QueryError {
        #[serde(rename = "errorCode")]
        error_code: String,
    },
}

/// Request payload for a route query.
pub fn route_payload(
    query: &TransitRouteQuery,
    host_port: Option<&HostPort>,
) -> Result<Value, RoutingError> {
    let (origin, destination) = query.endpoints().ok_or_else(|| {
        RoutingError::new(
            ErrorCode::QueryError,
            "cannot calculate transit route with trRouting: origin and destination are required",
            LocalizedMessage::key("QueryError"),
        )
    })?;
    let parameters = RouteParameters {
        origin_destination: [origin.to_feature(), destination.to_feature()],
        scenario_id: &query.scenario_id,
        time_of_trip: query.time_of_trip,
        time_of_trip_type: query.time_of_trip_type,
        min_waiting_time: query.min_waiting_time,
        max_access_travel_time: query.max_access_travel_time,
        max_egress_travel_time: query.max_egress_travel_time,
        max_transfer_travel_time: query.max_transfer_travel_time,
        max_travel_time: query.max_travel_time,
        max_first_waiting_time: query.max_first_waiting_time,
        alternatives: query.alternatives == Some(true),
    };
    let mut payload = serde_json::json!({ "parameters": parameters });
    if let Some(host_port) = host_port {
        payload["hostPort"] = serde_json::to_value(host_port).unwrap_or(Value::Null);
    }
    Ok(payload)
}

/// Request payload for a summary query.
pub fn summary_payload(query: &TransitRouteQuery) -> Result<Value, RoutingError> {
    let payload = route_payload(query, None)?;
    Ok(payload["parameters"].clone())
}

/// Request payload for an accessibility map query.
pub fn accessibility_payload(query: &AccessibilityMapQuery, host_port: Option<&HostPort>) -> Value {
    let parameters = AccessibilityParameters {
        location: query.location.to_feature(),
        scenario_id: &query.scenario_id,
        time_of_trip: query.time_of_trip,
        time_of_trip_type: query.time_of_trip_type,
        min_waiting_time: query.min_waiting_time,
        max_access_travel_time: query.max_access_travel_time,
        max_egress_travel_time: query.max_egress_travel_time,
        max_transfer_travel_time: query.max_transfer_travel_time,
        max_travel_time: query.max_travel_time,
        max_first_waiting_time: query.max_first_waiting_time,
    };
    let mut payload = serde_json::json!({ "parameters": parameters });
    if let Some(host_port) = host_port {
        payload["hostPort"] = serde_json::to_value(host_port).unwrap_or(Value::Null);
    }
    payload
}

/// Error for a `no_routing_found` status.
pub(crate) fn no_routing_error(what: &str, reason: Option<&str>) -> RoutingError {
    let code = reason
        .map(ErrorCode::from_no_routing_reason)
        .unwrap_or(ErrorCode::NoRoutingFound);
    RoutingError::new(
        code,
        format!("cannot calculate {what} with trRouting: no_routing_found"),
        LocalizedMessage::key(reason.unwrap_or("NoResultFound")),
    )
}

fn data_error(what: &str, error_code: &str) -> RoutingError {
    let missing = error_code.starts_with(MISSING_DATA_PREFIX);
    RoutingError::new(
        if missing {
            ErrorCode::MissingData
        } else {
            ErrorCode::DataError
        },
        format!("cannot calculate {what} with trRouting because of an error on server: {error_code}"),
        LocalizedMessage::key(if missing { error_code } else { "DataError" }),
    )
}

fn query_error(what: &str, error_code: &str) -> RoutingError {
    RoutingError::new(
        ErrorCode::QueryError,
        format!("cannot calculate {what} with trRouting because of a query error: {error_code}"),
        LocalizedMessage::key(error_code),
    )
}

fn unknown_status(what: &str, response: &Value) -> RoutingError {
    warn!(status = ?response.get("status"), "unknown transit response status");
    RoutingError::other(
        format!("cannot calculate {what} with trRouting: unknown error"),
        None,
    )
}

/// Translate a route response into paths.
pub fn decode_route(response: Value) -> Result<Vec<TransitPath>, RoutingError> {
    const WHAT: &str = "transit route";
    let decoded: RouteResponse =
        serde_json::from_value(response.clone()).map_err(|_| unknown_status(WHAT, &response))?;

    match decoded {
        RouteResponse::Success { query, result } => {
            let time_of_trip_type = TimeType::from_wire(query.time_type);
            Ok(result
                .routes
                .into_iter()
                .map(|route| TransitPath {
                    origin: query.origin,
                    destination: query.destination,
                    time_of_trip: query.time_of_trip,
                    time_of_trip_type,
                    route,
                })
                .collect())
        }
        RouteResponse::NoRoutingFound { reason } => Err(no_routing_error(WHAT, reason.as_deref())),
        RouteResponse::DataError { error_code } => Err(data_error(WHAT, &error_code)),
        RouteResponse::QueryError { error_code } => Err(query_error(WHAT, &error_code)),
    }
}

/// Translate an accessibility map response into reachable nodes.
pub fn decode_accessibility_map(response: Value) -> Result<Vec<AccessibleNode>, RoutingError> {
    const WHAT: &str = "accessible nodes";
    let decoded: AccessibilityMapResponse =
        serde_json::from_value(response.clone()).map_err(|_| unknown_status(WHAT, &response))?;

    match decoded {
        AccessibilityMapResponse::Success { query, result } => {
            let time_type = TimeType::from_wire(query.time_type);
            Ok(result
                .nodes
                .into_iter()
                .map(|node| AccessibleNode {
                    id: node.node_uuid,
                    departure_time_seconds: (time_type == TimeType::Arrival)
                        .then_some(node.node_time),
                    arrival_time_seconds: (time_type == TimeType::Departure)
                        .then_some(node.node_time),
                    number_of_transfers: node.number_of_transfers,
                    total_travel_time_seconds: node.total_travel_time,
                })
                .collect())
        }
        AccessibilityMapResponse::NoRoutingFound { reason } => {
            Err(no_routing_error(WHAT, reason.as_deref()))
        }
        AccessibilityMapResponse::DataError { error_code } => Err(data_error(WHAT, &error_code)),
        AccessibilityMapResponse::QueryError { error_code } => Err(query_error(WHAT, &error_code)),
    }
}

/// Translate a summary response, keeping most statuses as they are.
pub fn decode_summary(response: Value) -> Result<SummaryResponse, RoutingError> {
    let decoded: SummaryResponse = serde_json::from_value(response.clone())
        .map_err(|_| unknown_status("transit summary", &response))?;

    match &decoded {
        SummaryResponse::DataError { .. } => Err(RoutingError::new(
            ErrorCode::DataError,
            "cannot calculate transit route with trRouting: data_error",
            LocalizedMessage::key("DataError"),
        )),
        SummaryResponse::QueryError { error_code } if error_code.starts_with(MISSING_DATA_PREFIX) => {
            Err(RoutingError::new(
                ErrorCode::MissingData,
                format!("cannot calculate transit route with trRouting: {error_code}"),
                LocalizedMessage::key(error_code),
            ))
        }
        _ => Ok(decoded),
    }
}
