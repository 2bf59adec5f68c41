//! Transit engine results that are not itineraries.

use serde::{Deserialize, Serialize};

/// A node reachable within the accessibility map's constraints.
///
/// Departure queries report when the node is reached
/// (`arrival_time_seconds`); arrival queries report when one must leave
/// it (`departure_time_seconds`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibleNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time_seconds: Option<u32>,
    #[serde(default)]
    pub number_of_transfers: u32,
    pub total_travel_time_seconds: u32,
}

/// One line used by the alternatives of a summary query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub line_uuid: String,
    #[serde(default)]
    pub line_shortname: String,
    #[serde(default)]
    pub line_longname: String,
    #[serde(default)]
    pub agency_uuid: String,
    #[serde(default)]
    pub agency_acronym: String,
    #[serde(default)]
    pub agency_name: String,
    #[serde(default)]
    pub alternative_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    #[serde(default)]
    pub nb_routes: u32,
    #[serde(default)]
    pub lines: Vec<SummaryLine>,
}

/// Response of a summary query.
///
/// Apart from data errors and missing-data query errors, which the client
/// turns into [`RoutingError`](crate::error::RoutingError)s, the engine's
/// status is handed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryResponse {
    Success {
        #[serde(default)]
        query: serde_json::Value,
        result: SummaryResult,
    },
    NoRoutingFound {
        #[serde(default, skip_serializing_if = "Option::is_none")]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_round_trips_status() {
        let json = serde_json::json!({
            "status": "query_error",
            "errorCode": "EMPTY_SCENARIO"
        });
        let response: SummaryResponse = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(
            response,
            SummaryResponse::QueryError {
                error_code: "EMPTY_SCENARIO".into()
            }
        );
        assert_eq!(serde_json::to_value(&response).unwrap(), json);
    }

    #[test]
    fn node_omits_missing_times() {
        let node = AccessibleNode {
            id: "n1".into(),
            departure_time_seconds: None,
            arrival_time_seconds: Some(30_000),
            number_of_transfers: 1,
            total_travel_time_seconds: 1200,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["arrivalTimeSeconds"], 30_000);
        assert!(json.get("departureTimeSeconds").is_none());
    }
}
