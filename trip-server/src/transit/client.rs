//! Transit routing client.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::{AccessibilityMapQuery, HostPort, TransitPath, TransitRouteQuery};
use crate::error::RoutingError;

use super::transport::{ApiCall, TransitChannel, Transport};
use super::types::{AccessibleNode, SummaryResponse};
use super::{TransitRouter, v1, v2};

/// Default transit engine base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Error returned when parsing an unknown protocol name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transit protocol: {0} (expected v1 or v2)")]
pub struct InvalidProtocol(String);

/// Transit engine protocol generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Legacy query-string protocol
    V1,
    /// Structured protocol
    #[default]
    V2,
}

impl FromStr for Protocol {
    type Err = InvalidProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Protocol::V1),
            "v2" | "2" => Ok(Protocol::V2),
            _ => Err(InvalidProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::V1 => f.write_str("v1"),
            Protocol::V2 => f.write_str("v2"),
        }
    }
}

/// Configuration for the transit client.
#[derive(Debug, Clone)]
pub struct TransitClientConfig {
    /// Base URL for HTTP requests when no channel is injected
    pub base_url: String,
    /// Protocol generation spoken by the engine
    pub protocol: Protocol,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TransitClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TransitClientConfig {
    /// Create a new config for the structured protocol.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            protocol: Protocol::V2,
            timeout_secs: 60,
        }
    }

    /// Set the protocol generation.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the transit routing engine.
///
/// Every failure, including transport failures, is returned as a
/// [`RoutingError`].
#[derive(Clone)]
pub struct TransitRoutingClient {
    transport: Transport,
    protocol: Protocol,
}

impl TransitRoutingClient {
    /// Create a client. Requests go through `channel` when given, else HTTP.
    pub fn new(
        config: TransitClientConfig,
        channel: Option<Arc<dyn TransitChannel>>,
    ) -> Result<Self, reqwest::Error> {
        let transport = Transport::new(config.base_url, config.timeout_secs, channel)?;
        Ok(Self {
            transport,
            protocol: config.protocol,
        })
    }

    /// Protocol generation this client speaks.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Compute itineraries for a query.
    pub async fn route(
        &self,
        query: &TransitRouteQuery,
        host_port: Option<&HostPort>,
    ) -> Result<Vec<TransitPath>, RoutingError> {
        info!(
            protocol = %self.protocol,
            origin = ?query.origin,
            destination = ?query.destination,
            time = %query.time_of_trip,
            "transit route request"
        );

        let paths = match self.protocol {
            Protocol::V1 => {
                let payload = v1::payload(v1::route_query(query), host_port);
                let response = self.transport.call(ApiCall::RouteV1, payload).await?;
                v1::decode_route(response, query)?
            }
            Protocol::V2 => {
                let payload = v2::route_payload(query, host_port)?;
                let response = self.transport.call(ApiCall::Route, payload).await?;
                v2::decode_route(response)?
            }
        };

        debug!(paths = paths.len(), "transit route response");
        Ok(paths)
    }

    /// Nodes reachable from (or to) a place.
    pub async fn accessible_map(
        &self,
        query: &AccessibilityMapQuery,
        host_port: Option<&HostPort>,
    ) -> Result<Vec<AccessibleNode>, RoutingError> {
        info!(
            protocol = %self.protocol,
            location = %query.location,
            time_type = %query.time_of_trip_type,
            "accessibility map request"
        );

        let nodes = match self.protocol {
            Protocol::V1 => {
                let payload = v1::payload(v1::accessibility_query(query), host_port);
                let response = self.transport.call(ApiCall::RouteV1, payload).await?;
                v1::decode_accessibility_map(response)?
            }
            Protocol::V2 => {
                let payload = v2::accessibility_payload(query, host_port);
                let response = self
                    .transport
                    .call(ApiCall::AccessibilityMap, payload)
                    .await?;
                v2::decode_accessibility_map(response)?
            }
        };

        debug!(nodes = nodes.len(), "accessibility map response");
        Ok(nodes)
    }

    /// Lines used by the alternatives between two points.
    ///
    /// Only the structured protocol offers summaries.
    pub async fn summary(&self, query: &TransitRouteQuery) -> Result<SummaryResponse, RoutingError> {
        info!(origin = ?query.origin, destination = ?query.destination, "transit summary request");
        let payload = v2::summary_payload(query)?;
        let response = self.transport.call(ApiCall::Summary, payload).await?;
        v2::decode_summary(response)
    }
}

#[async_trait]
impl TransitRouter for TransitRoutingClient {
    async fn route(
        &self,
        query: &TransitRouteQuery,
        host_port: Option<&HostPort>,
    ) -> Result<Vec<TransitPath>, RoutingError> {
        TransitRoutingClient::route(self, query, host_port).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, Mode, SecondsSinceMidnight, TimeType, TripQuery};
    use crate::error::ErrorCode;
    use crate::transit::ChannelError;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Answers every request with the same envelope and keeps the requests.
    struct RecordingChannel {
        answer: Value,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingChannel {
        fn ok(result: Value) -> Arc<Self> {
            Arc::new(Self {
                answer: json!({"status": "ok", "result": result}),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TransitChannel for RecordingChannel {
        async fn send(&self, route: &str, payload: Value) -> Result<Value, ChannelError> {
            self.requests
                .lock()
                .unwrap()
                .push((route.to_string(), payload));
            Ok(self.answer.clone())
        }
    }

    fn query() -> TransitRouteQuery {
        TripQuery::new(
            Coordinates::new(-73.6, 45.5),
            Coordinates::new(-73.5, 45.6),
            vec![Mode::Transit],
            SecondsSinceMidnight::new(28_800),
        )
        .to_transit_query()
    }

    fn v2_success() -> Value {
        json!({
            "status": "success",
            "query": {
                "origin": [-73.6, 45.5],
                "destination": [-73.5, 45.6],
                "timeOfTrip": 28_800,
                "timeType": 0
            },
            "result": {
                "routes": [{
                    "departureTime": 28_900,
                    "arrivalTime": 30_000,
                    "totalTravelTime": 1_200,
                    "totalDistance": 3_000.0,
                    "steps": []
                }],
                "totalRoutesCalculated": 1
            }
        })
    }

    #[test]
    fn protocol_parsing() {
        assert_eq!("v1".parse::<Protocol>().unwrap(), Protocol::V1);
        assert_eq!("V2".parse::<Protocol>().unwrap(), Protocol::V2);
        assert!("v3".parse::<Protocol>().is_err());
        assert_eq!(Protocol::default(), Protocol::V2);
    }

    #[tokio::test]
    async fn v2_route_over_channel() {
        let channel = RecordingChannel::ok(v2_success());
        let client =
            TransitRoutingClient::new(TransitClientConfig::default(), Some(channel.clone()))
                .unwrap();

        let paths = client
            .route(&query(), Some(&HostPort::port(14_000)))
            .await
            .unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].time_of_trip_type, TimeType::Departure);

        let requests = channel.requests.lock().unwrap();
        assert_eq!(requests[0].0, "service.trRouting.route");
        assert_eq!(requests[0].1["hostPort"]["port"], 14_000);
        assert!(requests[0].1["parameters"].is_object());
    }

    #[tokio::test]
    async fn v1_route_over_channel() {
        let channel = RecordingChannel::ok(json!({
            "status": "no_routing_found",
            "reason": "NO_SERVICE_FROM_ORIGIN"
        }));
        let config = TransitClientConfig::default().with_protocol(Protocol::V1);
        let client = TransitRoutingClient::new(config, Some(channel.clone())).unwrap();
        assert_eq!(client.protocol(), Protocol::V1);

        let err = client.route(&query(), None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoServiceAtOrigin);

        let requests = channel.requests.lock().unwrap();
        assert_eq!(requests[0].0, "service.trRouting.routeV1");
        let encoded = requests[0].1["query"].as_str().unwrap();
        assert!(encoded.contains("departure_time_seconds=28800"));
        assert!(requests[0].1.get("hostPort").is_none());
    }

    #[tokio::test]
    async fn v2_route_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/trRouting/route"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "ok", "result": v2_success()})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client =
            TransitRoutingClient::new(TransitClientConfig::new(server.uri()), None).unwrap();
        let paths = client.route(&query(), None).await.unwrap();
        assert_eq!(paths[0].total_travel_time(), 1_200);
    }

    #[tokio::test]
    async fn accessibility_map_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/trRouting/accessibilityMap"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "result": {
                    "status": "success",
                    "query": {"place": [-73.6, 45.5], "timeOfTrip": 28_800, "timeType": 0},
                    "result": {"nodes": [{
                        "nodeUuid": "n1",
                        "nodeTime": 29_000,
                        "totalTravelTime": 200,
                        "numberOfTransfers": 0
                    }], "totalNodeCount": 1}
                }
            })))
            .mount(&server)
            .await;

        let client =
            TransitRoutingClient::new(TransitClientConfig::new(server.uri()), None).unwrap();
        let nodes = client
            .accessible_map(
                &AccessibilityMapQuery::new(
                    Coordinates::new(-73.6, 45.5),
                    SecondsSinceMidnight::new(28_800),
                ),
                None,
            )
            .await
            .unwrap();
        assert_eq!(nodes[0].id, "n1");
        assert_eq!(nodes[0].arrival_time_seconds, Some(29_000));
    }

    #[tokio::test]
    async fn summary_uses_summary_route() {
        let channel = RecordingChannel::ok(json!({
            "status": "success",
            "query": {},
            "result": {"nbRoutes": 2, "lines": [{"lineUuid": "l1", "alternativeCount": 2}]}
        }));
        let config = TransitClientConfig::default().with_protocol(Protocol::V1);
        let client = TransitRoutingClient::new(config, Some(channel.clone())).unwrap();

        let summary = client.summary(&query()).await.unwrap();
        match summary {
            SummaryResponse::Success { result, .. } => {
                assert_eq!(result.nb_routes, 2);
                assert_eq!(result.lines[0].line_uuid, "l1");
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(
            channel.requests.lock().unwrap()[0].0,
            "service.trRouting.summary"
        );
    }
}
