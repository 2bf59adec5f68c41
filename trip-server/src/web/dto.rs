//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{AccessibilityMapQuery, HostPort};
use crate::error::ErrorPayload;
use crate::result::RoutingResult;

/// Response envelope: `{"ok": ...}` or `{"error": ...}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope<T> {
    Ok(T),
    Error(ErrorBody),
}

impl<T> Envelope<T> {
    pub fn message(message: impl Into<String>) -> Self {
        Envelope::Error(ErrorBody::Message(message.into()))
    }

    pub fn routing(error: &crate::error::RoutingError) -> Self {
        Envelope::Error(ErrorBody::Routing(error.to_payload()))
    }
}

/// What went wrong: a plain message, or a routing error with its code.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Routing(ErrorPayload),
    Message(String),
}

/// Request for the geometry of one alternative of an earlier result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathGeometryRequest {
    /// Result as returned by the route endpoint, for a single mode
    pub result: RoutingResult,

    /// Alternative to draw, counting the walk-only slot for transit
    pub index: usize,

    /// Attach timing and line identifiers to every feature
    #[serde(default)]
    pub complete_data: bool,
}

/// Accessibility map request, optionally aimed at a specific engine port.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityMapRequest {
    #[serde(flatten)]
    pub query: AccessibilityMapQuery,

    /// Transit engine port
    #[serde(default)]
    pub routing_port: Option<u16>,
}

impl AccessibilityMapRequest {
    pub fn host_port(&self) -> Option<HostPort> {
        self.routing_port.map(HostPort::port)
    }
}

/// Error response for malformed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
