//! Routing error taxonomy.
//!
//! Every failure that reaches the presentation layer is a [`RoutingError`]:
//! a stable machine code, a message for developers, and a message key the
//! client can localize. The wire shape is [`ErrorPayload`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by all transit routing message keys.
const MESSAGE_PREFIX: &str = "transit:transitRouting:errors:";

/// Machine codes for routing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "TRROUTING_NO_ROUTING_NO_ACCESS_AT_ORIGIN")]
    NoAccessAtOrigin,
    // The misspelled "NOT_ROUTING" codes are the values clients already match on.
    #[serde(rename = "TRROUTING_NOT_ROUTING_NO_ACCESS_AT_DESTINATION")]
    NoAccessAtDestination,
    #[serde(rename = "TRROUTING_NOT_ROUTING_NO_ACCESS_AT_ORIGIN_AND_DESTINATION")]
    NoAccessAtOriginAndDestination,
    #[serde(rename = "TRROUTING_NO_ROUTING_NO_SERVICE_FROM_ORIGIN")]
    NoServiceAtOrigin,
    #[serde(rename = "TRROUTING_NO_ROUTING_NO_SERVICE_TO_DESTINATION")]
    NoServiceAtDestination,
    #[serde(rename = "TRROUTING_NO_ROUTING_NO_ACCESS_AT_PLACE")]
    NoAccessAtPlace,
    #[serde(rename = "TRROUTING_NO_ROUTING_NO_SERVICE_AT_PLACE")]
    NoServiceAtPlace,
    #[serde(rename = "TRROUTING_NO_ROUTING_FOUND")]
    NoRoutingFound,
    #[serde(rename = "TRROUTING_MISSING_DATA")]
    MissingData,
    #[serde(rename = "TRROUTING_INVALID_DATA")]
    DataError,
    #[serde(rename = "TRROUTING_QUERY_ERROR")]
    QueryError,
    #[serde(rename = "TRROUTING_SERVER_NOT_RUNNING")]
    ServerNotRunning,
    #[serde(rename = "TRROUTING_ERROR_UNKNOWN")]
    OtherError,
    /// A single mode failed for a reason outside the transit taxonomy.
    #[serde(rename = "TRCalculatorError")]
    CalculatorError,
}

impl ErrorCode {
    /// The wire value of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoAccessAtOrigin => "TRROUTING_NO_ROUTING_NO_ACCESS_AT_ORIGIN",
            ErrorCode::NoAccessAtDestination => "TRROUTING_NOT_ROUTING_NO_ACCESS_AT_DESTINATION",
            ErrorCode::NoAccessAtOriginAndDestination => {
                "TRROUTING_NOT_ROUTING_NO_ACCESS_AT_ORIGIN_AND_DESTINATION"
            }
            ErrorCode::NoServiceAtOrigin => "TRROUTING_NO_ROUTING_NO_SERVICE_FROM_ORIGIN",
            ErrorCode::NoServiceAtDestination => "TRROUTING_NO_ROUTING_NO_SERVICE_TO_DESTINATION",
            ErrorCode::NoAccessAtPlace => "TRROUTING_NO_ROUTING_NO_ACCESS_AT_PLACE",
            ErrorCode::NoServiceAtPlace => "TRROUTING_NO_ROUTING_NO_SERVICE_AT_PLACE",
            ErrorCode::NoRoutingFound => "TRROUTING_NO_ROUTING_FOUND",
            ErrorCode::MissingData => "TRROUTING_MISSING_DATA",
            ErrorCode::DataError => "TRROUTING_INVALID_DATA",
            ErrorCode::QueryError => "TRROUTING_QUERY_ERROR",
            ErrorCode::ServerNotRunning => "TRROUTING_SERVER_NOT_RUNNING",
            ErrorCode::OtherError => "TRROUTING_ERROR_UNKNOWN",
            ErrorCode::CalculatorError => "TRCalculatorError",
        }
    }

    /// Map a "no routing found" reason reported by the transit engine.
    ///
    /// Unknown reasons fall back to [`ErrorCode::NoRoutingFound`].
    pub fn from_no_routing_reason(reason: &str) -> Self {
        match reason {
            "NO_ACCESS_AT_ORIGIN" => ErrorCode::NoAccessAtOrigin,
            "NO_ACCESS_AT_DESTINATION" => ErrorCode::NoAccessAtDestination,
            "NO_SERVICE_FROM_ORIGIN" => ErrorCode::NoServiceAtOrigin,
            "NO_SERVICE_TO_DESTINATION" => ErrorCode::NoServiceAtDestination,
            "NO_ACCESS_AT_ORIGIN_AND_DESTINATION" => ErrorCode::NoAccessAtOriginAndDestination,
            "NO_ACCESS_AT_PLACE" => ErrorCode::NoAccessAtPlace,
            "NO_SERVICE_AT_PLACE" => ErrorCode::NoServiceAtPlace,
            _ => ErrorCode::NoRoutingFound,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message the client translates: a bare key, or a key with parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedMessage {
    Key(String),
    WithParams {
        text: String,
        params: BTreeMap<String, String>,
    },
}

impl LocalizedMessage {
    /// A key under the transit routing error namespace.
    pub fn key(name: impl AsRef<str>) -> Self {
        LocalizedMessage::Key(format!("{MESSAGE_PREFIX}{}", name.as_ref()))
    }

    /// A namespaced key with a single parameter.
    pub fn with_param(name: impl AsRef<str>, param: &str, value: impl Into<String>) -> Self {
        let mut params = BTreeMap::new();
        params.insert(param.to_string(), value.into());
        LocalizedMessage::WithParams {
            text: format!("{MESSAGE_PREFIX}{}", name.as_ref()),
            params,
        }
    }

    /// The translation key, without parameters.
    pub fn text(&self) -> &str {
        match self {
            LocalizedMessage::Key(key) => key,
            LocalizedMessage::WithParams { text, .. } => text,
        }
    }
}

/// A routing failure with its machine code and localizable message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RoutingError {
    code: ErrorCode,
    message: String,
    localized: LocalizedMessage,
}

impl RoutingError {
    pub fn new(code: ErrorCode, message: impl Into<String>, localized: LocalizedMessage) -> Self {
        Self {
            code,
            message: message.into(),
            localized,
        }
    }

    /// The transit engine could not be reached at all.
    pub fn server_not_running(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ServerNotRunning,
            format!("cannot handle call to trRouting: {detail}"),
            LocalizedMessage::key("TrRoutingServerNotRunning"),
        )
    }

    /// Catch-all for transport failures and responses we cannot interpret.
    pub fn other(message: impl Into<String>, detail: Option<&str>) -> Self {
        Self::new(
            ErrorCode::OtherError,
            message,
            LocalizedMessage::with_param("TrRoutingServerError", "error", detail.unwrap_or("-")),
        )
    }

    /// Wrap a failure of one requested mode.
    pub fn for_mode(mode: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::CalculatorError,
            format!("cannot calculate routing for mode {mode}: {cause}"),
            LocalizedMessage::with_param("ErrorForMode", "mode", mode),
        )
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn localized(&self) -> &LocalizedMessage {
        &self.localized
    }

    /// Export in the shape sent to clients.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            error_code: self.code.as_str().to_string(),
            error: self.message.clone(),
            localized_message: self.localized.clone(),
        }
    }
}

/// Serialized form of a [`RoutingError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error_code: String,
    pub error: String,
    pub localized_message: LocalizedMessage,
}

impl From<ErrorPayload> for RoutingError {
    fn from(payload: ErrorPayload) -> Self {
        let code = serde_json::from_value(serde_json::Value::String(payload.error_code))
            .unwrap_or(ErrorCode::OtherError);
        RoutingError::new(code, payload.error, payload.localized_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_table() {
        let cases = [
            ("NO_ACCESS_AT_ORIGIN", ErrorCode::NoAccessAtOrigin),
            ("NO_ACCESS_AT_DESTINATION", ErrorCode::NoAccessAtDestination),
            ("NO_SERVICE_FROM_ORIGIN", ErrorCode::NoServiceAtOrigin),
            ("NO_SERVICE_TO_DESTINATION", ErrorCode::NoServiceAtDestination),
            (
                "NO_ACCESS_AT_ORIGIN_AND_DESTINATION",
                ErrorCode::NoAccessAtOriginAndDestination,
            ),
            ("NO_ACCESS_AT_PLACE", ErrorCode::NoAccessAtPlace),
            ("NO_SERVICE_AT_PLACE", ErrorCode::NoServiceAtPlace),
            ("NO_ROUTING_FOUND", ErrorCode::NoRoutingFound),
            ("SOMETHING_NEW", ErrorCode::NoRoutingFound),
        ];
        for (reason, code) in cases {
            assert_eq!(ErrorCode::from_no_routing_reason(reason), code, "{reason}");
        }
    }

    #[test]
    fn code_serializes_to_wire_value() {
        for code in [
            ErrorCode::NoAccessAtOrigin,
            ErrorCode::NoAccessAtDestination,
            ErrorCode::ServerNotRunning,
            ErrorCode::CalculatorError,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::String(code.as_str().to_string()));
        }
    }

    #[test]
    fn payload_shape() {
        let err = RoutingError::for_mode("cycling", "connection reset");
        let json = serde_json::to_value(err.to_payload()).unwrap();

        assert_eq!(json["errorCode"], "TRCalculatorError");
        assert_eq!(
            json["error"],
            "cannot calculate routing for mode cycling: connection reset"
        );
        assert_eq!(
            json["localizedMessage"]["text"],
            "transit:transitRouting:errors:ErrorForMode"
        );
        assert_eq!(json["localizedMessage"]["params"]["mode"], "cycling");
    }

    #[test]
    fn bare_key_serializes_as_string() {
        let err = RoutingError::server_not_running("ECONNREFUSED");
        let json = serde_json::to_value(err.to_payload()).unwrap();
        assert_eq!(
            json["localizedMessage"],
            "transit:transitRouting:errors:TrRoutingServerNotRunning"
        );
    }

    #[test]
    fn payload_converts_back() {
        let err = RoutingError::other("boom", None);
        let back = RoutingError::from(err.to_payload());
        assert_eq!(back, err);
        assert_eq!(back.localized().text(), "transit:transitRouting:errors:TrRoutingServerError");
    }
}
