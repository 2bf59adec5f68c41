//! How requests reach the transit engine.
//!
//! A [`TransitChannel`] is used when one is injected; otherwise requests are
//! POSTed as JSON to fixed paths under the configured base URL. Both answer
//! with a status envelope, `{"status": "ok", "result": ...}` or
//! `{"status": "error", "error": ...}`, which is unwrapped here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::RoutingError;

/// Error code a transport reports when the engine refuses connections.
const CONNECTION_REFUSED: &str = "ECONNREFUSED";

/// The engine operations, each with a channel route and an HTTP path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCall {
    Route,
    RouteV1,
    Summary,
    AccessibilityMap,
}

impl ApiCall {
    pub fn channel_route(&self) -> &'static str {
        match self {
            ApiCall::Route => "service.trRouting.route",
            ApiCall::RouteV1 => "service.trRouting.routeV1",
            ApiCall::Summary => "service.trRouting.summary",
            ApiCall::AccessibilityMap => "service.trRouting.accessibilityMap",
        }
    }

    pub fn http_path(&self) -> &'static str {
        match self {
            ApiCall::Route => "/trRouting/route",
            ApiCall::RouteV1 => "/trRouting/routeV1",
            ApiCall::Summary => "/trRouting/summary",
            ApiCall::AccessibilityMap => "/trRouting/accessibilityMap",
        }
    }
}

/// Errors raised by a [`TransitChannel`] itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    /// Nothing is listening on the other end
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// Any other channel failure
    #[error("channel error: {0}")]
    Other(String),
}

/// A request/response message channel to the transit engine.
///
/// Implementations send `payload` on `route` and resolve with the status
/// envelope the other side answered with.
#[async_trait]
pub trait TransitChannel: Send + Sync {
    async fn send(&self, route: &str, payload: Value) -> Result<Value, ChannelError>;
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Envelope {
    Ok {
        #[serde(default)]
        result: Value,
    },
    Error {
        #[serde(default)]
        error: Value,
    },
}

/// Channel when injected, HTTP otherwise.
#[derive(Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    channel: Option<Arc<dyn TransitChannel>>,
}

impl Transport {
    pub fn new(
        base_url: String,
        timeout_secs: u64,
        channel: Option<Arc<dyn TransitChannel>>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            channel,
        })
    }

    /// Send `payload` for `call` and return the unwrapped result.
    pub async fn call(&self, call: ApiCall, payload: Value) -> Result<Value, RoutingError> {
        let envelope = match &self.channel {
            Some(channel) => {
                debug!(route = call.channel_route(), "transit request over channel");
                channel
                    .send(call.channel_route(), payload)
                    .await
                    .map_err(|e| match e {
                        ChannelError::ConnectionRefused(detail) => {
                            RoutingError::server_not_running(detail)
                        }
                        ChannelError::Other(detail) => RoutingError::other(
                            format!("cannot handle call to trRouting: {detail}"),
                            Some(&detail),
                        ),
                    })?
            }
            None => self.post(call, payload).await?,
        };
        unwrap_envelope(envelope)
    }

    async fn post(&self, call: ApiCall, payload: Value) -> Result<Value, RoutingError> {
        let url = format!("{}{}", self.base_url, call.http_path());
        debug!(%url, "transit request over HTTP");

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RoutingError::server_not_running(&e)
                } else {
                    RoutingError::other(
                        "Error querying trRouting from server",
                        Some(&e.to_string()),
                    )
                }
            })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(RoutingError::other(
                "Error querying trRouting from server",
                Some(response.status().as_str()),
            ));
        }

        response.json::<Value>().await.map_err(|e| {
            RoutingError::other("Error querying trRouting from server", Some(&e.to_string()))
        })
    }
}

/// Turn a status envelope into its result, or the matching error.
pub(crate) fn unwrap_envelope(envelope: Value) -> Result<Value, RoutingError> {
    let envelope: Envelope = serde_json::from_value(envelope).map_err(|e| {
        RoutingError::other(
            "cannot handle call to trRouting: invalid response envelope",
            Some(&e.to_string()),
        )
    })?;

    match envelope {
        Envelope::Ok { result } => Ok(result),
        Envelope::Error { error } => {
            let detail = match &error {
                Value::String(s) => s.clone(),
                Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            match error.get("code").and_then(Value::as_str) {
                Some(CONNECTION_REFUSED) => Err(RoutingError::server_not_running(detail)),
                Some(code) => Err(RoutingError::other(
                    format!("cannot handle call to trRouting: {code}"),
                    Some(&detail),
                )),
                None => Err(RoutingError::other(
                    format!("cannot handle call to trRouting: {detail}"),
                    Some(&detail),
                )),
            }
        }
    }
}
