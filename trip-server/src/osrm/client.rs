//! OSRM HTTP client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Mode, Path};
use crate::routing::{ProviderError, RouteProvider, RouteRequest, RouteResults};

use super::types::RouteResponse;

/// Default OSRM base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default distance, in meters, an input point may be from the network.
const DEFAULT_MAX_DISTANCE_FROM_NETWORK: f64 = 1000.0;

/// Configuration for the OSRM client.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL of the OSRM server
    pub base_url: String,
    /// Profile overrides by mode; see [`OsrmConfig::profile`]
    pub profiles: HashMap<Mode, String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Reject routes whose endpoints snap farther than this, in meters
    pub max_distance_from_network: f64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl OsrmConfig {
    /// Create a config pointing at the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            profiles: HashMap::new(),
            timeout_secs: 30,
            max_distance_from_network: DEFAULT_MAX_DISTANCE_FROM_NETWORK,
        }
    }

    /// Route `mode` with a specific OSRM profile.
    pub fn with_profile(mut self, mode: Mode, profile: impl Into<String>) -> Self {
        self.profiles.insert(mode, profile.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the maximum snapping distance.
    pub fn with_max_distance_from_network(mut self, meters: f64) -> Self {
        self.max_distance_from_network = meters;
        self
    }

    /// OSRM profile for a mode, if the mode can be routed.
    ///
    /// Road-based transit modes fall back to the driving profile; rail
    /// modes have none unless configured.
    pub fn profile(&self, mode: Mode) -> Option<&str> {
        if let Some(profile) = self.profiles.get(&mode) {
            return Some(profile);
        }
        match mode {
            Mode::Walking => Some("walking"),
            Mode::Cycling => Some("cycling"),
            Mode::Driving | Mode::BusUrban | Mode::BusSuburb | Mode::BusCongestion => {
                Some("driving")
            }
            _ => None,
        }
    }
}

/// OSRM route service client.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    config: OsrmConfig,
}

impl OsrmClient {
    /// Create a new OSRM client with the given configuration.
    pub fn new(config: OsrmConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    fn route_url(&self, profile: &str, request: &RouteRequest) -> String {
        let coordinates = request
            .points
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            profile,
            coordinates
        )
    }

    /// Reject the response if either end snapped too far from the network.
    fn check_network_distance(&self, response: &RouteResponse) -> Result<(), ProviderError> {
        let max = self.config.max_distance_from_network;
        let ends = [response.waypoints.first(), response.waypoints.last()];
        for waypoint in ends.into_iter().flatten() {
            if waypoint.distance > max {
                return Err(ProviderError::TooFarFromNetwork {
                    distance: waypoint.distance,
                    max,
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RouteProvider for OsrmClient {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResults, ProviderError> {
        let profile = self
            .config
            .profile(request.mode)
            .ok_or(ProviderError::UnsupportedMode(request.mode))?;
        let url = self.route_url(profile, request);

        debug!(mode = %request.mode, profile, points = request.points.len(), "OSRM route");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "false"),
                (
                    "alternatives",
                    if request.with_alternatives { "true" } else { "false" },
                ),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: Result<RouteResponse, _> = serde_json::from_str(&body);

        // OSRM reports routing failures as 400 with a JSON code.
        if !status.is_success() {
            return Err(match parsed {
                Ok(r) if r.code != "Ok" => ProviderError::NoRoute {
                    message: r.message.unwrap_or_default(),
                    code: r.code,
                },
                _ => ProviderError::Api {
                    status: status.as_u16(),
                    message: body,
                },
            });
        }

        let parsed = parsed.map_err(|e| ProviderError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        if parsed.code != "Ok" {
            return Err(ProviderError::NoRoute {
                message: parsed.message.unwrap_or_default(),
                code: parsed.code,
            });
        }

        self.check_network_distance(&parsed)?;

        let routes: Vec<Path> = parsed.routes.into_iter().map(Path::from).collect();
        debug!(mode = %request.mode, routes = routes.len(), "OSRM route done");
        Ok(RouteResults { routes })
    }
}
