//! OSRM route service response types.
//!
//! Only the fields the planner reads are modelled; OSRM sends more.

use serde::Deserialize;

use crate::domain::{Path, PathLeg};

/// Response of `GET /route/v1/{profile}/{coordinates}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteResponse {
    /// "Ok" on success, otherwise an error code such as "NoRoute".
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub geometry: Option<geojson::Geometry>,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub steps: Vec<serde_json::Value>,
}

/// An input point snapped to the network.
#[derive(Debug, Clone, Deserialize)]
pub struct Waypoint {
    /// Meters between the input point and its snapped location.
    #[serde(default)]
    pub distance: f64,
    pub location: [f64; 2],
}

impl From<Route> for Path {
    fn from(route: Route) -> Self {
        Path {
            distance: route.distance,
            duration: route.duration,
            legs: route
                .legs
                .into_iter()
                .map(|leg| PathLeg {
                    distance: leg.distance,
                    duration: leg.duration,
                    steps: leg.steps,
                })
                .collect(),
            geometry: route.geometry,
        }
    }
}
