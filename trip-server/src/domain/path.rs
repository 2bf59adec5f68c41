//! Point-to-point paths returned by the generic routing engine.

use serde::{Deserialize, Serialize};

/// One leg of a [`Path`], between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathLeg {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<serde_json::Value>,
}

/// A route for a single non-transit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    #[serde(default)]
    pub legs: Vec<PathLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<geojson::Geometry>,
}

impl Path {
    pub fn new(distance: f64, duration: f64) -> Self {
        Self {
            distance,
            duration,
            legs: Vec::new(),
            geometry: None,
        }
    }

    pub fn with_geometry(mut self, geometry: geojson::Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}
