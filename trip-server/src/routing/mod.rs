//! Point-to-point routing for non-transit modes.
//!
//! [`RouteProvider`] is the seam between the planner and a generic routing
//! engine. The planner uses it for every requested mode other than transit,
//! and result composition uses it again for walking sub-queries when it
//! rebuilds the geometry of a transit itinerary.

mod error;

use async_trait::async_trait;

use crate::domain::{Coordinates, Mode, Path};

pub use error::ProviderError;

/// A route request for one mode through an ordered list of points.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub mode: Mode,
    /// Origin, any waypoints, then destination.
    pub points: Vec<Coordinates>,
    pub with_alternatives: bool,
}

impl RouteRequest {
    /// Direct route between two points.
    pub fn between(mode: Mode, origin: Coordinates, destination: Coordinates) -> Self {
        Self {
            mode,
            points: vec![origin, destination],
            with_alternatives: false,
        }
    }

    /// Insert waypoints between the origin and destination.
    pub fn with_waypoints(mut self, waypoints: &[Coordinates]) -> Self {
        if self.points.len() >= 2 && !waypoints.is_empty() {
            let destination = self.points.pop();
            self.points.extend_from_slice(waypoints);
            self.points.extend(destination);
        }
        self
    }

    pub fn with_alternatives(mut self, alternatives: bool) -> Self {
        self.with_alternatives = alternatives;
        self
    }
}

/// Routes found for a [`RouteRequest`], best first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteResults {
    pub routes: Vec<Path>,
}

/// A generic point-to-point routing engine.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Compute routes for the request's mode.
    async fn route(&self, request: &RouteRequest) -> Result<RouteResults, ProviderError>;
}
