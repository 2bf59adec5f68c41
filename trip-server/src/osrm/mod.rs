//! OSRM routing engine client.
//!
//! Serves every non-transit mode through the OSRM HTTP route service. Each
//! mode maps to an OSRM profile; modes without a profile are rejected.

mod client;
mod types;

pub use client::{OsrmClient, OsrmConfig};
pub use types::{Route, RouteLeg, RouteResponse, Waypoint};
