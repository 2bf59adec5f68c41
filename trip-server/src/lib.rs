//! Multimodal trip routing server.
//!
//! Routes a trip between two points with every requested mode: transit
//! through an external transit engine, every other mode through OSRM. The
//! results are keyed by mode and can be drawn as GeoJSON on demand.

pub mod config;
pub mod domain;
pub mod error;
pub mod osrm;
pub mod planner;
pub mod result;
pub mod routing;
pub mod transit;
pub mod web;
