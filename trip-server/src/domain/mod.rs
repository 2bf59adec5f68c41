//! Domain types for multimodal trip routing.
//!
//! This module contains the request and path model shared by the routing
//! backends, result composition and the HTTP layer. Values are built fresh
//! for each request and never mutated once a result is assembled.

mod coordinates;
mod mode;
mod path;
mod query;
mod time;
mod transit_path;

pub use coordinates::Coordinates;
pub use mode::{InvalidMode, Mode};
pub use path::{Path, PathLeg};
pub use query::{
    AccessibilityMapQuery, AccessibleNodes, DEFAULT_MAX_ACCESS_EGRESS_TIME,
    DEFAULT_MAX_TRANSFER_TIME, DEFAULT_MAX_TRAVEL_TIME, DEFAULT_MIN_WAITING_TIME, HostPort,
    TransitRouteQuery, TripQuery,
};
pub use time::{SecondsSinceMidnight, TimeError, TimeType};
pub use transit_path::{
    BoardingStep, Step, StopVisit, TransitPath, TransitRoute, UnboardingStep, WalkingStep,
    WalkingType,
};
