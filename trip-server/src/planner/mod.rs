//! Multimodal trip planning.
//!
//! [`TripRouter`] routes one trip with every requested mode: transit through
//! a [`TransitRouter`](crate::transit::TransitRouter), everything else
//! through a [`RouteProvider`](crate::routing::RouteProvider).

mod router;

pub use router::{CalculationError, CancelCheck, TripRouter};
