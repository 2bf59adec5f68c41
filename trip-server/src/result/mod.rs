//! Routing results, keyed by mode.
//!
//! Transit and unimodal results have different shapes, so they are kept
//! apart in [`RoutingResult`]. Both know how many alternatives they hold and
//! how to draw any one of them as GeoJSON.

mod geometry;
mod transit;
mod unimodal;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::Mode;
use crate::error::RoutingError;

pub use geometry::{
    DEFAULT_WALKING_COLOR, GeometryError, GeometryOptions, SegmentGeometry,
    StraightSegmentGeometry, ride_properties,
};
pub use transit::{TransitResult, TransitResultData};
pub use unimodal::UnimodalResult;

/// Results of one trip request, in the order modes were requested.
pub type ResultsByMode = IndexMap<Mode, RoutingResult>;

/// The result for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoutingResult {
    // Unimodal first: its required `routingMode` field keeps transit
    // results from matching it.
    Unimodal(UnimodalResult),
    Transit(TransitResult),
}

impl RoutingResult {
    pub fn alternatives_count(&self) -> usize {
        match self {
            RoutingResult::Unimodal(r) => r.alternatives_count(),
            RoutingResult::Transit(r) => r.alternatives_count(),
        }
    }

    pub fn has_alternatives(&self) -> bool {
        match self {
            RoutingResult::Unimodal(r) => r.has_alternatives(),
            RoutingResult::Transit(r) => r.has_alternatives(),
        }
    }

    pub fn error(&self) -> Option<RoutingError> {
        match self {
            RoutingResult::Unimodal(r) => r.error(),
            RoutingResult::Transit(r) => r.error(),
        }
    }

    pub fn as_transit(&self) -> Option<&TransitResult> {
        match self {
            RoutingResult::Transit(r) => Some(r),
            RoutingResult::Unimodal(_) => None,
        }
    }

    pub fn as_unimodal(&self) -> Option<&UnimodalResult> {
        match self {
            RoutingResult::Unimodal(r) => Some(r),
            RoutingResult::Transit(_) => None,
        }
    }
}

impl From<UnimodalResult> for RoutingResult {
    fn from(result: UnimodalResult) -> Self {
        RoutingResult::Unimodal(result)
    }
}

impl From<TransitResult> for RoutingResult {
    fn from(result: TransitResult) -> Self {
        RoutingResult::Transit(result)
    }
}
