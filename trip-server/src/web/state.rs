//! Application state for the web layer.

use std::sync::Arc;

use crate::planner::TripRouter;
use crate::routing::RouteProvider;
use crate::transit::TransitRoutingClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Multimodal trip router
    pub router: TripRouter,

    /// Transit engine client, for the transit-only endpoints
    pub transit: Arc<TransitRoutingClient>,

    /// Point-to-point routing engine, also used for walking geometry
    pub unimodal: Arc<dyn RouteProvider>,

    /// Color given to walking segments
    pub walking_color: Arc<str>,
}

impl AppState {
    pub fn new(
        transit: TransitRoutingClient,
        unimodal: Arc<dyn RouteProvider>,
        walking_color: impl Into<Arc<str>>,
    ) -> Self {
        let transit = Arc::new(transit);
        Self {
            router: TripRouter::new(transit.clone(), unimodal.clone()),
            transit,
            unimodal,
            walking_color: walking_color.into(),
        }
    }
}
