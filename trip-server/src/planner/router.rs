//! Trip routing across modes.
//!
//! Modes are routed one after another, in the order they were requested.
//! A mode that fails never fails the trip: its result is left empty and
//! carries the error instead.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::domain::{Mode, Path, TransitPath, TripQuery};
use crate::error::RoutingError;
use crate::result::{ResultsByMode, RoutingResult, TransitResult, UnimodalResult};
use crate::routing::{RouteProvider, RouteRequest};
use crate::transit::TransitRouter;

/// Error from [`TripRouter::calculate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    /// The caller gave up before all modes were routed
    #[error("calculation cancelled")]
    Cancelled,
}

/// Polled between modes; `true` stops the calculation.
pub type CancelCheck<'a> = &'a (dyn Fn() -> bool + Send + Sync);

/// What one mode produced, before results are composed.
enum Outcome {
    Transit(Result<Vec<TransitPath>, RoutingError>),
    Unimodal(Result<Vec<Path>, RoutingError>),
}

/// Routes a trip with every requested mode.
#[derive(Clone)]
pub struct TripRouter {
    transit: Arc<dyn TransitRouter>,
    unimodal: Arc<dyn RouteProvider>,
}

impl TripRouter {
    pub fn new(transit: Arc<dyn TransitRouter>, unimodal: Arc<dyn RouteProvider>) -> Self {
        Self { transit, unimodal }
    }

    /// Route `query` with each of its modes and collect the results by mode.
    ///
    /// Only cancellation is returned as an error. `is_cancelled` is checked
    /// before each mode and once more before results are composed; a call
    /// already in flight is not interrupted.
    pub async fn calculate(
        &self,
        query: &TripQuery,
        is_cancelled: Option<CancelCheck<'_>>,
    ) -> Result<ResultsByMode, CalculationError> {
        let cancelled = || is_cancelled.is_some_and(|check| check());
        info!(
            origin = %query.origin,
            destination = %query.destination,
            modes = query.modes.len(),
            time = %query.time_of_trip,
            "calculating trip"
        );

        // A repeated mode replaces its earlier outcome.
        let mut outcomes: IndexMap<Mode, Outcome> = IndexMap::new();
        for &mode in &query.modes {
            if cancelled() {
                info!(mode = %mode, "trip calculation cancelled");
                return Err(CalculationError::Cancelled);
            }
            let outcome = if mode == Mode::Transit {
                Outcome::Transit(self.route_transit(query).await)
            } else {
                Outcome::Unimodal(self.route_unimodal(query, mode).await)
            };
            outcomes.insert(mode, outcome);
        }

        if cancelled() {
            info!("trip calculation cancelled");
            return Err(CalculationError::Cancelled);
        }

        let walk_only = walk_only_candidate(&outcomes, query.walk_only_max_duration());
        let results: ResultsByMode = outcomes
            .into_iter()
            .map(|(mode, outcome)| (mode, compose(query, mode, outcome, walk_only.clone())))
            .collect();

        info!(
            modes = results.len(),
            failed = results.values().filter(|r| r.error().is_some()).count(),
            "trip calculated"
        );
        Ok(results)
    }

    async fn route_transit(&self, query: &TripQuery) -> Result<Vec<TransitPath>, RoutingError> {
        let transit_query = query.to_transit_query();
        let host_port = query.host_port();
        match self.transit.route(&transit_query, host_port.as_ref()).await {
            Ok(paths) => {
                debug!(paths = paths.len(), "transit routed");
                Ok(paths)
            }
            Err(e) => {
                warn!(code = %e.code(), error = %e, "transit routing failed");
                Err(e)
            }
        }
    }

    async fn route_unimodal(&self, query: &TripQuery, mode: Mode) -> Result<Vec<Path>, RoutingError> {
        let request = RouteRequest::between(mode, query.origin, query.destination)
            .with_waypoints(&query.waypoints)
            .with_alternatives(query.with_alternatives);
        match self.unimodal.route(&request).await {
            Ok(found) => {
                debug!(mode = %mode, paths = found.routes.len(), "mode routed");
                Ok(found.routes)
            }
            Err(e) => {
                warn!(mode = %mode, error = %e, "mode routing failed");
                Err(RoutingError::for_mode(mode.as_str(), e))
            }
        }
    }
}

/// The walking route, if one was found and is short enough to offer
/// alongside transit.
fn walk_only_candidate(outcomes: &IndexMap<Mode, Outcome>, max_duration: u32) -> Option<Path> {
    let Some(Outcome::Unimodal(Ok(paths))) = outcomes.get(&Mode::Walking) else {
        return None;
    };
    paths
        .first()
        .filter(|path| path.duration <= f64::from(max_duration))
        .cloned()
}

fn compose(query: &TripQuery, mode: Mode, outcome: Outcome, walk_only: Option<Path>) -> RoutingResult {
    let (origin, destination) = (query.origin, query.destination);
    match outcome {
        Outcome::Transit(Ok(paths)) => {
            TransitResult::new(origin, destination, paths, walk_only).into()
        }
        Outcome::Transit(Err(e)) => TransitResult::failed(origin, destination, &e).into(),
        Outcome::Unimodal(Ok(paths)) => {
            UnimodalResult::new(mode, origin, destination, paths).into()
        }
        Outcome::Unimodal(Err(e)) => UnimodalResult::failed(mode, origin, destination, &e).into(),
    }
}
