//! Transit results and their geometry.
//!
//! The walk-only path, when there is one, takes a virtual slot among the
//! transit paths: it is ranked before the first transit path that takes at
//! least as long. Indices seen by callers count that slot.
//!
//! Geometry is not part of a transit itinerary. It is rebuilt on demand by
//! routing every walking step on foot and asking a [`SegmentGeometry`] for
//! every ride.

use futures::future::join_all;
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::geometry::{
    GeometryError, GeometryOptions, SegmentGeometry, collection, feature, numeric_id,
    ride_properties, segment_properties,
};
use crate::domain::{Coordinates, Mode, Path, Step, TransitPath, WalkingStep};
use crate::error::{ErrorPayload, RoutingError};
use crate::routing::{RouteProvider, RouteRequest};

/// Serialized form of a [`TransitResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitResultData {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub paths: Vec<TransitPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_only_path: Option<Path>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

/// Transit itineraries, plus an optional walk-only alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransitResultData", into = "TransitResultData")]
pub struct TransitResult {
    data: TransitResultData,
    /// Rank of the walk-only path, if there is one.
    walk_only_index: Option<usize>,
}

impl From<TransitResultData> for TransitResult {
    fn from(data: TransitResultData) -> Self {
        let walk_only_index = data
            .walk_only_path
            .as_ref()
            .map(|walk| walk_only_rank(walk.duration, &data.paths));
        Self {
            data,
            walk_only_index,
        }
    }
}

impl From<TransitResult> for TransitResultData {
    fn from(result: TransitResult) -> Self {
        result.data
    }
}

/// Index of the first path at least as long as the walk, else the end.
///
/// Assumes `paths` are sorted by total travel time.
fn walk_only_rank(walk_duration: f64, paths: &[TransitPath]) -> usize {
    paths
        .iter()
        .position(|p| walk_duration <= f64::from(p.total_travel_time()))
        .unwrap_or(paths.len())
}

impl TransitResult {
    pub fn new(
        origin: Coordinates,
        destination: Coordinates,
        paths: Vec<TransitPath>,
        walk_only_path: Option<Path>,
    ) -> Self {
        TransitResultData {
            origin,
            destination,
            paths,
            walk_only_path,
            error: None,
        }
        .into()
    }

    /// A result with no paths, recording why.
    pub fn failed(origin: Coordinates, destination: Coordinates, error: &RoutingError) -> Self {
        TransitResultData {
            origin,
            destination,
            paths: Vec::new(),
            walk_only_path: None,
            error: Some(error.to_payload()),
        }
        .into()
    }

    pub fn origin(&self) -> Coordinates {
        self.data.origin
    }

    pub fn destination(&self) -> Coordinates {
        self.data.destination
    }

    /// Transit paths only, without the walk-only slot.
    pub fn transit_paths(&self) -> &[TransitPath] {
        &self.data.paths
    }

    pub fn walk_only_index(&self) -> Option<usize> {
        self.walk_only_index
    }

    pub fn walk_only_path(&self) -> Option<&Path> {
        self.data.walk_only_path.as_ref()
    }

    pub fn alternatives_count(&self) -> usize {
        self.data.paths.len() + usize::from(self.walk_only_index.is_some())
    }

    pub fn has_alternatives(&self) -> bool {
        self.walk_only_index.is_some() || self.data.paths.len() > 1
    }

    /// Transit path at `index`, counting the walk-only slot.
    ///
    /// The walk-only slot itself yields `None`; use [`Self::walk_only_path`].
    pub fn path(&self, index: usize) -> Option<&TransitPath> {
        match self.walk_only_index {
            Some(walk) if index == walk => None,
            Some(walk) if index > walk => self.data.paths.get(index - 1),
            _ => self.data.paths.get(index),
        }
    }

    pub fn error(&self) -> Option<RoutingError> {
        self.data.error.clone().map(RoutingError::from)
    }

    pub fn origin_destination_geojson(&self) -> FeatureCollection {
        collection(vec![
            self.data.origin.to_feature(),
            self.data.destination.to_feature(),
        ])
    }

    pub fn walk_path_geojson(&self, color: &str) -> Result<FeatureCollection, GeometryError> {
        let walk = self
            .walk_only_path()
            .ok_or(GeometryError::MissingWalkOnlyPath)?;
        let geometry = walk.geometry.clone().ok_or(GeometryError::MissingGeometry)?;

        let mut properties = segment_properties(walk.distance, walk.duration);
        properties.insert("mode".into(), Mode::Walking.as_str().into());
        properties.insert("color".into(), color.into());
        Ok(collection(vec![feature(geometry, properties)]))
    }

    /// Draw the alternative at `index`.
    ///
    /// Walking steps are routed on foot through `walker`, all at once. A
    /// walking step that cannot be routed is left out. Rides are drawn by
    /// `segments` when given, and left out otherwise. A ride whose segment
    /// geometry fails is also left out, and logged at `warn`.
    pub async fn path_geojson(
        &self,
        index: usize,
        options: &GeometryOptions,
        walker: &dyn RouteProvider,
        segments: Option<&dyn SegmentGeometry>,
    ) -> Result<FeatureCollection, GeometryError> {
        if self.walk_only_index == Some(index) {
            return self.walk_path_geojson(&options.walking_color);
        }
        let Some(path) = self.path(index) else {
            return Ok(collection(Vec::new()));
        };

        let steps = path.steps();
        let walking = self.walking_features(steps, walker).await;
        let features = assemble(steps, walking, options, segments).await;
        Ok(collection(features))
    }

    /// One walking feature per walking step, `None` where routing failed.
    async fn walking_features(
        &self,
        steps: &[Step],
        walker: &dyn RouteProvider,
    ) -> Vec<Option<Feature>> {
        let requests: Vec<RouteRequest> = steps
            .iter()
            .enumerate()
            .filter(|(_, step)| matches!(step, Step::Walking(_)))
            .map(|(i, _)| {
                let (from, to) = self.walking_endpoints(steps, i);
                RouteRequest::between(Mode::Walking, from, to)
            })
            .collect();

        let results = join_all(requests.iter().map(|r| walker.route(r))).await;

        results
            .into_iter()
            .zip(&requests)
            .map(|(result, request)| match result {
                Ok(found) => {
                    let route = found.routes.into_iter().next()?;
                    let geometry = route.geometry?;
                    Some(feature(
                        geometry,
                        segment_properties(route.distance, route.duration),
                    ))
                }
                Err(e) => {
                    debug!(
                        from = %request.points[0],
                        to = %request.points[request.points.len() - 1],
                        error = %e,
                        "walking segment could not be routed"
                    );
                    None
                }
            })
            .collect()
    }

    /// Where the walking step at `i` starts and ends.
    ///
    /// Walks start at the node just alighted from, or the trip origin, and
    /// end at the node about to be boarded, or the trip destination.
    fn walking_endpoints(&self, steps: &[Step], i: usize) -> (Coordinates, Coordinates) {
        let from = i
            .checked_sub(1)
            .and_then(|prev| match &steps[prev] {
                Step::Unboarding(u) => Some(u.stop.node_coordinates),
                _ => None,
            })
            .unwrap_or(self.data.origin);
        let to = match steps.get(i + 1) {
            Some(Step::Boarding(b)) => b.stop.node_coordinates,
            _ => self.data.destination,
        };
        (from, to)
    }
}

/// Walk the steps again, in order, and emit one feature per drawable step.
async fn assemble(
    steps: &[Step],
    walking: Vec<Option<Feature>>,
    options: &GeometryOptions,
    segments: Option<&dyn SegmentGeometry>,
) -> Vec<Feature> {
    let mut features = Vec::new();
    let mut walking = walking.into_iter();
    let mut step_sequence = 0;

    for (i, step) in steps.iter().enumerate() {
        match step {
            Step::Walking(walk) => {
                if let Some(mut feature) = walking.next().flatten() {
                    feature.id = Some(numeric_id(i + 2));
                    let properties = feature.properties.get_or_insert_with(JsonObject::new);
                    walking_properties(properties, walk, options, step_sequence);
                    step_sequence += 1;
                    features.push(feature);
                }
            }
            Step::Boarding(boarding) => {
                if let (Some(segments), Some(Step::Unboarding(unboarding))) =
                    (segments, steps.get(i + 1))
                {
                    if unboarding.stop.path_uuid.is_some() {
                        match segments
                            .segment_geometry(boarding, unboarding, options.complete_data, step_sequence)
                            .await
                        {
                            Ok(mut ride) => {
                                let mut properties = ride_properties(
                                    boarding,
                                    unboarding,
                                    options.complete_data,
                                    step_sequence,
                                );
                                if let Some(own) = ride.properties.take() {
                                    properties.extend(own);
                                }
                                ride.properties = Some(properties);
                                features.push(ride);
                            }
                            Err(e) => warn!(
                                line = %boarding.stop.line_uuid,
                                error = %e,
                                "ride segment could not be drawn"
                            ),
                        }
                    }
                }
                step_sequence += 1;
            }
            Step::Unboarding(_) => {}
        }
    }
    features
}

fn walking_properties(
    properties: &mut JsonObject,
    walk: &WalkingStep,
    options: &GeometryOptions,
    step_sequence: usize,
) {
    properties.insert("color".into(), options.walking_color.clone().into());
    properties.insert("mode".into(), Mode::Walking.as_str().into());
    properties.insert("action".into(), "walking".into());
    properties.insert("stepSequence".into(), step_sequence.into());
    if options.complete_data {
        properties.insert("type".into(), walk.kind.as_str().into());
        properties.insert(
            "departureTimeSeconds".into(),
            walk.departure_time.seconds().into(),
        );
        properties.insert(
            "arrivalTimeSeconds".into(),
            walk.arrival_time.seconds().into(),
        );
    }
}
