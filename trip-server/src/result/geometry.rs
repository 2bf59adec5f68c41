//! GeoJSON building blocks for path geometry.

use async_trait::async_trait;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue, feature::Id};
use serde_json::Value;

use crate::domain::{BoardingStep, UnboardingStep};

/// Color used for walking segments when none is configured.
pub const DEFAULT_WALKING_COLOR: &str = "#a0a0a0";

/// Errors from geometry reconstruction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// No alternative at this index
    #[error("no path at index {0}")]
    PathNotFound(usize),

    /// The path was returned without geometry
    #[error("geometry should be in the route, it is not")]
    MissingGeometry,

    /// Asked for the walk-only path of a result that has none
    #[error("walk only path not available")]
    MissingWalkOnlyPath,

    /// The in-vehicle segment could not be drawn
    #[error("cannot build segment geometry: {0}")]
    Segment(String),
}

/// Options for [`TransitResult::path_geojson`](super::TransitResult::path_geojson).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryOptions {
    /// Attach timing and line identifiers to every feature
    pub complete_data: bool,
    /// Color of walking segments
    pub walking_color: String,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            complete_data: false,
            walking_color: DEFAULT_WALKING_COLOR.to_string(),
        }
    }
}

impl GeometryOptions {
    pub fn with_complete_data(mut self, complete_data: bool) -> Self {
        self.complete_data = complete_data;
        self
    }

    pub fn with_walking_color(mut self, color: impl Into<String>) -> Self {
        self.walking_color = color.into();
        self
    }
}

/// Draws the in-vehicle part of an itinerary.
#[async_trait]
pub trait SegmentGeometry: Send + Sync {
    /// Feature for the ride from `boarding` to `unboarding`.
    async fn segment_geometry(
        &self,
        boarding: &BoardingStep,
        unboarding: &UnboardingStep,
        complete_data: bool,
        step_sequence: usize,
    ) -> Result<Feature, GeometryError>;
}

/// Straight lines between the boarding and unboarding nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightSegmentGeometry;

#[async_trait]
impl SegmentGeometry for StraightSegmentGeometry {
    async fn segment_geometry(
        &self,
        boarding: &BoardingStep,
        unboarding: &UnboardingStep,
        complete_data: bool,
        step_sequence: usize,
    ) -> Result<Feature, GeometryError> {
        let line = GeoValue::LineString(vec![
            boarding.stop.node_coordinates.position(),
            unboarding.stop.node_coordinates.position(),
        ]);
        Ok(feature(
            Geometry::new(line),
            ride_properties(boarding, unboarding, complete_data, step_sequence),
        ))
    }
}

/// A feature with geometry and properties.
pub(crate) fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub(crate) fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub(crate) fn numeric_id(id: usize) -> Id {
    Id::Number(serde_json::Number::from(id))
}

/// Distance and travel time, the properties every segment carries.
pub(crate) fn segment_properties(distance: f64, duration: f64) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("distanceMeters".into(), number(distance));
    properties.insert("travelTimeSeconds".into(), number(duration));
    properties
}

/// Properties of an in-vehicle segment.
pub fn ride_properties(
    boarding: &BoardingStep,
    unboarding: &UnboardingStep,
    complete_data: bool,
    step_sequence: usize,
) -> JsonObject {
    let mut properties = segment_properties(
        unboarding.in_vehicle_distance,
        f64::from(unboarding.in_vehicle_time),
    );
    properties.insert("mode".into(), boarding.stop.mode.clone().into());
    properties.insert("action".into(), "ride".into());
    properties.insert("stepSequence".into(), step_sequence.into());
    if complete_data {
        let stop = &boarding.stop;
        properties.insert(
            "departureTimeSeconds".into(),
            boarding.departure_time.seconds().into(),
        );
        properties.insert(
            "arrivalTimeSeconds".into(),
            unboarding.arrival_time.seconds().into(),
        );
        properties.insert("inVehicleTimeSeconds".into(), unboarding.in_vehicle_time.into());
        properties.insert(
            "inVehicleDistanceMeters".into(),
            number(unboarding.in_vehicle_distance),
        );
        properties.insert("agencyAcronym".into(), stop.agency_acronym.clone().into());
        properties.insert("agencyUuid".into(), stop.agency_uuid.clone().into());
        properties.insert("lineShortname".into(), stop.line_shortname.clone().into());
        properties.insert("lineUuid".into(), stop.line_uuid.clone().into());
        if let Some(path_uuid) = &stop.path_uuid {
            properties.insert("pathUuid".into(), path_uuid.clone().into());
        }
        properties.insert("legSequenceInTrip".into(), stop.leg_sequence_in_trip.into());
    }
    properties
}

/// JSON number for a float; non-finite values become null.
fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
