use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use super::geometry::{GeometryError, collection, feature, segment_properties};
use crate::domain::{Coordinates, Mode, Path};
use crate::error::{ErrorPayload, RoutingError};

/// Paths for one non-transit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnimodalResult {
    pub routing_mode: Mode,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub paths: Vec<Path>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl UnimodalResult {
    pub fn new(mode: Mode, origin: Coordinates, destination: Coordinates, paths: Vec<Path>) -> Self {
        Self {
            routing_mode: mode,
            origin,
            destination,
            paths,
            error: None,
        }
    }

    /// A result with no paths, recording why.
    pub fn failed(
        mode: Mode,
        origin: Coordinates,
        destination: Coordinates,
        error: &RoutingError,
    ) -> Self {
        Self {
            error: Some(error.to_payload()),
            ..Self::new(mode, origin, destination, Vec::new())
        }
    }

    pub fn alternatives_count(&self) -> usize {
        self.paths.len()
    }

    pub fn has_alternatives(&self) -> bool {
        self.alternatives_count() > 1
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index)
    }

    pub fn error(&self) -> Option<RoutingError> {
        self.error.clone().map(RoutingError::from)
    }

    /// The path at `index` as a single-feature collection.
    pub fn path_geojson(
        &self,
        index: usize,
        color: Option<&str>,
    ) -> Result<FeatureCollection, GeometryError> {
        let path = self.path(index).ok_or(GeometryError::PathNotFound(index))?;
        let geometry = path.geometry.clone().ok_or(GeometryError::MissingGeometry)?;

        let mut properties = segment_properties(path.distance, path.duration);
        properties.insert("mode".into(), self.routing_mode.as_str().into());
        if let Some(color) = color {
            properties.insert("color".into(), color.into());
        }
        Ok(collection(vec![feature(geometry, properties)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Geometry, Value as GeoValue};

    fn line() -> Geometry {
        Geometry::new(GeoValue::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]))
    }

    fn result(paths: Vec<Path>) -> UnimodalResult {
        UnimodalResult::new(
            Mode::Driving,
            Coordinates::new(0.0, 0.0),
            Coordinates::new(1.0, 1.0),
            paths,
        )
    }

    #[test]
    fn counts_alternatives() {
        assert!(!result(vec![]).has_alternatives());
        assert!(!result(vec![Path::new(1.0, 1.0)]).has_alternatives());

        let r = result(vec![Path::new(1.0, 1.0), Path::new(2.0, 2.0)]);
        assert_eq!(r.alternatives_count(), 2);
        assert!(r.has_alternatives());
        assert_eq!(r.path(1).unwrap().distance, 2.0);
        assert!(r.path(2).is_none());
    }

    #[test]
    fn geojson_carries_path_figures() {
        let r = result(vec![Path::new(1500.0, 240.0).with_geometry(line())]);
        let fc = r.path_geojson(0, Some("#ff0000")).unwrap();

        assert_eq!(fc.features.len(), 1);
        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["distanceMeters"], 1500.0);
        assert_eq!(props["travelTimeSeconds"], 240.0);
        assert_eq!(props["mode"], "driving");
        assert_eq!(props["color"], "#ff0000");
    }

    #[test]
    fn geojson_fails_explicitly() {
        let r = result(vec![Path::new(1.0, 1.0)]);
        assert_eq!(r.path_geojson(0, None).unwrap_err(), GeometryError::MissingGeometry);
        assert_eq!(r.path_geojson(3, None).unwrap_err(), GeometryError::PathNotFound(3));
    }

    #[test]
    fn failed_result_keeps_error() {
        let err = RoutingError::for_mode("driving", "timeout");
        let r = UnimodalResult::failed(
            Mode::Driving,
            Coordinates::new(0.0, 0.0),
            Coordinates::new(1.0, 1.0),
            &err,
        );
        assert!(r.paths.is_empty());
        assert_eq!(r.error(), Some(err));

        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["error"]["errorCode"], "TRCalculatorError");
    }
}
