//! Geographic points.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A WGS84 position.
///
/// Serialized as a GeoJSON position, `[lon, lat]`. The transit engine's
/// legacy query string wants the opposite order; see [`Coordinates::lat_lon`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinates {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// "lat,lon", as the legacy transit query expects.
    pub fn lat_lon(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }

    /// GeoJSON position (`[lon, lat]`).
    pub fn position(&self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }

    /// A GeoJSON point feature with no properties.
    pub fn to_feature(&self) -> geojson::Feature {
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(self.position()))),
            id: None,
            properties: None,
            foreign_members: None,
        }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lon, c.lat]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_position() {
        let c = Coordinates::new(-73.745618, 45.368994);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[-73.745618,45.368994]");

        let back: Coordinates = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn lat_lon_order() {
        let c = Coordinates::new(-73.5, 45.5);
        assert_eq!(c.lat_lon(), "45.5,-73.5");
        assert_eq!(c.to_string(), "-73.5,45.5");
    }

    #[test]
    fn point_feature() {
        let feature = Coordinates::new(1.0, 2.0).to_feature();
        let geometry = feature.geometry.unwrap();
        assert_eq!(geometry.value, geojson::Value::Point(vec![1.0, 2.0]));
    }
}
