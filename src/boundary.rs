//! National boundary loading and the per-record validity test.

use crate::error::{DashboardError, Result};
use crate::loader::check_file_exists;
use geo::{BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon, Rect};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Feature of the bundled country collection that holds the national outline.
pub const DEFAULT_FEATURE_INDEX: usize = 174;

/// The country outline. Loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct CountryBoundary {
    shape: MultiPolygon<f64>,
    bbox: Option<Rect<f64>>,
}

impl CountryBoundary {
    pub fn from_geometry(shape: MultiPolygon<f64>) -> Self {
        let bbox = shape.bounding_rect();
        CountryBoundary { shape, bbox }
    }

    /// Read a GeoJSON FeatureCollection and keep the feature at `feature_index`.
    pub fn load(path: &Path, feature_index: usize) -> Result<Self> {
        check_file_exists(path, "GeoJSON file")?;
        let bytes = fs::read(path)?;
        let value: Value = serde_json::from_slice(&bytes)?;
        let boundary = Self::from_geojson_value(&value, feature_index)?;
        info!(
            file = %path.display(),
            feature = feature_index,
            polygons = boundary.shape.0.len(),
            "boundary loaded"
        );
        Ok(boundary)
    }

    pub fn from_geojson_value(collection: &Value, feature_index: usize) -> Result<Self> {
        let features = collection["features"]
            .as_array()
            .ok_or_else(|| DashboardError::MalformedBoundary("missing 'features' array".into()))?;
        let feature = features
            .get(feature_index)
            .ok_or(DashboardError::FeatureIndexOutOfRange {
                index: feature_index,
                available: features.len(),
            })?;
        let geometry = &feature["geometry"];
        let coords = geometry["coordinates"]
            .as_array()
            .ok_or_else(|| DashboardError::MalformedBoundary("missing 'coordinates'".into()))?;

        let shape = match geometry["type"].as_str() {
            Some("Polygon") => MultiPolygon(vec![parse_polygon(coords)?]),
            Some("MultiPolygon") => MultiPolygon(
                coords
                    .iter()
                    .map(|p| {
                        p.as_array()
                            .ok_or_else(|| DashboardError::MalformedBoundary("polygon is not an array".into()))
                            .and_then(|rings| parse_polygon(rings))
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            other => {
                return Err(DashboardError::MalformedBoundary(format!(
                    "unsupported geometry type {:?}",
                    other
                )))
            }
        };
        Ok(Self::from_geometry(shape))
    }

    /// Whether `(longitude, latitude)` lies strictly inside the outline.
    /// Points on an edge, or inside a hole, are not contained.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        let Some(bbox) = self.bbox else {
            return false;
        };
        if longitude < bbox.min().x
            || longitude > bbox.max().x
            || latitude < bbox.min().y
            || latitude > bbox.max().y
        {
            return false;
        }
        self.shape.contains(&Point::new(longitude, latitude))
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.shape
    }
}

/// GeoJSON polygon: exterior ring followed by holes.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut parsed = rings
        .iter()
        .map(|ring| {
            ring.as_array()
                .ok_or_else(|| DashboardError::MalformedBoundary("ring is not an array".into()))
                .and_then(|r| parse_ring(r))
        })
        .collect::<Result<Vec<_>>>()?;
    if parsed.is_empty() {
        return Err(DashboardError::MalformedBoundary("polygon has no exterior ring".into()));
    }
    let exterior = parsed.remove(0);
    Ok(Polygon::new(exterior, parsed))
}

fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len() + 1);
    for pair in coords {
        let x = pair[0].as_f64();
        let y = pair[1].as_f64();
        match (x, y) {
            (Some(x), Some(y)) => points.push(Coord { x, y }),
            _ => {
                return Err(DashboardError::MalformedBoundary(format!(
                    "invalid position {}",
                    pair
                )))
            }
        }
    }
    // Close the ring if the source left it open.
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if first != last {
            points.push(first);
        }
    }
    Ok(LineString(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "ADMIN": "Elsewhere" },
                    "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]] }
                },
                {
                    "type": "Feature",
                    "properties": { "ADMIN": "Country" },
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [
                            [
                                [[60.0, 23.0], [78.0, 23.0], [78.0, 37.0], [60.0, 37.0], [60.0, 23.0]],
                                [[70.0, 30.0], [72.0, 30.0], [72.0, 32.0], [70.0, 32.0], [70.0, 30.0]]
                            ],
                            [
                                [[80.0, 10.0], [82.0, 10.0], [82.0, 12.0], [80.0, 12.0]]
                            ]
                        ]
                    }
                }
            ]
        })
    }

    #[test]
    fn selects_feature_by_index() {
        let b = CountryBoundary::from_geojson_value(&collection(), 1).unwrap();
        assert_eq!(b.geometry().0.len(), 2);
        assert!(b.contains(74.3, 31.5));
        assert!(b.contains(81.0, 11.0));
        assert!(!b.contains(0.5, 0.2));
    }

    #[test]
    fn longitude_comes_first() {
        let b = CountryBoundary::from_geojson_value(&collection(), 1).unwrap();
        assert!(b.contains(65.0, 25.0));
        assert!(!b.contains(25.0, 65.0));
    }

    #[test]
    fn boundary_points_and_holes_are_outside() {
        let b = CountryBoundary::from_geojson_value(&collection(), 1).unwrap();
        assert!(!b.contains(60.0, 30.0));
        assert!(!b.contains(60.0, 23.0));
        assert!(!b.contains(71.0, 31.0));
        assert!(!b.contains(70.0, 31.0));
    }

    #[test]
    fn open_rings_are_closed() {
        let b = CountryBoundary::from_geojson_value(&collection(), 0).unwrap();
        let ring = b.geometry().0[0].exterior();
        assert_eq!(ring.0.first(), ring.0.last());
        assert!(b.contains(0.9, 0.1));
    }

    #[test]
    fn index_out_of_range() {
        let err = CountryBoundary::from_geojson_value(&collection(), 174).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::FeatureIndexOutOfRange { index: 174, available: 2 }
        ));
    }

    #[test]
    fn rejects_point_geometry() {
        let value = json!({ "features": [ { "geometry": { "type": "Point", "coordinates": [1.0, 2.0] } } ] });
        assert!(matches!(
            CountryBoundary::from_geojson_value(&value, 0),
            Err(DashboardError::MalformedBoundary(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Countries.geojson");
        fs::write(&path, collection().to_string()).unwrap();
        let b = CountryBoundary::load(&path, 1).unwrap();
        assert!(b.contains(74.3, 31.5));

        let err = CountryBoundary::load(&dir.path().join("missing.geojson"), 1).unwrap_err();
        assert!(matches!(err, DashboardError::MissingFile { .. }));
    }
}
