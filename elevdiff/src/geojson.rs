//! Loading points from GeoJSON.
//!
//! Enable the `geojson` feature to use this module.
//!
//! Positions use GeoJSON order, `[longitude, latitude, z]`, where `z` is the
//! reference elevation. A 2D position may take its reference elevation from
//! the enclosing feature's `z` property instead.
//!
//! Supported geometry types:
//! - Point
//! - MultiPoint
//! - LineString
//! - GeometryCollection (of the above)
//!
//! # Example
//!
//! ```ignore
//! use elevdiff::geojson::points_from_geojson;
//!
//! let points = points_from_geojson(r#"{
//!     "type": "LineString",
//!     "coordinates": [[138.5, 35.5, 500.0], [138.6, 35.6, 750.0]]
//! }"#)?;
//! assert_eq!(points.len(), 2);
//! ```

use std::fs;
use std::path::Path;

use geojson::{Feature, GeoJson, Geometry, Value as GeoJsonValue};

use crate::error::{ElevationError, Result};
use crate::point::Point;

/// Parse points from a GeoJSON document held in memory.
///
/// Points are returned in document order.
///
/// # Errors
///
/// Returns [`ElevationError::InvalidInput`] if the document is not valid
/// GeoJSON, contains unsupported geometry types, or a position has no
/// reference elevation.
pub fn points_from_geojson(data: &str) -> Result<Vec<Point>> {
    let geojson: GeoJson = data.parse().map_err(|e: geojson::Error| ElevationError::InvalidInput {
        reason: format!("invalid GeoJSON: {}", e),
    })?;

    let mut points = Vec::new();
    match geojson {
        GeoJson::Geometry(geometry) => collect_geometry(&geometry, None, &mut points)?,
        GeoJson::Feature(feature) => collect_feature(&feature, &mut points)?,
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                collect_feature(feature, &mut points)?;
            }
        }
    }

    for point in &points {
        point.validate()?;
    }
    Ok(points)
}

/// Load points from a GeoJSON file.
pub fn load_geojson_points<P: AsRef<Path>>(path: P) -> Result<Vec<Point>> {
    let data = fs::read_to_string(path.as_ref())?;
    points_from_geojson(&data)
}

fn collect_feature(feature: &Feature, points: &mut Vec<Point>) -> Result<()> {
    let fallback_z = feature
        .properties
        .as_ref()
        .and_then(|props| props.get("z"))
        .and_then(|z| z.as_f64());

    match &feature.geometry {
        Some(geometry) => collect_geometry(geometry, fallback_z, points),
        None => Ok(()),
    }
}

fn collect_geometry(
    geometry: &Geometry,
    fallback_z: Option<f64>,
    points: &mut Vec<Point>,
) -> Result<()> {
    match &geometry.value {
        GeoJsonValue::Point(position) => {
            points.push(position_to_point(position, fallback_z)?);
        }
        GeoJsonValue::MultiPoint(positions) | GeoJsonValue::LineString(positions) => {
            for position in positions {
                points.push(position_to_point(position, fallback_z)?);
            }
        }
        GeoJsonValue::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry(g, fallback_z, points)?;
            }
        }
        GeoJsonValue::Polygon(_) => return Err(unsupported("Polygon")),
        GeoJsonValue::MultiLineString(_) => return Err(unsupported("MultiLineString")),
        GeoJsonValue::MultiPolygon(_) => return Err(unsupported("MultiPolygon")),
    }
    Ok(())
}

fn unsupported(type_name: &str) -> ElevationError {
    ElevationError::InvalidInput {
        reason: format!("unsupported geometry type: {}", type_name),
    }
}

fn position_to_point(position: &[f64], fallback_z: Option<f64>) -> Result<Point> {
    match position {
        [lon, lat, z, ..] => Ok(Point::new(*lat, *lon, *z)),
        [lon, lat] => fallback_z
            .map(|z| Point::new(*lat, *lon, z))
            .ok_or_else(|| ElevationError::InvalidInput {
                reason: format!("position [{}, {}] has no reference elevation", lon, lat),
            }),
        _ => Err(ElevationError::InvalidInput {
            reason: format!("position must have at least 2 coordinates, got {}", position.len()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_string_with_z() {
        let points = points_from_geojson(
            r#"{"type": "LineString", "coordinates": [[138.5, 35.5, 500.0], [138.6, 35.6, 750.0]]}"#,
        )
        .unwrap();
        assert_eq!(
            points,
            vec![Point::new(35.5, 138.5, 500.0), Point::new(35.6, 138.6, 750.0)]
        );
    }

    #[test]
    fn test_feature_collection_with_z_property() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"z": 12.5},
                 "geometry": {"type": "Point", "coordinates": [-49.12, -21.83]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "Point", "coordinates": [-49.11, -21.82, 13.0]}}
            ]
        }"#;
        let points = points_from_geojson(data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], Point::new(-21.83, -49.12, 12.5));
        assert_eq!(points[1].reference_elevation, 13.0);
    }

    #[test]
    fn test_missing_reference_elevation() {
        let result = points_from_geojson(r#"{"type": "Point", "coordinates": [138.5, 35.5]}"#);
        assert!(matches!(result, Err(ElevationError::InvalidInput { .. })));
    }

    #[test]
    fn test_unsupported_geometry() {
        let data = r#"{"type": "Polygon", "coordinates": [[[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 0.0, 1.0]]]}"#;
        match points_from_geojson(data) {
            Err(ElevationError::InvalidInput { reason }) => assert!(reason.contains("Polygon")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_geojson() {
        assert!(matches!(
            points_from_geojson("not geojson"),
            Err(ElevationError::InvalidInput { .. })
        ));
    }
}
