//! GeoJSON decode/encode for polygonal geometry
//!
//! Decoding accepts any polygonal GeoJSON object (bare geometries, features,
//! collections) and collapses it into a single validated `MultiPolygon`.
//! Points and lines inside collections are skipped.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Serializer;
use serde_json::{json, Map, Value};

use super::validation::GeometricValidator;
use super::{union_all, Geometry};
use crate::core::error::{AtlasError, Result};

/// Decode a GeoJSON value into one validated multipolygon
pub fn decode(value: &Value) -> Result<Geometry> {
    let mut parts = Vec::new();
    collect_polygons(value, &mut parts)?;
    if parts.is_empty() {
        return Err(AtlasError::InvalidGeoJson(
            "no polygonal geometry found".into(),
        ));
    }
    if parts.len() == 1 {
        return Ok(MultiPolygon::new(parts));
    }
    // Separate features may overlap, so merge them properly
    Ok(union_all(parts.into_iter().map(|p| MultiPolygon::new(vec![p])))
        .unwrap_or_else(|| MultiPolygon::new(vec![])))
}

pub fn decode_str(text: &str) -> Result<Geometry> {
    let value: Value = serde_json::from_str(text)?;
    decode(&value)
}

fn collect_polygons(value: &Value, out: &mut Vec<Polygon<f64>>) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| AtlasError::InvalidGeoJson("expected a JSON object".into()))?;
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| AtlasError::InvalidGeoJson("missing \"type\" member".into()))?;

    match kind {
        "Polygon" => out.push(parse_polygon(coordinates(obj)?)?),
        "MultiPolygon" => {
            for polygon in as_array(coordinates(obj)?, "MultiPolygon coordinates")? {
                out.push(parse_polygon(polygon)?);
            }
        }
        "Feature" => match obj.get("geometry") {
            None | Some(Value::Null) => {}
            Some(geometry) => collect_polygons(geometry, out)?,
        },
        "FeatureCollection" => {
            let features = obj.get("features").ok_or_else(|| {
                AtlasError::InvalidGeoJson("FeatureCollection without \"features\"".into())
            })?;
            for feature in as_array(features, "features")? {
                collect_polygons(feature, out)?;
            }
        }
        "GeometryCollection" => {
            let geometries = obj.get("geometries").ok_or_else(|| {
                AtlasError::InvalidGeoJson("GeometryCollection without \"geometries\"".into())
            })?;
            for geometry in as_array(geometries, "geometries")? {
                collect_polygons(geometry, out)?;
            }
        }
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" => {}
        other => {
            return Err(AtlasError::InvalidGeoJson(format!(
                "unsupported GeoJSON type {other:?}"
            )))
        }
    }
    Ok(())
}

fn coordinates(obj: &Map<String, Value>) -> Result<&Value> {
    obj.get("coordinates")
        .ok_or_else(|| AtlasError::InvalidGeoJson("missing \"coordinates\" member".into()))
}

fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| AtlasError::InvalidGeoJson(format!("{what} must be an array")))
}

fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let mut rings = as_array(value, "polygon rings")?
        .iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| AtlasError::InvalidGeoJson("polygon without rings".into()))?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn parse_ring(value: &Value) -> Result<LineString<f64>> {
    let coords = as_array(value, "ring")?
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>>>()?;

    let errors = GeometricValidator::validate_ring(&coords);
    if !errors.is_empty() {
        return Err(errors.into());
    }
    Ok(LineString::from(coords))
}

fn parse_position(value: &Value) -> Result<(f64, f64)> {
    let position = as_array(value, "position")?;
    match (
        position.first().and_then(Value::as_f64),
        position.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(AtlasError::InvalidGeoJson(format!(
            "position must hold two numbers, got {value}"
        ))),
    }
}

/// Encode as a `Polygon` when there is one part, `MultiPolygon` otherwise
pub fn encode(geometry: &Geometry) -> Value {
    match geometry.0.as_slice() {
        [single] => json!({ "type": "Polygon", "coordinates": polygon_coordinates(single) }),
        parts => json!({
            "type": "MultiPolygon",
            "coordinates": parts.iter().map(polygon_coordinates).collect::<Vec<_>>(),
        }),
    }
}

fn polygon_coordinates(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|&Coord { x, y }| [x, y]).collect())
        .collect()
}

/// `serialize_with` helper writing an optional geometry as GeoJSON or `null`
pub fn serialize_optional<S: Serializer>(
    geometry: &Option<Geometry>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match geometry {
        Some(g) => serializer.serialize_some(&encode(g)),
        None => serializer.serialize_none(),
    }
}
