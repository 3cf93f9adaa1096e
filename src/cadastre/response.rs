//! GeoJSON query responses from the ArcGIS map services.

use geo_types::{Coord, LineString, Polygon};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;
use crate::geometry::estimate_area_hectares;
use crate::models::{Attributes, ParcelRecord};

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
    /// ArcGIS reports query errors in the body with a 200 status
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Value,
    #[serde(default)]
    properties: Option<Attributes>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

impl FeatureCollection {
    pub fn from_slice(body: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }

    /// Turn the first feature into a record; any further features are ignored.
    pub fn into_first_parcel(self, identifier: &str) -> Result<ParcelRecord, FetchError> {
        if let Some(err) = self.error {
            return Err(FetchError::MalformedResponse(format!(
                "service error {}: {}",
                err.code.map_or_else(|| "?".to_string(), |c| c.to_string()),
                err.message
            )));
        }

        let feature = self
            .features
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound(identifier.to_string()))?;

        let (geometry, area_hectares) = polygon_from_geojson(&feature.geometry)?;
        Ok(ParcelRecord::with_area(
            geometry,
            feature.properties.unwrap_or_default(),
            area_hectares,
        ))
    }
}

/// Parse a GeoJSON `Polygon` and its area. For a `MultiPolygon` only the first
/// part is kept.
///
/// The area comes from the exterior ring exactly as sent, before
/// `Polygon::new` appends a closing point to unclosed rings.
fn polygon_from_geojson(geometry: &Value) -> Result<(Polygon<f64>, f64), FetchError> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::MalformedResponse("feature has no geometry".to_string()))?;
    let coordinates = geometry.get("coordinates").unwrap_or(&Value::Null);

    match kind {
        "Polygon" => polygon_from_rings(coordinates),
        "MultiPolygon" => {
            let parts = coordinates.as_array().ok_or_else(|| {
                FetchError::MalformedResponse("multipolygon coordinates are not an array".to_string())
            })?;
            if parts.len() > 1 {
                debug!("Keeping first of {} polygon parts", parts.len());
            }
            match parts.first() {
                Some(first) => polygon_from_rings(first),
                None => Ok((Polygon::new(LineString::new(vec![]), vec![]), 0.0)),
            }
        }
        other => Err(FetchError::MalformedResponse(format!(
            "unsupported geometry type {other}"
        ))),
    }
}

fn polygon_from_rings(rings: &Value) -> Result<(Polygon<f64>, f64), FetchError> {
    let rings = rings
        .as_array()
        .ok_or_else(|| FetchError::MalformedResponse("polygon rings are not an array".to_string()))?;

    let mut parsed = rings
        .iter()
        .map(ring_from_positions)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    let exterior = parsed.next().unwrap_or_else(|| LineString::new(vec![]));
    let area_hectares = estimate_area_hectares(&exterior);
    Ok((Polygon::new(exterior, parsed.collect()), area_hectares))
}

fn ring_from_positions(ring: &Value) -> Result<LineString<f64>, FetchError> {
    let positions = ring
        .as_array()
        .ok_or_else(|| FetchError::MalformedResponse("ring is not an array".to_string()))?;

    positions
        .iter()
        .map(|position| {
            let x = position.get(0).and_then(Value::as_f64);
            let y = position.get(1).and_then(Value::as_f64);
            match (x, y) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(FetchError::MalformedResponse(format!(
                    "invalid position {position}"
                ))),
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}
