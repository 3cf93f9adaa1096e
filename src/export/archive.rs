//! Zipped GeoJSON bundle used in place of a real shapefile.

use std::io::{Cursor, Write};

use geo_types::Polygon;
use serde_json::{json, Value};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExportError;
use crate::models::ParcelSet;

pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";
pub const GEOJSON_ENTRY: &str = "parcels.geojson";
pub const README_ENTRY: &str = "README.txt";

const README: &str = "This archive contains parcel data exported by parcelkit.

The data is provided in GeoJSON format (parcels.geojson), which can be imported into most GIS applications.

No true Shapefile was produced. For Shapefile format, convert the GeoJSON file with a GIS application such as QGIS or ogr2ogr.";

/// Flattened FeatureCollection: identifier, lot type and area per parcel.
pub fn feature_collection(parcels: &ParcelSet) -> Value {
    let features: Vec<Value> = parcels
        .iter()
        .map(|(identifier, parcel)| {
            json!({
                "type": "Feature",
                "properties": {
                    "LOTPLAN": identifier,
                    "LOTTYPE": parcel.lot_type(),
                    "AREA_HA": parcel.area_hectares,
                },
                "geometry": polygon_to_geojson(&parcel.geometry),
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Zip the feature collection and the README. Always exactly two entries.
pub fn build_archive(parcels: &ParcelSet) -> Result<Vec<u8>, ExportError> {
    let geojson = serde_json::to_string_pretty(&feature_collection(parcels))?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(GEOJSON_ENTRY, options)?;
    zip.write_all(geojson.as_bytes())?;

    zip.start_file(README_ENTRY, options)?;
    zip.write_all(README.as_bytes())?;

    Ok(zip.finish()?.into_inner())
}

fn polygon_to_geojson(polygon: &Polygon<f64>) -> Value {
    let ring = |ring: &geo_types::LineString<f64>| -> Vec<[f64; 2]> {
        ring.coords().map(|c| [c.x, c.y]).collect()
    };
    let rings: Vec<Vec<[f64; 2]>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring)
        .collect();

    json!({
        "type": "Polygon",
        "coordinates": rings,
    })
}
