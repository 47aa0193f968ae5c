//! GeoJSON ingestion of line features

use geo::{Geometry as GeoGeometry, LineString};
use geojson::{GeoJson, Geometry};
use log::debug;

use crate::Error;

/// Parses GeoJSON text and extracts its `LineString` geometries
///
/// # Errors
///
/// Returns an error if the text is not valid GeoJSON
pub fn lines_from_geojson_str(input: &str) -> Result<Vec<LineString<f64>>, Error> {
    let geojson: GeoJson = input.parse()?;
    lines_from_geojson(geojson)
}

/// Extracts `LineString` geometries from a feature collection, a single
/// feature or a bare geometry. Other geometry types and empty lines are
/// skipped.
///
/// # Errors
///
/// Returns an error if a geometry cannot be converted
pub fn lines_from_geojson(geojson: GeoJson) -> Result<Vec<LineString<f64>>, Error> {
    let geometries: Vec<Option<Geometry>> = match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .map(|feature| feature.geometry)
            .collect(),
        GeoJson::Feature(feature) => vec![feature.geometry],
        GeoJson::Geometry(geometry) => vec![Some(geometry)],
    };

    let mut lines = Vec::with_capacity(geometries.len());
    let mut skipped = 0usize;
    for (idx, geometry) in geometries.into_iter().enumerate() {
        let Some(geometry) = geometry else {
            skipped += 1;
            continue;
        };
        match GeoGeometry::<f64>::try_from(geometry)? {
            GeoGeometry::LineString(line) if !line.0.is_empty() => lines.push(line),
            _ => {
                debug!("Skipping feature {idx}: not a non-empty LineString");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {skipped} features without usable line geometry");
    }

    Ok(lines)
}
