//! Graph components - vertex keys, vertices and edges

use geo::{Coord, LineString, Point};
use serde::Serialize;

use crate::Meters;
use crate::geodesy::unit_vector;

/// Coordinate rounded to a fixed number of decimal digits.
///
/// Two coordinates sharing a key are the same vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CoordKey {
    lat: i64,
    lng: i64,
}

impl CoordKey {
    /// Rounds a `(lng, lat)` coordinate to `precision` decimal digits
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(coord: Coord<f64>, precision: u8) -> Self {
        let scale = scale(precision);
        Self {
            lat: (coord.y * scale).round() as i64,
            lng: (coord.x * scale).round() as i64,
        }
    }

    /// Canonical `(lng, lat)` position of the key
    #[allow(clippy::cast_precision_loss)]
    pub fn to_coord(self, precision: u8) -> Coord<f64> {
        let scale = scale(precision);
        Coord {
            x: self.lng as f64 / scale,
            y: self.lat as f64 / scale,
        }
    }
}

fn scale(precision: u8) -> f64 {
    10f64.powi(i32::from(precision))
}

/// Graph vertex: a line endpoint or an intersection
#[derive(Debug, Clone)]
pub struct Vertex {
    pub key: CoordKey,
    /// Canonical position, the rounded coordinate
    pub geometry: Point<f64>,
    pub(crate) unit: [f64; 3],
}

impl Vertex {
    pub(crate) fn new(key: CoordKey, precision: u8) -> Self {
        let geometry = Point::from(key.to_coord(precision));
        Self {
            key,
            geometry,
            unit: unit_vector(geometry),
        }
    }
}

/// Directed edge between two vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Accumulated haversine length of the geometry
    pub weight: Meters,
    /// Polyline from the source vertex to the target vertex
    pub geometry: LineString<f64>,
}

impl Edge {
    /// Mirror edge: same weight, reversed geometry
    pub(crate) fn mirrored(&self) -> Self {
        let mut coords = self.geometry.0.clone();
        coords.reverse();
        Self {
            weight: self.weight,
            geometry: LineString::new(coords),
        }
    }
}
