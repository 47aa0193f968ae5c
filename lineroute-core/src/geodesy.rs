//! Distance helpers shared by graph construction, snapping and heuristics

use geo::{Distance, Haversine, LineString, Point};

use crate::Meters;

/// Mean earth radius in meters, the radius `geo`'s haversine works with
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two `(lng, lat)` points
#[inline]
pub fn haversine(a: Point<f64>, b: Point<f64>) -> Meters {
    Haversine.distance(a, b)
}

/// Unit vector of a `(lng, lat)` point on the sphere
pub fn unit_vector(point: Point<f64>) -> [f64; 3] {
    let lat = point.y().to_radians();
    let lng = point.x().to_radians();
    [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
}

/// Straight-line distance through the sphere between two unit vectors.
///
/// Never exceeds the great-circle distance between the same points.
#[inline]
pub fn chord(a: &[f64; 3], b: &[f64; 3]) -> Meters {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt() * EARTH_RADIUS_M
}

/// Finite `(lng, lat)` inside the valid longitude and latitude ranges
pub fn is_valid_lng_lat(point: Point<f64>) -> bool {
    point.x().is_finite()
        && point.y().is_finite()
        && (-180.0..=180.0).contains(&point.x())
        && (-90.0..=90.0).contains(&point.y())
}

/// Haversine length of a polyline
pub fn line_length(line: &LineString<f64>) -> Meters {
    line.points()
        .zip(line.points().skip(1))
        .map(|(a, b)| haversine(a, b))
        .sum()
}
