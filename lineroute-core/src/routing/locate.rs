//! Query point to vertex resolution

use geo::Point;
use hashbrown::HashSet;
use serde::Serialize;

use crate::geodesy::{haversine, is_valid_lng_lat};
use crate::model::RouteGraph;
use crate::{Meters, VertexId};

/// Vertices a query must not snap to, grown by the orchestrator's retries
pub type ExclusionSet = HashSet<VertexId>;

/// Vertex chosen for a query point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snap {
    pub vertex: VertexId,
    /// Great-circle distance from the query point to the vertex
    pub distance: Meters,
}

/// Resolved endpoints; either side may be absent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Located {
    pub start: Option<Snap>,
    pub finish: Option<Snap>,
}

impl Located {
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.finish.is_some()
    }
}

/// Nearest eligible vertex for both query points in a single pass.
///
/// A vertex is eligible when it has at least one edge, is not in `avoid`
/// and, if `max_distance` is set, lies within that many meters of the point.
/// Sides are resolved independently and an unresolved side is `None`, as
/// is a side whose point is not a valid `(lng, lat)`.
pub fn locate_endpoints(
    graph: &RouteGraph,
    start: Point<f64>,
    finish: Point<f64>,
    avoid: &ExclusionSet,
    max_distance: Option<Meters>,
) -> Located {
    let limit = max_distance.unwrap_or(f64::INFINITY);
    let (start_valid, finish_valid) = (is_valid_lng_lat(start), is_valid_lng_lat(finish));
    let mut located = Located::default();
    if !start_valid && !finish_valid {
        return located;
    }

    for (id, vertex) in graph.vertices() {
        if avoid.contains(&id) || graph.degree(id) == 0 {
            continue;
        }
        if start_valid {
            consider(&mut located.start, id, haversine(start, vertex.geometry), limit);
        }
        if finish_valid {
            consider(&mut located.finish, id, haversine(finish, vertex.geometry), limit);
        }
    }

    located
}

// Earlier vertices win ties
fn consider(best: &mut Option<Snap>, vertex: VertexId, distance: Meters, limit: Meters) {
    // NaN distances compare false both ways and must not slip through
    if distance.is_nan() || distance > limit {
        return;
    }
    if best.is_none_or(|snap| distance < snap.distance) {
        *best = Some(Snap { vertex, distance });
    }
}
