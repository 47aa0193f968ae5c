use serde::{Deserialize, Serialize};

use crate::Meters;
use crate::geodesy::{chord, haversine};
use crate::model::Vertex;

/// Remaining-distance estimate used to order A* frontiers.
///
/// Edge endpoints sit exactly on vertex positions and edge weights are
/// polyline lengths, so both straight-line estimates are lower bounds of the
/// remaining network distance and consistent along every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// No estimate, plain Dijkstra ordering
    None,
    /// Chord through the sphere between precomputed unit vectors
    #[default]
    EuclideanApprox,
    /// Great-circle distance
    Haversine,
}

impl Heuristic {
    pub fn is_enabled(self) -> bool {
        !matches!(self, Heuristic::None)
    }

    pub fn estimate(self, from: &Vertex, to: &Vertex) -> Meters {
        match self {
            Heuristic::None => 0.0,
            Heuristic::EuclideanApprox => chord(&from.unit, &to.unit),
            Heuristic::Haversine => haversine(from.geometry, to.geometry),
        }
    }
}
