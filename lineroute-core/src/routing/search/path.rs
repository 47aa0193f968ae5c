use geo::{Coord, LineString};
use itertools::Itertools;
use serde::Serialize;

use crate::model::RouteGraph;
use crate::{EdgeId, Meters, VertexId};

/// One step of a path: an edge, possibly walked against its stored direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub edge: EdgeId,
    pub reversed: bool,
}

/// Vertex sequence found by a search, with the edges between them
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    pub vertices: Vec<VertexId>,
    pub hops: Vec<Hop>,
    /// Sum of hop weights in meters
    pub cost: Meters,
}

impl GraphPath {
    pub(crate) fn new(vertices: Vec<VertexId>, hops: Vec<Hop>, cost: Meters) -> Self {
        debug_assert_eq!(vertices.len(), hops.len() + 1);
        Self {
            vertices,
            hops,
            cost,
        }
    }

    pub fn source(&self) -> VertexId {
        self.vertices[0]
    }

    pub fn target(&self) -> VertexId {
        self.vertices[self.vertices.len() - 1]
    }

    /// Reported route distance, rounded to the meter
    pub fn distance(&self) -> Meters {
        self.cost.round()
    }

    /// No vertex is visited twice
    pub fn is_simple(&self) -> bool {
        self.vertices.iter().all_unique()
    }

    /// Same path walked from target to source
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            vertices: self.vertices.iter().rev().copied().collect(),
            hops: self
                .hops
                .iter()
                .rev()
                .map(|hop| Hop {
                    edge: hop.edge,
                    reversed: !hop.reversed,
                })
                .collect(),
            cost: self.cost,
        }
    }

    /// Appends `other`, which must start where `self` ends
    pub(crate) fn join(mut self, other: GraphPath) -> Self {
        debug_assert_eq!(self.target(), other.source());
        self.vertices.extend(other.vertices.into_iter().skip(1));
        self.hops.extend(other.hops);
        self.cost += other.cost;
        self
    }

    /// Sum of edge weights looked up in the graph
    pub fn hop_weight_sum(&self, graph: &RouteGraph) -> Meters {
        self.hops
            .iter()
            .filter_map(|hop| graph.edge(hop.edge))
            .map(|edge| edge.weight)
            .sum()
    }

    /// Concatenated hop geometry in travel order
    pub fn geometry(&self, graph: &RouteGraph) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = Vec::new();

        if self.hops.is_empty() {
            if let Some(point) = graph.vertex_point(self.source()) {
                coords.push(point.into());
            }
            return LineString::new(coords);
        }

        for hop in &self.hops {
            let Some(edge) = graph.edge(hop.edge) else {
                continue;
            };
            let hop_coords: Box<dyn Iterator<Item = &Coord<f64>>> = if hop.reversed {
                Box::new(edge.geometry.0.iter().rev())
            } else {
                Box::new(edge.geometry.0.iter())
            };
            for coord in hop_coords {
                if coords.last() != Some(coord) {
                    coords.push(*coord);
                }
            }
        }

        LineString::new(coords)
    }
}
