//! Immutable routing graph shared by every query

use geo::{Coord, LineString, Point};
use hashbrown::HashMap;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use serde::Serialize;

use super::components::{CoordKey, Edge, Vertex};
use crate::{EdgeId, Meters, VertexId};

/// Weighted graph built from line features.
///
/// Logically undirected: every edge is stored together with a mirror edge
/// of identical weight and reversed geometry. Never mutated after
/// construction, so it can be shared by concurrent queries.
#[derive(Debug, Clone)]
pub struct RouteGraph {
    pub(crate) graph: DiGraph<Vertex, Edge>,
    index: HashMap<CoordKey, VertexId>,
    precision: u8,
}

/// Size overview of a graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphSummary {
    pub vertices: usize,
    /// Directed edges, mirrors included
    pub edges: usize,
    /// Length of the underlying network, each mirror pair counted once
    pub total_length_m: Meters,
}

impl RouteGraph {
    pub(crate) fn with_capacity(precision: u8, vertices: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(vertices, edges),
            index: HashMap::with_capacity(vertices),
            precision,
        }
    }

    pub(crate) fn add_vertex(&mut self, key: CoordKey) -> VertexId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.graph.add_node(Vertex::new(key, self.precision));
        self.index.insert(key, id);
        id
    }

    /// Adds `from -> to` and its mirror, returns both ids
    pub(crate) fn add_segment(
        &mut self,
        from: VertexId,
        to: VertexId,
        weight: Meters,
        geometry: LineString<f64>,
    ) -> (EdgeId, EdgeId) {
        let edge = Edge { weight, geometry };
        let mirror = edge.mirrored();
        let forward = self.graph.add_edge(from, to, edge);
        let backward = self.graph.add_edge(to, from, mirror);
        (forward, backward)
    }

    /// Decimal digits used for vertex keys
    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn has_edges(&self) -> bool {
        self.graph.edge_count() > 0
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        id.index() < self.graph.node_count()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.graph.node_weight(id)
    }

    /// Vertex sharing the rounded key of `coord`
    pub fn vertex_at(&self, coord: Coord<f64>) -> Option<VertexId> {
        self.index
            .get(&CoordKey::new(coord, self.precision))
            .copied()
    }

    pub fn vertex_point(&self, id: VertexId) -> Option<Point<f64>> {
        self.vertex(id).map(|vertex| vertex.geometry)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.graph
            .node_indices()
            .map(move |id| (id, &self.graph[id]))
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.graph.edge_weight(id)
    }

    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(VertexId, VertexId)> {
        self.graph.edge_endpoints(id)
    }

    /// Outgoing edges of a vertex as `(edge, target, data)`
    pub fn edges(&self, id: VertexId) -> impl Iterator<Item = (EdgeId, VertexId, &Edge)> + '_ {
        self.graph
            .edges(id)
            .map(|edge| (edge.id(), edge.target(), edge.weight()))
    }

    pub fn degree(&self, id: VertexId) -> usize {
        self.graph.edges(id).count()
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            vertices: self.vertex_count(),
            edges: self.edge_count(),
            total_length_m: self.graph.edge_weights().map(|e| e.weight).sum::<f64>() / 2.0,
        }
    }

    /// Checks that every edge has a mirror with equal weight and reversed geometry
    pub fn is_symmetric(&self) -> bool {
        self.graph.edge_references().all(|edge| {
            let reversed: Vec<Coord<f64>> = edge.weight().geometry.0.iter().rev().copied().collect();
            self.graph
                .edges_connecting(edge.target(), edge.source())
                .any(|mirror| {
                    mirror.weight().weight == edge.weight().weight
                        && mirror.weight().geometry.0 == reversed
                })
        })
    }
}
