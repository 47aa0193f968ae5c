//! Shared graph fixtures for integration tests.
//!
//! All fixtures are deterministic: the pseudo-random graphs come from a
//! fixed-seed linear congruential generator.

use geo::{LineString, coord};
use hashbrown::HashSet;
use lineroute_core::{GraphConfig, RouteGraph, VertexId, build_graph};
use petgraph::graph::{DiGraph, NodeIndex};

#[allow(dead_code)]
pub const ORIGIN_X: f64 = 30.0;
#[allow(dead_code)]
pub const ORIGIN_Y: f64 = 50.0;

/// Builds a graph with the default configuration.
#[allow(dead_code)]
pub fn build(lines: &[LineString<f64>]) -> RouteGraph {
    build_graph(lines, &GraphConfig::default()).expect("fixture lines are valid")
}

/// Looks up the vertex at a coordinate.
#[allow(dead_code)]
pub fn vertex(graph: &RouteGraph, x: f64, y: f64) -> VertexId {
    graph
        .vertex_at(coord! { x: x, y: y })
        .expect("fixture vertex exists")
}

/// `n` by `n` street grid with `step` degrees between intersections.
#[allow(dead_code)]
pub fn grid_lines(n: usize, step: f64) -> Vec<LineString<f64>> {
    let mut lines = Vec::with_capacity(n * 2);
    for i in 0..n {
        let offset = i as f64 * step;
        let row: Vec<(f64, f64)> = (0..n)
            .map(|j| (ORIGIN_X + j as f64 * step, ORIGIN_Y + offset))
            .collect();
        let column: Vec<(f64, f64)> = (0..n)
            .map(|j| (ORIGIN_X + offset, ORIGIN_Y + j as f64 * step))
            .collect();
        lines.push(LineString::from(row));
        lines.push(LineString::from(column));
    }
    lines
}

/// Two short roads about 70 km apart.
///
/// The western one has two vertices, the eastern one three.
#[allow(dead_code)]
pub fn two_islands() -> RouteGraph {
    build(&[
        LineString::from(vec![(30.0, 50.0), (30.001, 50.0)]),
        LineString::from(vec![(31.0, 50.0), (31.001, 50.0), (31.002, 50.0)]),
        LineString::from(vec![(31.002, 50.0), (31.003, 50.0)]),
    ])
}

/// Minimal LCG, enough to scatter fixture geometry reproducibly.
#[allow(dead_code)]
pub struct Lcg(u64);

#[allow(dead_code)]
impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed ^ 0x5DEE_CE66_D)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) as u32
    }

    pub fn below(&mut self, bound: usize) -> usize {
        self.next_u32() as usize % bound
    }

    /// Uniform in `[0, 1)`
    pub fn unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX)
    }
}

/// Connected pseudo-random road network.
///
/// Vertices sit on a jittered lattice; a random spanning tree keeps the
/// graph connected and `extra` chords add cycles. Some roads bend through
/// an interior point so weights are not straight-line distances.
#[allow(dead_code)]
pub fn random_lines(seed: u64, vertices: usize, extra: usize) -> Vec<LineString<f64>> {
    let mut rng = Lcg::new(seed);
    let columns = (vertices as f64).sqrt().ceil() as usize;
    let positions: Vec<(f64, f64)> = (0..vertices)
        .map(|k| {
            let x = ORIGIN_X + (k % columns) as f64 * 0.004 + rng.unit() * 0.0015;
            let y = ORIGIN_Y + (k / columns) as f64 * 0.004 + rng.unit() * 0.0015;
            (x, y)
        })
        .collect();

    let mut pairs: HashSet<(usize, usize)> = HashSet::new();
    let mut lines = Vec::new();
    let mut connect = |a: usize, b: usize, rng: &mut Lcg, lines: &mut Vec<LineString<f64>>| {
        let key = (a.min(b), a.max(b));
        if a == b || !pairs.insert(key) {
            return;
        }
        let (ax, ay) = positions[a];
        let (bx, by) = positions[b];
        let mut coords = vec![(ax, ay)];
        if rng.below(3) == 0 {
            let bend = (rng.unit() - 0.5) * 0.002;
            coords.push(((ax + bx) / 2.0 + bend, (ay + by) / 2.0 - bend));
        }
        coords.push((bx, by));
        lines.push(LineString::from(coords));
    };

    for k in 1..vertices {
        let parent = rng.below(k);
        connect(parent, k, &mut rng, &mut lines);
    }
    for _ in 0..extra {
        let a = rng.below(vertices);
        let b = rng.below(vertices);
        connect(a, b, &mut rng, &mut lines);
    }
    lines
}

/// Copy of the graph as a plain petgraph graph with `f64` weights, for
/// reference algorithms.
#[allow(dead_code)]
pub fn to_petgraph(graph: &RouteGraph) -> DiGraph<(), f64> {
    let mut reference = DiGraph::with_capacity(graph.vertex_count(), graph.edge_count());
    for _ in 0..graph.vertex_count() {
        reference.add_node(());
    }
    for (id, _) in graph.vertices() {
        for (_, target, edge) in graph.edges(id) {
            reference.add_edge(
                NodeIndex::new(id.index()),
                NodeIndex::new(target.index()),
                edge.weight,
            );
        }
    }
    reference
}

/// Shortest distance by enumerating every simple path. Small graphs only.
#[allow(dead_code)]
pub fn brute_force_distance(graph: &RouteGraph, src: VertexId, dst: VertexId) -> Option<f64> {
    fn walk(
        graph: &RouteGraph,
        at: VertexId,
        dst: VertexId,
        cost: f64,
        visited: &mut Vec<bool>,
        best: &mut Option<f64>,
    ) {
        if at == dst {
            if best.is_none_or(|b| cost < b) {
                *best = Some(cost);
            }
            return;
        }
        for (_, next, edge) in graph.edges(at) {
            if visited[next.index()] {
                continue;
            }
            visited[next.index()] = true;
            walk(graph, next, dst, cost + edge.weight, visited, best);
            visited[next.index()] = false;
        }
    }

    let mut visited = vec![false; graph.vertex_count()];
    visited[src.index()] = true;
    let mut best = None;
    walk(graph, src, dst, 0.0, &mut visited, &mut best);
    best
}
