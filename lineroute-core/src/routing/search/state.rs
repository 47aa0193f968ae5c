use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;

use super::path::{GraphPath, Hop};
use super::stats::{SearchStats, TraversedEdges};
use crate::model::{RouteGraph, Vertex};
use crate::routing::Heuristic;
use crate::{EdgeId, Meters, VertexId};

/// Index into a frontier's node arena
pub(super) type Slot = u32;

const UNSEEN: Slot = Slot::MAX;

// Absolute slack for rounding in `h(u) <= w + h(v)`, plus a relative part
const VIOLATION_TOLERANCE: f64 = 1e-6;
const VIOLATION_RELATIVE: f64 = 1e-9;

#[derive(Debug, Copy, Clone)]
pub(super) struct State {
    pub(super) key: f64,
    pub(super) g: Meters,
    seq: u64,
    pub(super) slot: Slot,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by key, earlier insertion first on ties
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// Search label of one vertex
#[derive(Debug, Clone)]
pub(super) struct SearchNode {
    pub(super) vertex: VertexId,
    pub(super) g: Meters,
    /// Estimate towards the goal, computed once when first reached
    pub(super) h: Meters,
    pub(super) parent: Option<Slot>,
    pub(super) via: Option<EdgeId>,
}

/// Edge examined while expanding a settled vertex
#[derive(Debug, Clone, Copy)]
pub(super) struct Relaxation {
    pub(super) from: Slot,
    pub(super) edge: EdgeId,
    pub(super) to: VertexId,
    pub(super) weight: Meters,
    /// Cost of reaching `to` through `edge`
    pub(super) cost: Meters,
}

/// One growing search tree with its priority queue.
///
/// Improved labels are pushed again instead of decreasing keys in place;
/// outdated heap entries are skipped when popped.
pub(super) struct Frontier<'g> {
    graph: &'g RouteGraph,
    goal: &'g Vertex,
    heuristic: Heuristic,
    /// Multiplier of `h` in heap keys
    weight: f64,
    heap: BinaryHeap<State>,
    nodes: Vec<SearchNode>,
    slots: Vec<Slot>,
    closed: FixedBitSet,
    seq: u64,
    stats: SearchStats,
    traversed: TraversedEdges,
}

impl<'g> Frontier<'g> {
    /// Both ids must belong to `graph`
    pub(super) fn new(
        graph: &'g RouteGraph,
        source: VertexId,
        goal: VertexId,
        heuristic: Heuristic,
    ) -> Self {
        let vertex_count = graph.vertex_count();
        let mut frontier = Self {
            graph,
            goal: &graph.graph[goal],
            heuristic,
            weight: 1.0,
            heap: BinaryHeap::with_capacity(vertex_count.min(1024)),
            nodes: Vec::with_capacity(vertex_count.min(1024)),
            slots: vec![UNSEEN; vertex_count],
            closed: FixedBitSet::with_capacity(vertex_count),
            seq: 0,
            stats: SearchStats::default(),
            traversed: TraversedEdges::with_capacity(graph.edge_count()),
        };

        let slot = frontier.slot_or_insert(source);
        frontier.nodes[slot as usize].g = 0.0;
        frontier.push(slot);
        frontier
    }

    pub(super) fn slot_of(&self, vertex: VertexId) -> Option<Slot> {
        match self.slots.get(vertex.index()) {
            Some(&slot) if slot != UNSEEN => Some(slot),
            _ => None,
        }
    }

    pub(super) fn node(&self, slot: Slot) -> &SearchNode {
        &self.nodes[slot as usize]
    }

    pub(super) fn stats(&self) -> SearchStats {
        self.stats
    }

    pub(super) fn into_parts(self) -> (SearchStats, TraversedEdges) {
        (self.stats, self.traversed)
    }

    fn slot_or_insert(&mut self, vertex: VertexId) -> Slot {
        let existing = self.slots[vertex.index()];
        if existing != UNSEEN {
            return existing;
        }

        let slot = self.nodes.len() as Slot;
        let h = self.heuristic.estimate(&self.graph.graph[vertex], self.goal);
        self.nodes.push(SearchNode {
            vertex,
            g: f64::INFINITY,
            h,
            parent: None,
            via: None,
        });
        self.slots[vertex.index()] = slot;
        self.stats.unique_queued += 1;
        slot
    }

    fn push(&mut self, slot: Slot) {
        let node = &self.nodes[slot as usize];
        self.seq += 1;
        self.heap.push(State {
            key: node.g + self.weight * node.h,
            g: node.g,
            seq: self.seq,
            slot,
        });
        self.stats.max_frontier = self.stats.max_frontier.max(self.heap.len());
    }

    fn is_stale(&self, state: &State) -> bool {
        let node = &self.nodes[state.slot as usize];
        state.g > node.g || self.closed.contains(node.vertex.index())
    }

    /// Pops the best open vertex and closes it
    pub(super) fn settle(&mut self) -> Option<Slot> {
        while let Some(state) = self.heap.pop() {
            if self.is_stale(&state) {
                continue;
            }
            let vertex = self.nodes[state.slot as usize].vertex;
            self.closed.insert(vertex.index());
            self.stats.nodes_expanded += 1;
            return Some(state.slot);
        }
        None
    }

    /// Best open entry, dropping outdated ones from the top of the heap
    pub(super) fn peek(&mut self) -> Option<State> {
        while let Some(top) = self.heap.peek() {
            if self.is_stale(top) {
                self.heap.pop();
            } else {
                return Some(*top);
            }
        }
        None
    }

    /// Relaxes every outgoing edge of a settled vertex towards open
    /// neighbours, reporting each one to `on_edge` first
    pub(super) fn expand(&mut self, slot: Slot, mut on_edge: impl FnMut(Relaxation)) {
        let (vertex, g, h) = {
            let node = &self.nodes[slot as usize];
            (node.vertex, node.g, node.h)
        };
        let graph = self.graph;

        for (edge, target, data) in graph.edges(vertex) {
            if self.closed.contains(target.index()) {
                continue;
            }
            self.stats.edges_checked += 1;

            let cost = g + data.weight;
            on_edge(Relaxation {
                from: slot,
                edge,
                to: target,
                weight: data.weight,
                cost,
            });

            let next = self.slot_or_insert(target);
            let node = &mut self.nodes[next as usize];
            if self.heuristic.is_enabled()
                && h > data.weight + node.h + VIOLATION_TOLERANCE + h * VIOLATION_RELATIVE
            {
                self.stats.heuristic_violations += 1;
            }

            if cost < node.g {
                node.g = cost;
                node.parent = Some(slot);
                node.via = Some(edge);
                self.traversed.insert(edge);
                self.push(next);
            }
        }
    }

    /// Rebuilds the heap with `key = g + factor * h` for every open vertex
    pub(super) fn reweight(&mut self, factor: f64) {
        self.weight = factor;
        let entries = std::mem::take(&mut self.heap).into_vec();
        let open: Vec<Slot> = entries
            .into_iter()
            .filter(|state| !self.is_stale(state))
            .map(|state| state.slot)
            .collect();
        for slot in open {
            self.push(slot);
        }
    }

    /// Tree branch from `slot` up to the root, in that order
    fn branch(&self, slot: Slot) -> (Vec<VertexId>, Vec<EdgeId>) {
        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        let mut current = Some(slot);

        while let Some(slot) = current {
            let node = &self.nodes[slot as usize];
            vertices.push(node.vertex);
            if let Some(edge) = node.via {
                edges.push(edge);
            }
            current = node.parent;
        }
        (vertices, edges)
    }

    /// Path from the root to `slot`, walking edges as stored
    pub(super) fn path_from_root(&self, slot: Slot) -> GraphPath {
        let (mut vertices, mut edges) = self.branch(slot);
        vertices.reverse();
        edges.reverse();
        let hops = edges
            .into_iter()
            .map(|edge| Hop {
                edge,
                reversed: false,
            })
            .collect();
        GraphPath::new(vertices, hops, self.node(slot).g)
    }

    /// Path from `slot` back to the root, walking each tree edge against
    /// its stored direction
    pub(super) fn path_to_root(&self, slot: Slot) -> GraphPath {
        let (vertices, edges) = self.branch(slot);
        let hops = edges
            .into_iter()
            .map(|edge| Hop {
                edge,
                reversed: true,
            })
            .collect();
        GraphPath::new(vertices, hops, self.node(slot).g)
    }
}
