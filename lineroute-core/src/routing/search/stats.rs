use std::time::Duration;

use fixedbitset::FixedBitSet;
use petgraph::graph::EdgeIndex;
use serde::{Serialize, Serializer};

use crate::EdgeId;

/// Counters collected by one search, returned by value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SearchStats {
    /// Vertices popped and closed
    pub nodes_expanded: usize,
    /// Edges examined towards non-closed neighbours
    pub edges_checked: usize,
    /// Distinct vertices ever put on a frontier
    pub unique_queued: usize,
    /// Largest frontier size observed, summed over frontiers
    pub max_frontier: usize,
    /// Edges where the cached estimates broke `h(u) <= w(u, v) + h(v)`
    pub heuristic_violations: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl SearchStats {
    /// Folds another search's counters into this one
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes_expanded += other.nodes_expanded;
        self.edges_checked += other.edges_checked;
        self.unique_queued += other.unique_queued;
        self.max_frontier = self.max_frontier.max(other.max_frontier);
        self.heuristic_violations += other.heuristic_violations;
        self.elapsed += other.elapsed;
    }

    /// Counters of two frontiers searched side by side
    pub(crate) fn combined(forward: &SearchStats, backward: &SearchStats) -> Self {
        Self {
            nodes_expanded: forward.nodes_expanded + backward.nodes_expanded,
            edges_checked: forward.edges_checked + backward.edges_checked,
            unique_queued: forward.unique_queued + backward.unique_queued,
            max_frontier: forward.max_frontier + backward.max_frontier,
            heuristic_violations: forward.heuristic_violations + backward.heuristic_violations,
            elapsed: forward.elapsed.max(backward.elapsed),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

/// Edges whose relaxation improved a label during a query.
///
/// Kept per query instead of flagging edges of the shared graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversedEdges(FixedBitSet);

impl TraversedEdges {
    pub(crate) fn with_capacity(edges: usize) -> Self {
        Self(FixedBitSet::with_capacity(edges))
    }

    pub(crate) fn insert(&mut self, edge: EdgeId) {
        self.0.grow(edge.index() + 1);
        self.0.insert(edge.index());
    }

    pub(crate) fn union_with(&mut self, other: &TraversedEdges) {
        self.0.union_with(&other.0);
    }

    pub fn contains(&self, edge: EdgeId) -> bool {
        self.0.contains(edge.index())
    }

    pub fn len(&self) -> usize {
        self.0.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.0.ones().map(EdgeIndex::new)
    }
}
