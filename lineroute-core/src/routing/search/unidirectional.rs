use std::time::Instant;

use log::debug;

use super::budget::SearchBudget;
use super::path::GraphPath;
use super::state::Frontier;
use super::stats::{SearchStats, TraversedEdges};
use crate::VertexId;
use crate::model::RouteGraph;
use crate::routing::Heuristic;

/// Result of a single-tree search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Absent when the destination is unreachable, the ids are unknown,
    /// or the search was interrupted
    pub path: Option<GraphPath>,
    pub stats: SearchStats,
    pub traversed: TraversedEdges,
    pub interrupted: bool,
}

impl SearchOutcome {
    fn empty() -> Self {
        Self {
            path: None,
            stats: SearchStats::default(),
            traversed: TraversedEdges::default(),
            interrupted: false,
        }
    }
}

/// Shortest path from `src` to `dst`.
///
/// With [`Heuristic::None`] this is Dijkstra's algorithm, otherwise A*.
pub fn path_search(
    graph: &RouteGraph,
    src: VertexId,
    dst: VertexId,
    heuristic: Heuristic,
) -> SearchOutcome {
    path_search_with_budget(graph, src, dst, heuristic, &SearchBudget::unlimited())
}

/// [`path_search`] that gives up once `budget` runs out
pub fn path_search_with_budget(
    graph: &RouteGraph,
    src: VertexId,
    dst: VertexId,
    heuristic: Heuristic,
    budget: &SearchBudget,
) -> SearchOutcome {
    if !graph.contains_vertex(src) || !graph.contains_vertex(dst) {
        debug!(
            "Search endpoints {} -> {} are not in the graph",
            src.index(),
            dst.index()
        );
        return SearchOutcome::empty();
    }

    let started = Instant::now();
    let mut frontier = Frontier::new(graph, src, dst, heuristic);
    let mut path = None;
    let mut interrupted = false;
    let mut iteration = 0;

    loop {
        if budget.interrupted(iteration) {
            interrupted = true;
            break;
        }
        iteration += 1;

        let Some(slot) = frontier.settle() else {
            break;
        };
        if frontier.node(slot).vertex == dst {
            path = Some(frontier.path_from_root(slot));
            break;
        }
        frontier.expand(slot, |_| {});
    }

    let (mut stats, traversed) = frontier.into_parts();
    stats.elapsed = started.elapsed();

    debug!(
        "{:?} search {} -> {}: found={}, interrupted={}, expanded={}, checked={}, queued={}",
        heuristic,
        src.index(),
        dst.index(),
        path.is_some(),
        interrupted,
        stats.nodes_expanded,
        stats.edges_checked,
        stats.unique_queued
    );

    SearchOutcome {
        path,
        stats,
        traversed,
        interrupted,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use geo::{coord, line_string};

    use super::*;
    use crate::config::GraphConfig;
    use crate::loading::build_graph;

    // Square with a long detour on top and a short bottom road
    fn square() -> RouteGraph {
        build_graph(
            &[
                line_string![(x: 30.0, y: 50.0), (x: 30.0, y: 50.01), (x: 30.01, y: 50.01), (x: 30.01, y: 50.0)],
                line_string![(x: 30.0, y: 50.0), (x: 30.005, y: 50.0), (x: 30.01, y: 50.0)],
            ],
            &GraphConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn takes_the_short_road() {
        let graph = square();
        let a = graph.vertex_at(coord! { x: 30.0, y: 50.0 }).unwrap();
        let b = graph.vertex_at(coord! { x: 30.01, y: 50.0 }).unwrap();

        for heuristic in [Heuristic::None, Heuristic::EuclideanApprox, Heuristic::Haversine] {
            let outcome = path_search(&graph, a, b, heuristic);
            let path = outcome.path.unwrap();
            assert_eq!(path.hops.len(), 1);
            assert!((path.cost - 715.0).abs() < 5.0, "{}", path.cost);
            assert!(!outcome.interrupted);
            assert!(outcome.traversed.contains(path.hops[0].edge));
        }
    }

    #[test]
    fn same_endpoint_is_an_empty_path() {
        let graph = square();
        let a = graph.vertex_at(coord! { x: 30.0, y: 50.0 }).unwrap();
        let path = path_search(&graph, a, a, Heuristic::None).path.unwrap();
        assert!(path.hops.is_empty());
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn unknown_vertex_is_not_found() {
        let graph = square();
        let a = graph.vertex_at(coord! { x: 30.0, y: 50.0 }).unwrap();
        let outcome = path_search(&graph, a, VertexId::new(500), Heuristic::None);
        assert!(outcome.path.is_none());
        assert_eq!(outcome.stats.nodes_expanded, 0);
    }

    #[test]
    fn cancelled_budget_interrupts() {
        let graph = square();
        let a = graph.vertex_at(coord! { x: 30.0, y: 50.0 }).unwrap();
        let b = graph.vertex_at(coord! { x: 30.01, y: 50.0 }).unwrap();
        let budget = SearchBudget::unlimited().cancel_on(Arc::new(AtomicBool::new(true)));

        let outcome = path_search_with_budget(&graph, a, b, Heuristic::None, &budget);
        assert!(outcome.interrupted);
        assert!(outcome.path.is_none());
    }
}
