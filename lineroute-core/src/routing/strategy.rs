//! The search strategies run by the orchestrator and their failure diagnosis

use std::fmt;

use serde::{Deserialize, Serialize};

use super::heuristic::Heuristic;
use super::search::{
    BidirectionalOptions, GraphPath, SearchBudget, SearchStats, TraversedEdges,
    bidirectional_path_search_with_budget, path_search_with_budget,
};
use crate::VertexId;
use crate::config::RoutingConfig;
use crate::model::RouteGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    DijkstraDirect,
    /// Searches finish to start, surfacing asymmetric graph data
    DijkstraReverse,
    DijkstraBidirectional,
    AStarDirect,
    AStarReverse,
    AStarBidirectional,
}

impl Strategy {
    /// Default battery order
    pub const ALL: [Strategy; 6] = [
        Strategy::DijkstraDirect,
        Strategy::DijkstraReverse,
        Strategy::DijkstraBidirectional,
        Strategy::AStarDirect,
        Strategy::AStarReverse,
        Strategy::AStarBidirectional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::DijkstraDirect => "dijkstra_direct",
            Strategy::DijkstraReverse => "dijkstra_reverse",
            Strategy::DijkstraBidirectional => "dijkstra_bidirectional",
            Strategy::AStarDirect => "a_star_direct",
            Strategy::AStarReverse => "a_star_reverse",
            Strategy::AStarBidirectional => "a_star_bidirectional",
        }
    }

    pub fn is_bidirectional(self) -> bool {
        matches!(
            self,
            Strategy::DijkstraBidirectional | Strategy::AStarBidirectional
        )
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Strategy::DijkstraReverse | Strategy::AStarReverse)
    }

    pub fn heuristic(self, config: &RoutingConfig) -> Heuristic {
        match self {
            Strategy::DijkstraDirect
            | Strategy::DijkstraReverse
            | Strategy::DijkstraBidirectional => Heuristic::None,
            Strategy::AStarDirect | Strategy::AStarReverse | Strategy::AStarBidirectional => {
                config.heuristic
            }
        }
    }

    /// Runs the strategy between two vertices. The returned path always
    /// leads from `start` to `finish`.
    pub fn run(
        self,
        graph: &RouteGraph,
        start: VertexId,
        finish: VertexId,
        config: &RoutingConfig,
        budget: &SearchBudget,
    ) -> StrategyOutcome {
        let heuristic = self.heuristic(config);

        if self.is_bidirectional() {
            let options = BidirectionalOptions {
                heuristic,
                meet_rule: config.meet_rule,
                dampening: config.heuristic_dampening,
            };
            let outcome =
                bidirectional_path_search_with_budget(graph, start, finish, &options, budget);
            return StrategyOutcome {
                strategy: self,
                path: outcome.path,
                alternative: outcome.alternative,
                stats: outcome.stats,
                traversed: outcome.traversed,
                failed_at_start: outcome.failed_at_start,
                failed_at_finish: outcome.failed_at_finish,
                interrupted: outcome.interrupted,
            };
        }

        let (src, dst) = if self.is_reverse() {
            (finish, start)
        } else {
            (start, finish)
        };
        let outcome = path_search_with_budget(graph, src, dst, heuristic, budget);
        let path = if self.is_reverse() {
            outcome.path.map(|path| path.reversed())
        } else {
            outcome.path
        };

        StrategyOutcome {
            strategy: self,
            path,
            alternative: None,
            stats: outcome.stats,
            traversed: outcome.traversed,
            failed_at_start: false,
            failed_at_finish: false,
            interrupted: outcome.interrupted,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint blamed for a failed search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Implicated {
    Start,
    Finish,
    Both,
}

impl Implicated {
    fn opposite(self) -> Self {
        match self {
            Implicated::Start => Implicated::Finish,
            Implicated::Finish => Implicated::Start,
            Implicated::Both => Implicated::Both,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    /// Start to finish, whatever direction the search ran
    pub path: Option<GraphPath>,
    pub alternative: Option<GraphPath>,
    pub stats: SearchStats,
    pub traversed: TraversedEdges,
    /// Only reported by bidirectional strategies
    pub failed_at_start: bool,
    /// Only reported by bidirectional strategies
    pub failed_at_finish: bool,
    pub interrupted: bool,
}

impl StrategyOutcome {
    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// Which endpoint most likely sits in a small disconnected piece of
    /// the graph.
    ///
    /// A one-sided search that queued only a small share of the graph was
    /// trapped around its own source; one that queued most of it could not
    /// find the target. Bidirectional searches report the starved side
    /// directly.
    pub fn diagnose(&self, vertex_count: usize, starvation_ratio: f64) -> Option<Implicated> {
        if self.path.is_some() || self.interrupted {
            return None;
        }

        if self.strategy.is_bidirectional() {
            return Some(match (self.failed_at_start, self.failed_at_finish) {
                (true, false) => Implicated::Start,
                (false, true) => Implicated::Finish,
                _ => Implicated::Both,
            });
        }

        let searched_from = if self.strategy.is_reverse() {
            Implicated::Finish
        } else {
            Implicated::Start
        };
        #[allow(clippy::cast_precision_loss)]
        let starved = (self.stats.unique_queued as f64) < starvation_ratio * vertex_count as f64;
        Some(if starved {
            searched_from
        } else {
            searched_from.opposite()
        })
    }
}
