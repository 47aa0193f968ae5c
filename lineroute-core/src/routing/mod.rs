//! Node location, best-first searches and the orchestrator that
//! cross-validates them.

pub mod batch;
pub mod heuristic;
pub mod locate;
pub mod orchestrator;
pub mod route;
pub mod search;
pub mod strategy;
mod to_geojson;

pub use batch::route_many;
pub use heuristic::Heuristic;
pub use locate::{ExclusionSet, Located, Snap, locate_endpoints};
pub use orchestrator::RouteOrchestrator;
pub use route::{AlternativePath, IntegrityWarning, NoRoute, Route, StrategyReport};
pub use search::{
    BidirectionalOptions, BidirectionalOutcome, GraphPath, Hop, SearchBudget, SearchOutcome,
    SearchStats, TraversedEdges, bidirectional_path_search, bidirectional_path_search_with_budget,
    path_search, path_search_with_budget,
};
pub use strategy::{Implicated, Strategy, StrategyOutcome};
