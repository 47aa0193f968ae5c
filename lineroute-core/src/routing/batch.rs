use geo::Point;
use rayon::prelude::*;

use super::orchestrator::RouteOrchestrator;
use super::route::{NoRoute, Route};

/// Routes many `(start, finish)` pairs in parallel over the orchestrator's
/// shared graph. Results keep the order of `queries`.
pub fn route_many(
    orchestrator: &RouteOrchestrator<'_>,
    queries: &[(Point<f64>, Point<f64>)],
) -> Vec<Result<Route, NoRoute>> {
    queries
        .par_iter()
        .map(|&(start, finish)| orchestrator.route(start, finish))
        .collect()
}
