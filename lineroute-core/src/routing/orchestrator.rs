//! Strategy battery with cross-validation and exclusion retries

use geo::Point;
use log::{debug, trace, warn};

use super::locate::{ExclusionSet, Located, Snap, locate_endpoints};
use super::route::{AlternativePath, IntegrityWarning, NoRoute, Route, StrategyReport};
use super::search::{GraphPath, SearchBudget, SearchStats, TraversedEdges};
use super::strategy::{Implicated, Strategy, StrategyOutcome};
use crate::config::RoutingConfig;
use crate::geodesy::is_valid_lng_lat;
use crate::model::RouteGraph;
use crate::{Error, RouteError, VertexId};

/// Routes query points over a shared graph.
///
/// Each attempt snaps both points to vertices, then runs every configured
/// strategy. When one fails, the endpoint its statistics implicate is
/// excluded and the points are snapped again, up to `max_retries` times or
/// until no new vertex can be excluded. Endpoints in separate components
/// therefore usually end in [`RouteError::EndpointUnresolved`] once every
/// vertex within the snap radius is excluded; [`RouteError::RouteNotFound`]
/// is returned when the retries run out first.
///
/// Query points that are not finite or lie outside the longitude and latitude
/// ranges are never snapped and fail as `EndpointUnresolved`.
#[derive(Debug, Clone)]
pub struct RouteOrchestrator<'g> {
    graph: &'g RouteGraph,
    config: RoutingConfig,
}

/// Mutable bookkeeping of one query
#[derive(Default)]
struct Query {
    excluded: ExclusionSet,
    excluded_order: Vec<VertexId>,
    stats: SearchStats,
    traversed: TraversedEdges,
    reports: Vec<StrategyReport>,
    located: Located,
    attempts: usize,
}

impl Query {
    fn exclude(&mut self, vertex: VertexId) -> bool {
        if self.excluded.insert(vertex) {
            self.excluded_order.push(vertex);
            true
        } else {
            false
        }
    }

    fn fail(self, reason: RouteError) -> NoRoute {
        NoRoute {
            reason,
            stats: self.stats,
            reports: self.reports,
            attempts: self.attempts,
            excluded: self.excluded_order,
            located: self.located,
            traversed: self.traversed,
        }
    }
}

enum Attempt {
    Success {
        strategy: Strategy,
        path: GraphPath,
        outcomes: Vec<StrategyOutcome>,
    },
    Failed(StrategyOutcome),
    Interrupted,
    NoStrategies,
}

impl<'g> RouteOrchestrator<'g> {
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(graph: &'g RouteGraph, config: RoutingConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    pub fn graph(&self) -> &'g RouteGraph {
        self.graph
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Routes between two `(lng, lat)` points under the configured timeout
    pub fn route(&self, start: Point<f64>, finish: Point<f64>) -> Result<Route, NoRoute> {
        self.route_with_budget(start, finish, &self.config.budget())
    }

    /// Routes between two points, giving up once `budget` runs out
    pub fn route_with_budget(
        &self,
        start: Point<f64>,
        finish: Point<f64>,
        budget: &SearchBudget,
    ) -> Result<Route, NoRoute> {
        if !self.graph.has_edges() {
            return Err(NoRoute::new(RouteError::EmptyGraph));
        }
        let (start_valid, finish_valid) = (is_valid_lng_lat(start), is_valid_lng_lat(finish));
        if !start_valid || !finish_valid {
            let reason = RouteError::EndpointUnresolved {
                start: !start_valid,
                finish: !finish_valid,
            };
            warn!("{reason}: query point is not a valid (lng, lat)");
            return Err(NoRoute::new(reason));
        }

        let mut query = Query::default();
        let mut last_failure = RouteError::RouteNotFound {
            failed_at_start: false,
            failed_at_finish: false,
        };

        while query.attempts <= self.config.max_retries {
            query.attempts += 1;
            query.located = locate_endpoints(
                self.graph,
                start,
                finish,
                &query.excluded,
                self.config.max_snap_distance_m,
            );
            let (Some(src), Some(dst)) = (query.located.start, query.located.finish) else {
                let reason = RouteError::EndpointUnresolved {
                    start: query.located.start.is_none(),
                    finish: query.located.finish.is_none(),
                };
                warn!("{reason} after {} attempts", query.attempts);
                return Err(query.fail(reason));
            };

            match self.run_battery(&mut query, src, dst, budget) {
                Attempt::Success {
                    strategy,
                    path,
                    outcomes,
                } => {
                    return Ok(self.finish_route(query, src, dst, strategy, path, &outcomes));
                }
                Attempt::NoStrategies => return Err(query.fail(last_failure)),
                Attempt::Interrupted => {
                    debug!("Query interrupted on attempt {}", query.attempts);
                    return Err(query.fail(RouteError::Interrupted));
                }
                Attempt::Failed(outcome) => {
                    let implicated = outcome
                        .diagnose(self.graph.vertex_count(), self.config.starvation_ratio)
                        .unwrap_or(Implicated::Both);
                    let blame_start = implicated != Implicated::Finish;
                    let blame_finish = implicated != Implicated::Start;
                    last_failure = RouteError::RouteNotFound {
                        failed_at_start: blame_start,
                        failed_at_finish: blame_finish,
                    };

                    let mut progressed = false;
                    if blame_start {
                        progressed |= query.exclude(src.vertex);
                    }
                    if blame_finish {
                        progressed |= query.exclude(dst.vertex);
                    }
                    trace!(
                        "Attempt {}: {} failed, implicating {:?}, {} vertices excluded",
                        query.attempts,
                        outcome.strategy,
                        implicated,
                        query.excluded.len()
                    );
                    if !progressed {
                        break;
                    }
                }
            }
        }

        warn!(
            "No route after {} attempts and {} exclusions: {last_failure}",
            query.attempts,
            query.excluded.len()
        );
        Err(query.fail(last_failure))
    }

    /// Runs the strategies in order, stopping at the first failure
    fn run_battery(
        &self,
        query: &mut Query,
        src: Snap,
        dst: Snap,
        budget: &SearchBudget,
    ) -> Attempt {
        query.reports.clear();
        let mut outcomes = Vec::with_capacity(self.config.strategies.len());
        let mut primary: Option<(Strategy, GraphPath)> = None;

        for &strategy in &self.config.strategies {
            let outcome = strategy.run(self.graph, src.vertex, dst.vertex, &self.config, budget);
            query.stats.merge(&outcome.stats);
            query.traversed.union_with(&outcome.traversed);
            query.reports.push(StrategyReport::from(&outcome));

            if outcome.interrupted {
                return Attempt::Interrupted;
            }
            if !outcome.is_success() {
                return Attempt::Failed(outcome);
            }
            if primary.is_none()
                && let Some(path) = &outcome.path
            {
                primary = Some((strategy, path.clone()));
            }
            outcomes.push(outcome);
        }

        match primary {
            Some((strategy, path)) => Attempt::Success {
                strategy,
                path,
                outcomes,
            },
            None => Attempt::NoStrategies,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_route(
        &self,
        query: Query,
        src: Snap,
        dst: Snap,
        strategy: Strategy,
        path: GraphPath,
        outcomes: &[StrategyOutcome],
    ) -> Route {
        let warnings = self.cross_validate(outcomes);
        for warning in &warnings {
            warn!("Integrity warning: {warning}");
        }
        let alternative = self.pick_alternative(outcomes);

        debug!(
            "Route {} -> {}: {:.0} m over {} hops, {} attempts, {} warnings",
            src.vertex.index(),
            dst.vertex.index(),
            path.distance(),
            path.hops.len(),
            query.attempts,
            warnings.len()
        );

        Route {
            geometry: path.geometry(self.graph),
            distance: path.distance(),
            path,
            start: src,
            finish: dst,
            strategy,
            stats: query.stats,
            reports: query.reports,
            warnings,
            alternative,
            traversed: query.traversed,
            attempts: query.attempts,
            excluded: query.excluded_order,
        }
    }

    /// Compares every distance with the first strategy's
    fn cross_validate(&self, outcomes: &[StrategyOutcome]) -> Vec<IntegrityWarning> {
        let mut warnings = Vec::new();
        let Some(reference) = outcomes.first() else {
            return warnings;
        };
        let expected = reference.path.as_ref().map_or(0.0, |path| path.cost);

        for outcome in outcomes {
            if let Some(path) = &outcome.path
                && (path.cost - expected).abs() > self.config.distance_tolerance_m
            {
                warnings.push(IntegrityWarning::StatMismatch {
                    reference: reference.strategy,
                    strategy: outcome.strategy,
                    expected: expected.round(),
                    actual: path.distance(),
                });
            }
            if outcome.stats.heuristic_violations > 0 {
                warnings.push(IntegrityWarning::InconsistentHeuristic {
                    strategy: outcome.strategy,
                    violations: outcome.stats.heuristic_violations,
                });
            }
        }
        warnings
    }

    /// A divergent strategy path if any, otherwise a bidirectional
    /// runner-up
    fn pick_alternative(&self, outcomes: &[StrategyOutcome]) -> Option<AlternativePath> {
        let reference = outcomes.first()?.path.as_ref()?;

        let divergent = outcomes.iter().skip(1).find_map(|outcome| {
            outcome
                .path
                .as_ref()
                .filter(|path| {
                    (path.cost - reference.cost).abs() > self.config.distance_tolerance_m
                })
                .map(|path| (outcome.strategy, path))
        });
        let runner_up = || {
            outcomes.iter().find_map(|outcome| {
                outcome
                    .alternative
                    .as_ref()
                    .map(|path| (outcome.strategy, path))
            })
        };

        divergent.or_else(runner_up).map(|(strategy, path)| AlternativePath {
            strategy,
            path: path.clone(),
            geometry: path.geometry(self.graph),
            distance: path.distance(),
        })
    }
}
