//! Query results returned by the orchestrator

use std::fmt;

use geo::LineString;
use serde::Serialize;
use thiserror::Error;

use super::locate::{Located, Snap};
use super::search::{GraphPath, SearchStats, TraversedEdges};
use super::strategy::{Strategy, StrategyOutcome};
use crate::{Meters, RouteError, VertexId};

/// What one strategy of the final attempt produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyReport {
    pub strategy: Strategy,
    /// Rounded route distance, absent when the strategy failed
    pub distance: Option<Meters>,
    pub stats: SearchStats,
    pub interrupted: bool,
}

impl From<&StrategyOutcome> for StrategyReport {
    fn from(outcome: &StrategyOutcome) -> Self {
        Self {
            strategy: outcome.strategy,
            distance: outcome.path.as_ref().map(GraphPath::distance),
            stats: outcome.stats,
            interrupted: outcome.interrupted,
        }
    }
}

/// Cross-validation findings attached to a successful route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    /// Two strategies disagree on the route length
    StatMismatch {
        reference: Strategy,
        strategy: Strategy,
        expected: Meters,
        actual: Meters,
    },
    /// The heuristic overestimated along some edges
    InconsistentHeuristic { strategy: Strategy, violations: usize },
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityWarning::StatMismatch {
                reference,
                strategy,
                expected,
                actual,
            } => write!(
                f,
                "{strategy} found {actual:.0} m while {reference} found {expected:.0} m"
            ),
            IntegrityWarning::InconsistentHeuristic {
                strategy,
                violations,
            } => write!(f, "{strategy} saw {violations} heuristic consistency violations"),
        }
    }
}

/// Second route reported for cross-checking
#[derive(Debug, Clone)]
pub struct AlternativePath {
    /// Strategy that produced it
    pub strategy: Strategy,
    pub path: GraphPath,
    pub geometry: LineString<f64>,
    pub distance: Meters,
}

/// A resolved route between two query points
#[derive(Debug, Clone)]
pub struct Route {
    /// Polyline from the start vertex to the finish vertex
    pub geometry: LineString<f64>,
    /// Meters, rounded
    pub distance: Meters,
    pub path: GraphPath,
    pub start: Snap,
    pub finish: Snap,
    /// First strategy of the battery, whose path is returned
    pub strategy: Strategy,
    /// Counters summed over every strategy and attempt
    pub stats: SearchStats,
    pub reports: Vec<StrategyReport>,
    pub warnings: Vec<IntegrityWarning>,
    pub alternative: Option<AlternativePath>,
    /// Edges touched by any search of the query
    pub traversed: TraversedEdges,
    /// Battery runs, including the successful one
    pub attempts: usize,
    /// Vertices excluded by earlier failed attempts
    pub excluded: Vec<VertexId>,
}

impl Route {
    /// All strategies agreed and no heuristic violation was seen
    pub fn is_consistent(&self) -> bool {
        self.warnings.is_empty()
    }

    /// `(lng, lat)` pairs of the route polyline
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.geometry.coords().map(|c| (c.x, c.y)).collect()
    }
}

/// Definitive failure of a query, with everything known at that point
#[derive(Error, Debug, Clone)]
#[error("{reason}")]
pub struct NoRoute {
    pub reason: RouteError,
    pub stats: SearchStats,
    pub reports: Vec<StrategyReport>,
    pub attempts: usize,
    pub excluded: Vec<VertexId>,
    /// Endpoints of the last attempt
    pub located: Located,
    pub traversed: TraversedEdges,
}

impl NoRoute {
    pub(crate) fn new(reason: RouteError) -> Self {
        Self {
            reason,
            stats: SearchStats::default(),
            reports: Vec::new(),
            attempts: 0,
            excluded: Vec::new(),
            located: Located::default(),
            traversed: TraversedEdges::default(),
        }
    }
}
