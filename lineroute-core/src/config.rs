//! Routing configuration, loadable from TOML

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::routing::{Heuristic, SearchBudget, Strategy};

/// Highest supported number of decimal digits for vertex merging
pub const MAX_COORDINATE_PRECISION: u8 = 9;

/// Graph construction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Decimal digits kept when merging coordinates into vertices.
    /// 5 digits is roughly one meter.
    pub coordinate_precision: u8,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            coordinate_precision: 5,
        }
    }
}

impl GraphConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.coordinate_precision > MAX_COORDINATE_PRECISION {
            return Err(Error::InvalidConfig(format!(
                "coordinate_precision must be at most {MAX_COORDINATE_PRECISION}, got {}",
                self.coordinate_precision
            )));
        }
        Ok(())
    }
}

/// How the bidirectional search decides that its best meeting point is final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetRule {
    /// Stop once the frontier bounds prove no cheaper meeting can exist.
    #[default]
    StoppingInequality,
    /// Historical fallback: stop after `min_candidates` meetings and keep the
    /// cheapest. Not guaranteed to return the shortest path.
    CandidateCollection { min_candidates: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    pub graph: GraphConfig,
    /// Heuristic used by the A* strategies
    pub heuristic: Heuristic,
    /// Ordered strategy battery, all results are cross-validated
    pub strategies: Vec<Strategy>,
    pub meet_rule: MeetRule,
    /// Factor applied to the heuristic part of bidirectional A* keys
    /// once the frontiers have met
    pub heuristic_dampening: f64,
    /// Upper bound on exclusion retries after the first attempt
    pub max_retries: usize,
    /// Query points farther than this from every eligible vertex stay unresolved
    pub max_snap_distance_m: Option<f64>,
    /// Allowed spread between strategy distances
    pub distance_tolerance_m: f64,
    /// Share of the graph a failed one-sided search must have queued before
    /// the far endpoint, rather than the searched one, is blamed
    pub starvation_ratio: f64,
    pub timeout_ms: Option<u64>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            graph: GraphConfig::default(),
            heuristic: Heuristic::default(),
            strategies: Strategy::ALL.to_vec(),
            meet_rule: MeetRule::default(),
            heuristic_dampening: 0.75,
            max_retries: 8,
            max_snap_distance_m: Some(5_000.0),
            distance_tolerance_m: 1.0,
            starvation_ratio: 0.5,
            timeout_ms: None,
        }
    }
}

impl RoutingConfig {
    /// Parses and validates a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or holds invalid values
    pub fn from_toml_str(input: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.graph.validate()?;

        if self.strategies.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one routing strategy is required".to_string(),
            ));
        }
        if !(self.heuristic_dampening > 0.0 && self.heuristic_dampening <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "heuristic_dampening must be in (0, 1], got {}",
                self.heuristic_dampening
            )));
        }
        if !(self.distance_tolerance_m >= 0.0 && self.distance_tolerance_m.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "distance_tolerance_m must be a finite non-negative number, got {}",
                self.distance_tolerance_m
            )));
        }
        if !(self.starvation_ratio > 0.0 && self.starvation_ratio < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "starvation_ratio must be in (0, 1), got {}",
                self.starvation_ratio
            )));
        }
        if let Some(radius) = self.max_snap_distance_m
            && !(radius >= 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "max_snap_distance_m must be non-negative, got {radius}"
            )));
        }
        if let MeetRule::CandidateCollection { min_candidates: 0 } = self.meet_rule {
            return Err(Error::InvalidConfig(
                "candidate_collection requires min_candidates >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Fresh per-query budget derived from `timeout_ms`
    pub fn budget(&self) -> SearchBudget {
        match self.timeout_ms {
            Some(ms) => SearchBudget::with_timeout(Duration::from_millis(ms)),
            None => SearchBudget::unlimited(),
        }
    }
}
