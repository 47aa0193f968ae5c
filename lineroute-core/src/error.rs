use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid geometry in feature {feature} at position {position}: {reason}")]
    InvalidGeometry {
        feature: usize,
        position: usize,
        reason: String,
    },
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("GeoJSON export error: {0}")]
    GeoJsonError(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Reasons a query ends without a route.
///
/// These are ordinary outcomes of routing over partial map data and are
/// returned as values, never raised from the search loops.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteError {
    #[error("Graph has no edges")]
    EmptyGraph,
    #[error("No eligible vertex for query point (start: {start}, finish: {finish})")]
    EndpointUnresolved { start: bool, finish: bool },
    #[error(
        "No route found (start starved: {failed_at_start}, finish starved: {failed_at_finish})"
    )]
    RouteNotFound {
        failed_at_start: bool,
        failed_at_finish: bool,
    },
    #[error("Search interrupted by deadline or cancellation")]
    Interrupted,
}
