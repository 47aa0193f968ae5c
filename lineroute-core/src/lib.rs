//! Shortest-path routing over graphs derived from line geometry.
//!
//! The crate turns a collection of line features into an immutable weighted
//! graph, snaps arbitrary query points to graph vertices and runs a battery of
//! best-first searches (Dijkstra, A*, and their bidirectional variants) that
//! cross-validate each other before a route is returned.

pub mod config;
pub mod error;
pub mod geodesy;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use config::{GraphConfig, MeetRule, RoutingConfig};
pub use error::{Error, RouteError};
pub use loading::{build_graph, lines_from_geojson, lines_from_geojson_str};
pub use model::{CoordKey, Edge, RouteGraph, Vertex};
pub use routing::{
    BidirectionalOptions, BidirectionalOutcome, GraphPath, Heuristic, NoRoute, Route,
    RouteOrchestrator, SearchBudget, SearchOutcome, SearchStats, Strategy, TraversedEdges,
    bidirectional_path_search, locate_endpoints, path_search, route_many,
};

/// Graph vertex identifier, assigned once at build time
pub type VertexId = petgraph::graph::NodeIndex;
/// Directed edge identifier; every edge has a mirror with its own id
pub type EdgeId = petgraph::graph::EdgeIndex;
/// Real-world distance in meters
pub type Meters = f64;
