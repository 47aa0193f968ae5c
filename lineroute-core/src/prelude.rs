// Graph construction
pub use crate::config::{GraphConfig, MeetRule, RoutingConfig};
pub use crate::loading::{build_graph, lines_from_geojson, lines_from_geojson_str};
pub use crate::model::{GraphSummary, RouteGraph};

// Queries
pub use crate::routing::{
    Heuristic, NoRoute, Route, RouteOrchestrator, SearchBudget, Strategy, locate_endpoints,
    route_many,
};

// Errors
pub use crate::{Error, RouteError};

// Core types
pub use crate::EdgeId;
pub use crate::Meters;
pub use crate::VertexId;
