//! Graph data model: vertices keyed by rounded coordinates and
//! mirrored edges carrying real-world distance and geometry.

pub mod components;
pub mod network;

pub use components::{CoordKey, Edge, Vertex};
pub use network::{GraphSummary, RouteGraph};
