//! This module is responsible for reading line features and building
//! the routing graph from them.

mod builder;
mod features;

pub use builder::build_graph;
pub use features::{lines_from_geojson, lines_from_geojson_str};
