//! Best-first searches over the routing graph

mod bidirectional;
mod budget;
mod path;
mod state;
mod stats;
mod unidirectional;

pub use bidirectional::{
    BidirectionalOptions, BidirectionalOutcome, bidirectional_path_search,
    bidirectional_path_search_with_budget,
};
pub use budget::SearchBudget;
pub use path::{GraphPath, Hop};
pub use stats::{SearchStats, TraversedEdges};
pub use unidirectional::{SearchOutcome, path_search, path_search_with_budget};
