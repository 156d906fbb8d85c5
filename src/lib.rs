pub mod network;

pub use network::{GraphBuilder, Stop, TransitGraph};

pub mod selector;

pub use selector::{Selector, TimeField};

pub mod cost;

pub use cost::CostModel;

pub mod search;

pub use search::{find_path, search, Criterion, PredecessorMap, Query, SearchConfig};

pub mod journey;

pub use journey::{reconstruct, Journey, JourneyError, Leg};

pub mod loader;

pub mod utils;
