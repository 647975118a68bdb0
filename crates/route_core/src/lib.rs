//! Crate to plan routes over a transit network.
//!
//! # Basic usage
//! ```no_run
//! use route_core::prelude::*;
//! use std::path::Path;
//!
//! // Build both topologies from a directory of CSV tables
//! let network = Network::from_dir(Path::new("path/to/data"), &BuildParams::default())
//!     .expect("Failed to build network");
//!
//! // Search the current network with A*
//! let today = network.topology(TopologyName::Today);
//! let cost = CostModel::calibrated(today, CostParams::default());
//! let engine = SearchEngine::new(today, &cost);
//!
//! let path = engine
//!     .search(Strategy::AStar, "Jurong East", "City Hall")
//!     .expect("Failed to find path");
//! println!("Costs: {}", path.total_cost);
//! ```
pub mod constants;
pub mod cost;
pub mod error;
pub mod integrity;
pub mod network;
pub mod overlay;
pub mod prelude;
pub mod profiler;
pub mod search;
pub mod statistics;
pub mod transfer;
pub mod util;

pub use transit_reader;
