//! Re-exports of the most commonly used items in `route_core`.
pub use crate::cost::{
    CostModel, CostParams, CrowdingMap, CrowdingRisk, Heuristic, NoCrowding, RiskLevel,
};
pub use crate::error::{BuildError, SearchError};
pub use crate::network::{
    station_index, BuildParams, Network, NetworkTopology, StationIndex, TopologyName,
};
pub use crate::overlay::Disruption;
pub use crate::profiler::{Comparison, Metrics, Profiler};
pub use crate::search::{path::PathResult, RouteSearch, SearchEngine, Strategy};
