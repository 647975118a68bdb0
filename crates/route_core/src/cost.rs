use std::{fmt, str::FromStr};

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::{
    constants::{DEFAULT_HEURISTIC_SPEED_KMH, DEFAULT_TRANSFER_PENALTY, Weight},
    network::{Connection, ConnectionKind, NetworkTopology, StationIndex, TopologyName},
    util::math::{haversine_km, travel_minutes},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

/// Source of crowding-risk estimates for a connection.
///
/// Implementations decide whether a connection entry or an entry for the
/// destination station applies. `None` means no penalty.
pub trait CrowdingRisk: Send + Sync {
    fn risk(&self, topology: &NetworkTopology, connection: &Connection) -> Option<RiskLevel>;
}

/// No crowding information at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCrowding;

impl CrowdingRisk for NoCrowding {
    fn risk(&self, _topology: &NetworkTopology, _connection: &Connection) -> Option<RiskLevel> {
        None
    }
}

/// Fixed risk levels per connection and per station.
///
/// A connection entry wins over an entry for the destination station. If the
/// map is scoped to a topology it has no entries for any other topology.
#[derive(Debug, Clone, Default)]
pub struct CrowdingMap {
    topology: Option<TopologyName>,
    connections: FxHashMap<String, FxHashMap<String, RiskLevel>>,
    stations: FxHashMap<String, RiskLevel>,
}

impl CrowdingMap {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn for_topology(mut self, topology: TopologyName) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn with_connection(mut self, from: &str, to: &str, level: RiskLevel) -> Self {
        self.connections
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), level);
        self
    }

    pub fn with_station(mut self, station: &str, level: RiskLevel) -> Self {
        self.stations.insert(station.to_string(), level);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty() && self.stations.is_empty()
    }
}

impl CrowdingRisk for CrowdingMap {
    fn risk(&self, topology: &NetworkTopology, connection: &Connection) -> Option<RiskLevel> {
        if matches!(self.topology, Some(name) if name != topology.name()) {
            return None;
        }
        let from = &topology.station(connection.source).name;
        let to = &topology.station(connection.target).name;

        self.connections
            .get(from)
            .and_then(|targets| targets.get(to))
            .or_else(|| self.stations.get(to))
            .copied()
    }
}

/// Estimate of the remaining cost used by greedy best-first search and A*
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Heuristic {
    /// Great-circle distance at the heuristic speed
    #[default]
    StraightLine,
    /// Always 0, which makes A* a uniform-cost search
    Zero,
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heuristic::StraightLine => f.pad("straight-line"),
            Heuristic::Zero => f.pad("zero"),
        }
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "straight-line" | "straight_line" | "straight" | "haversine" => {
                Ok(Heuristic::StraightLine)
            }
            "zero" | "none" => Ok(Heuristic::Zero),
            _ => Err(format!("Unknown heuristic: {}", s)),
        }
    }
}

/// Parameters of the composite edge cost and the heuristic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostParams {
    // Used for line changes without a transfer record
    pub(crate) default_transfer_penalty: Weight,
    // Added to every line change on top of the walking time
    pub(crate) line_change_penalty: Weight,
    pub(crate) heuristic: Heuristic,
    pub(crate) heuristic_speed_kmh: f64,
    // Indexed by RiskLevel
    pub(crate) crowding_penalties: [Weight; 3],
    pub(crate) peak_hour: bool,
    pub(crate) peak_transfer_factor: f64,
}

impl CostParams {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn default_transfer_penalty(mut self, minutes: Weight) -> Self {
        assert!(minutes >= 0.0, "Transfer penalty must not be negative");
        self.default_transfer_penalty = minutes;
        self
    }

    pub fn line_change_penalty(mut self, minutes: Weight) -> Self {
        assert!(minutes >= 0.0, "Line change penalty must not be negative");
        self.line_change_penalty = minutes;
        self
    }

    pub fn heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn heuristic_speed_kmh(mut self, speed: f64) -> Self {
        assert!(speed > 0.0, "Heuristic speed must be positive");
        self.heuristic_speed_kmh = speed;
        self
    }

    /// **Panics** if the penalties are negative or not strictly increasing
    pub fn crowding_penalties(mut self, low: Weight, medium: Weight, high: Weight) -> Self {
        assert!(
            0.0 <= low && low < medium && medium < high,
            "Crowding penalties must be non-negative and strictly increasing"
        );
        self.crowding_penalties = [low, medium, high];
        self
    }

    pub fn peak_hour(mut self, peak_hour: bool) -> Self {
        self.peak_hour = peak_hour;
        self
    }

    pub fn peak_transfer_factor(mut self, factor: f64) -> Self {
        assert!(factor >= 1.0, "Peak factor must be at least 1");
        self.peak_transfer_factor = factor;
        self
    }

    pub fn speed_kmh(&self) -> f64 {
        self.heuristic_speed_kmh
    }

    pub fn selected_heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn crowding_penalty(&self, level: RiskLevel) -> Weight {
        match level {
            RiskLevel::Low => self.crowding_penalties[0],
            RiskLevel::Medium => self.crowding_penalties[1],
            RiskLevel::High => self.crowding_penalties[2],
        }
    }
}

impl Default for CostParams {
    fn default() -> Self {
        CostParams {
            default_transfer_penalty: DEFAULT_TRANSFER_PENALTY,
            line_change_penalty: 0.0,
            heuristic: Heuristic::StraightLine,
            heuristic_speed_kmh: DEFAULT_HEURISTIC_SPEED_KMH,
            crowding_penalties: [1.0, 3.0, 6.0],
            peak_hour: false,
            peak_transfer_factor: 1.5,
        }
    }
}

/// Whether the heuristic underestimates every edge of a topology
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdmissibilityReport {
    pub heuristic: Heuristic,
    /// Straight-line speed of the fastest connection, 0 if no connection has coordinates
    pub fastest_edge_kmh: f64,
    pub heuristic_speed_kmh: f64,
    /// Stations on some connection without coordinates. Nothing bounds the
    /// straight-line estimate across them.
    pub unlocated_stations: usize,
    pub admissible: bool,
}

impl fmt::Display for AdmissibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.admissible {
            "admissible"
        } else {
            "NOT admissible"
        };
        match self.heuristic {
            Heuristic::Zero => write!(f, "Zero heuristic: {}", verdict),
            Heuristic::StraightLine => write!(
                f,
                "Heuristic speed {:.1} km/h, fastest connection {:.1} km/h, {} stations without coordinates: {}",
                self.heuristic_speed_kmh, self.fastest_edge_kmh, self.unlocated_stations, verdict
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostModel {
    params: CostParams,
}

impl CostModel {
    pub fn new(params: CostParams) -> Self {
        CostModel { params }
    }

    /// Cost model whose heuristic never overestimates on `topology`: the
    /// speed is raised to the fastest connection, and the zero heuristic
    /// replaces the straight line if a connected station has no coordinates.
    pub fn calibrated(topology: &NetworkTopology, mut params: CostParams) -> Self {
        if params.heuristic == Heuristic::Zero {
            return CostModel { params };
        }
        let unlocated = unlocated_stations(topology);
        if unlocated > 0 {
            warn!(
                "{} stations of '{}' have no coordinates, falling back to the zero heuristic",
                unlocated,
                topology.name()
            );
            params.heuristic = Heuristic::Zero;
            return CostModel { params };
        }
        let fastest = fastest_edge_kmh(topology);
        if fastest > params.heuristic_speed_kmh {
            // Rounding must not push the estimate above the edge cost
            let speed = fastest * (1.0 + 1e-9);
            info!(
                "Raising heuristic speed for '{}' from {:.1} to {:.1} km/h",
                topology.name(),
                params.heuristic_speed_kmh,
                speed
            );
            params.heuristic_speed_kmh = speed;
        }
        CostModel { params }
    }

    pub fn params(&self) -> &CostParams {
        &self.params
    }

    /// Travel time plus transfer and crowding penalties. Always positive.
    ///
    /// Line changes between rides depend on the line a path arrives on and
    /// are added by [`CostModel::board`].
    pub fn edge_cost(
        &self,
        topology: &NetworkTopology,
        connection: &Connection,
        crowding: &dyn CrowdingRisk,
    ) -> Weight {
        connection.minutes
            + self.transfer_penalty_minutes(topology, connection)
            + self.crowding_penalty_minutes(topology, connection, crowding)
    }

    pub fn transfer_penalty_minutes(
        &self,
        topology: &NetworkTopology,
        connection: &Connection,
    ) -> Weight {
        let ConnectionKind::Transfer { from_line, to_line } = &connection.kind else {
            return 0.0;
        };
        self.line_change_minutes(topology, connection.source, from_line, to_line)
    }

    /// Minutes spent at `station` changing from `from_line` to `to_line`: the
    /// transfer record or the default penalty, plus the line change penalty.
    pub fn line_change_minutes(
        &self,
        topology: &NetworkTopology,
        station: StationIndex,
        from_line: &str,
        to_line: &str,
    ) -> Weight {
        let name = &topology.station(station).name;
        let walk = match topology.transfer(name, from_line, to_line) {
            Some(transfer) if self.params.peak_hour && transfer.meta.peak_hour => {
                transfer.minutes() * self.params.peak_transfer_factor
            }
            Some(transfer) => transfer.minutes(),
            None => self.params.default_transfer_penalty,
        };
        walk + self.params.line_change_penalty
    }

    /// Line ridden on `connection` by a path that arrived at its source on
    /// `current`, with the minutes spent changing lines before boarding.
    ///
    /// A ride stays on `current` when the connection runs on it and otherwise
    /// takes the line that is quickest to change to, the first listed on a
    /// tie. A transfer connection continues on its `to_line` and charges an
    /// extra change only if the path did not arrive on its `from_line`.
    /// Leaving the source (`current` is `None`) never costs a change.
    pub fn board<'a>(
        &self,
        topology: &NetworkTopology,
        connection: &'a Connection,
        current: Option<&str>,
    ) -> (&'a str, Weight) {
        match (&connection.kind, current) {
            (ConnectionKind::Transfer { from_line, to_line }, Some(line)) if line != from_line => (
                to_line.as_str(),
                self.line_change_minutes(topology, connection.source, line, from_line),
            ),
            (ConnectionKind::Transfer { to_line, .. }, _) => (to_line.as_str(), 0.0),
            (ConnectionKind::Ride, None) => {
                (connection.lines.first().map_or("", String::as_str), 0.0)
            }
            (ConnectionKind::Ride, Some(line)) => {
                if let Some(same) = connection.lines.iter().find(|l| *l == line) {
                    return (same.as_str(), 0.0);
                }
                connection
                    .lines
                    .iter()
                    .map(|to| {
                        let minutes =
                            self.line_change_minutes(topology, connection.source, line, to);
                        (to.as_str(), minutes)
                    })
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .unwrap_or(("", 0.0))
            }
        }
    }

    pub fn crowding_penalty_minutes(
        &self,
        topology: &NetworkTopology,
        connection: &Connection,
        crowding: &dyn CrowdingRisk,
    ) -> Weight {
        crowding
            .risk(topology, connection)
            .map_or(0.0, |level| self.params.crowding_penalty(level))
    }

    /// Estimated minutes from `a` to `b` at the heuristic speed. 0 if a
    /// coordinate is missing or the zero heuristic is selected.
    pub fn heuristic(&self, topology: &NetworkTopology, a: StationIndex, b: StationIndex) -> Weight {
        if self.params.heuristic == Heuristic::Zero {
            return 0.0;
        }
        let from = topology.station(a);
        let to = topology.station(b);
        match (&from.coord, &to.coord) {
            (Some(src), Some(dst)) => {
                travel_minutes(haversine_km(src, dst), self.params.heuristic_speed_kmh)
            }
            _ => {
                debug!(
                    "No coordinates for {} or {}, estimating 0",
                    from.name, to.name
                );
                0.0
            }
        }
    }

    pub fn admissibility(&self, topology: &NetworkTopology) -> AdmissibilityReport {
        let fastest_edge_kmh = fastest_edge_kmh(topology);
        let unlocated_stations = unlocated_stations(topology);
        let report = AdmissibilityReport {
            heuristic: self.params.heuristic,
            fastest_edge_kmh,
            heuristic_speed_kmh: self.params.heuristic_speed_kmh,
            unlocated_stations,
            admissible: self.params.heuristic == Heuristic::Zero
                || (unlocated_stations == 0
                    && self.params.heuristic_speed_kmh >= fastest_edge_kmh),
        };
        if !report.admissible {
            warn!(
                "Heuristic is not admissible on '{}', A* may miss the cheapest path. {}",
                topology.name(),
                report
            );
        }
        report
    }
}

fn fastest_edge_kmh(topology: &NetworkTopology) -> f64 {
    topology
        .connections()
        .filter_map(|c| {
            let src = topology.station(c.source).coord?;
            let dst = topology.station(c.target).coord?;
            Some(haversine_km(&src, &dst) / (c.minutes / 60.0))
        })
        .fold(0.0, f64::max)
}

fn unlocated_stations(topology: &NetworkTopology) -> usize {
    (0..topology.station_count())
        .map(StationIndex::new)
        .filter(|s| {
            topology.station(*s).coord.is_none()
                && (topology.out_degree(*s) > 0 || topology.in_degree(*s) > 0)
        })
        .count()
}
